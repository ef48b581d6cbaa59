mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod logging;
mod server;
mod services;
mod workflow;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::generate::{self, GenerateArgs};
use crate::cmd::serve::{self, ServeArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::clock::SystemClock;
use crate::infra::github::GitHubClient;

#[derive(Parser)]
#[command(name = "shiplog", author, version, about = "Changelog feed from merged pull requests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a changelog snapshot covering every candidate branch.
    Generate(GenerateArgs),
    /// Serve paginated changelog pages over HTTP.
    Serve(ServeArgs),
    /// Inspect CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    logging::init();
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Generate(args) => {
            let ctx = build_context()?;
            let count = generate::run(&ctx, args).await?;
            println!("Changelog snapshot written with {count} entries.");
            Ok(())
        }
        Commands::Serve(args) => {
            let ctx = build_context()?;
            serve::run(&ctx, args).await
        }
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;
    let source_host = Arc::new(GitHubClient::new(
        config.api_url.clone(),
        config.github_token.clone(),
    ));
    Ok(AppContext::new(config, source_host, Arc::new(SystemClock)))
}
