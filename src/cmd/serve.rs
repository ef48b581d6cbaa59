use std::net::SocketAddr;
use std::sync::Arc;

use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::server;
use crate::workflow::changelog_page::ChangelogService;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:8787")]
    pub bind: SocketAddr,
}

pub async fn run(ctx: &AppContext, args: ServeArgs) -> AppResult<()> {
    if ctx.config.github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN not configured; /changelog will answer 500");
    }
    let service = Arc::new(ChangelogService::new(ctx));
    server::serve(service, &ctx.config.allowed_origins, args.bind).await
}
