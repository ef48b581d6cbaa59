use std::path::PathBuf;

use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::snapshot::{
    DEFAULT_SNAPSHOT_PATH, DEFAULT_SNAPSHOT_WINDOW_DAYS, SnapshotOptions, generate_snapshot,
    write_snapshot,
};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Where to write the snapshot; an existing file is overwritten.
    #[arg(short, long, default_value = DEFAULT_SNAPSHOT_PATH)]
    pub output: PathBuf,
    /// How many days back to look for merged pull requests.
    #[arg(short, long, default_value_t = DEFAULT_SNAPSHOT_WINDOW_DAYS)]
    pub window_days: u32,
    /// Override the configured label filter.
    #[arg(short, long)]
    pub label: Option<String>,
}

pub async fn run(ctx: &AppContext, args: GenerateArgs) -> AppResult<usize> {
    let options = SnapshotOptions {
        window_days: args.window_days.max(1),
        label: args.label.unwrap_or_else(|| ctx.config.label.clone()),
    };
    let feed = generate_snapshot(ctx, &options).await?;
    write_snapshot(&feed, &args.output)?;
    Ok(feed.items.len())
}
