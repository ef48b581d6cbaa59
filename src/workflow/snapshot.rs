use std::fs;
use std::path::Path;

use chrono::TimeDelta;

use crate::context::AppContext;
use crate::domain::channel::ChannelTable;
use crate::domain::feed::{Feed, FeedSource};
use crate::domain::item::build_item;
use crate::error::{AppError, AppResult};
use crate::services::SearchQuery;
use crate::workflow::fanout::{DETAIL_CONCURRENCY, fetch_details};

pub const DEFAULT_SNAPSHOT_PATH: &str = "public/changelog.json";
pub const DEFAULT_SNAPSHOT_WINDOW_DAYS: u32 = 90;

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub window_days: u32,
    pub label: String,
}

/// Collects every qualifying merged pull request across the candidate
/// branches and assembles one feed. Any failed request fails the run.
pub async fn generate_snapshot(ctx: &AppContext, options: &SnapshotOptions) -> AppResult<Feed> {
    if ctx.config.github_token.is_none() {
        return Err(AppError::Configuration(
            "GITHUB_TOKEN not configured".to_string(),
        ));
    }

    let repo = &ctx.config.repo;
    let host = ctx.source_host.as_ref();
    let merged_since = (ctx.clock.now() - TimeDelta::days(i64::from(options.window_days))).date_naive();
    let branches = candidate_branches(ctx).await?;

    let mut pull_requests = Vec::new();
    for branch in &branches {
        let numbers = host
            .search_merged(&SearchQuery {
                repo: repo.clone(),
                branch: branch.clone(),
                label: options.label.clone(),
                merged_since,
            })
            .await?;
        tracing::info!(%branch, matches = numbers.len(), "searched merged pull requests");

        pull_requests.extend(fetch_details(host, repo, &numbers, DETAIL_CONCURRENCY).await?);
    }

    let items = pull_requests
        .iter()
        .filter_map(|pr| {
            let item = build_item(pr, ChannelTable::Snapshot);
            if item.is_none() {
                tracing::debug!(number = pr.number, "skipping pull request without merge time");
            }
            item
        })
        .collect();

    Ok(Feed::assemble(
        ctx.clock.now(),
        FeedSource {
            repo: repo.clone(),
            branch: None,
            branches: Some(branches),
            window_days: Some(options.window_days),
            label: options.label.clone(),
        },
        items,
        None,
    ))
}

pub fn write_snapshot(feed: &Feed, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(feed)?;
    fs::write(path, data)?;
    tracing::info!(path = %path.display(), items = feed.items.len(), "wrote changelog snapshot");
    Ok(())
}

/// The primary branch is always searched; extra branches only when the
/// remote has them.
async fn candidate_branches(ctx: &AppContext) -> AppResult<Vec<String>> {
    let primary = &ctx.config.primary_branch;
    let mut branches = vec![primary.clone()];

    for branch in &ctx.config.extra_branches {
        if branches.contains(branch) {
            continue;
        }
        if ctx
            .source_host
            .branch_exists(&ctx.config.repo, branch)
            .await?
        {
            branches.push(branch.clone());
        } else {
            tracing::debug!(%branch, "branch not found on remote, skipping");
        }
    }

    Ok(branches)
}
