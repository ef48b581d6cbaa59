use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::pull_request::RawPullRequest;
use crate::error::AppResult;

/// Filter for the exhaustive, all-pages search used by snapshot generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub repo: String,
    pub branch: String,
    pub label: String,
    pub merged_since: NaiveDate,
}

/// One page of merged pull requests for the live service. `after` is the
/// host's opaque cursor, echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub repo: String,
    pub branch: String,
    pub label: String,
    pub merged_since: NaiveDate,
    pub first: u32,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestPage {
    pub pull_requests: Vec<RawPullRequest>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait SourceHost: Send + Sync {
    async fn branch_exists(&self, repo: &str, branch: &str) -> AppResult<bool>;
    /// Pull request numbers matching the query, across every result page,
    /// in the host's result order.
    async fn search_merged(&self, query: &SearchQuery) -> AppResult<Vec<u64>>;
    async fn pull_request(&self, repo: &str, number: u64) -> AppResult<RawPullRequest>;
    async fn merged_page(&self, query: &PageQuery) -> AppResult<PullRequestPage>;
}
