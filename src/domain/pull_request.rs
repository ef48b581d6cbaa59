use chrono::{DateTime, Utc};

/// A merged pull request as reported by the source host, before any
/// classification. Missing upstream fields arrive here as empty values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
    pub base_branch: String,
    pub author: Option<String>,
    pub labels: Vec<String>,
    pub url: String,
}
