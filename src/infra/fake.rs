//! In-memory source host for workflow and server tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::domain::pull_request::RawPullRequest;
use crate::error::{AppError, AppResult};
use crate::services::{PageQuery, PullRequestPage, SearchQuery, SourceHost};

#[derive(Default)]
pub struct FakeHost {
    pub branches: HashSet<String>,
    pub search_results: HashMap<String, Vec<u64>>,
    pub details: HashMap<u64, RawPullRequest>,
    pub delays: HashMap<u64, Duration>,
    pub page: PullRequestPage,
    pub fail_pages: bool,
    pub searched: Mutex<Vec<SearchQuery>>,
    pub page_queries: Mutex<Vec<PageQuery>>,
    pub page_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeHost {
    pub fn with_branches(branches: &[&str]) -> Self {
        Self {
            branches: branches.iter().map(|b| b.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn add_pull_request(&mut self, branch: &str, pr: RawPullRequest) {
        self.search_results
            .entry(branch.to_string())
            .or_default()
            .push(pr.number);
        self.details.insert(pr.number, pr);
    }
}

pub fn pull_request(number: u64, title: &str, base: &str, day: u32) -> RawPullRequest {
    RawPullRequest {
        number,
        title: title.to_string(),
        body: Some(format!("Release note: Change number {number}.")),
        merged_at: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).single(),
        base_branch: base.to_string(),
        author: Some("octocat".to_string()),
        labels: vec!["changelog".to_string()],
        url: format!("https://github.com/acme/app/pull/{number}"),
    }
}

#[async_trait]
impl SourceHost for FakeHost {
    async fn branch_exists(&self, _repo: &str, branch: &str) -> AppResult<bool> {
        Ok(self.branches.contains(branch))
    }

    async fn search_merged(&self, query: &SearchQuery) -> AppResult<Vec<u64>> {
        self.searched.lock().unwrap().push(query.clone());
        Ok(self
            .search_results
            .get(&query.branch)
            .cloned()
            .unwrap_or_default())
    }

    async fn pull_request(&self, _repo: &str, number: u64) -> AppResult<RawPullRequest> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&number) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.details
            .get(&number)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("pull request {number} not found")))
    }

    async fn merged_page(&self, query: &PageQuery) -> AppResult<PullRequestPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.page_queries.lock().unwrap().push(query.clone());
        if self.fail_pages {
            return Err(AppError::Upstream("GitHub responded with 502".to_string()));
        }
        Ok(self.page.clone())
    }
}
