use std::sync::Arc;

use chrono::TimeDelta;

use crate::cache::ResponseCache;
use crate::context::AppContext;
use crate::domain::channel::ChannelTable;
use crate::domain::feed::{Feed, FeedSource};
use crate::domain::item::build_item;
use crate::error::{AppError, AppResult};
use crate::services::{Clock, PageQuery, SourceHost};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Caller-supplied page parameters after clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub window_days: u32,
    pub limit: u32,
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn new(window_days: Option<u32>, limit: Option<u32>, cursor: Option<String>) -> Self {
        Self {
            window_days: window_days
                .unwrap_or(DEFAULT_WINDOW_DAYS)
                .clamp(1, MAX_WINDOW_DAYS),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            cursor: cursor.filter(|cursor| !cursor.trim().is_empty()),
        }
    }

    fn cache_key(&self) -> String {
        ResponseCache::compute_key(self.window_days, self.limit, self.cursor.as_deref())
    }
}

/// Serves single feed pages for the live endpoint, fronted by a short-lived
/// response cache. Upstream failures are returned as-is and never cached.
pub struct ChangelogService {
    source_host: Arc<dyn SourceHost>,
    clock: Arc<dyn Clock>,
    cache: ResponseCache,
    credential_configured: bool,
    repo: String,
    branch: String,
    label: String,
}

impl ChangelogService {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            source_host: ctx.source_host.clone(),
            clock: ctx.clock.clone(),
            cache: ResponseCache::new(ctx.clock.clone()),
            credential_configured: ctx.config.github_token.is_some(),
            repo: ctx.config.repo.clone(),
            branch: ctx.config.primary_branch.clone(),
            label: ctx.config.label.clone(),
        }
    }

    /// Returns the serialized feed page. Cache hits hand back the stored
    /// bytes unchanged.
    pub async fn page(&self, request: &PageRequest) -> AppResult<String> {
        if !self.credential_configured {
            return Err(AppError::Configuration(
                "GITHUB_TOKEN not configured".to_string(),
            ));
        }

        let key = request.cache_key();
        if let Some(payload) = self.cache.get(&key) {
            tracing::debug!(%key, "changelog cache hit");
            return Ok(payload);
        }
        tracing::debug!(%key, "changelog cache miss");

        let feed = self.fetch_page(request).await?;
        let payload = serde_json::to_string(&feed)?;
        self.cache.insert(key, payload.clone());
        Ok(payload)
    }

    async fn fetch_page(&self, request: &PageRequest) -> AppResult<Feed> {
        let merged_since =
            (self.clock.now() - TimeDelta::days(i64::from(request.window_days))).date_naive();
        let page = self
            .source_host
            .merged_page(&PageQuery {
                repo: self.repo.clone(),
                branch: self.branch.clone(),
                label: self.label.clone(),
                merged_since,
                first: request.limit,
                after: request.cursor.clone(),
            })
            .await?;

        let items = page
            .pull_requests
            .iter()
            .filter_map(|pr| build_item(pr, ChannelTable::Service))
            .collect();

        Ok(Feed::assemble(
            self.clock.now(),
            FeedSource {
                repo: self.repo.clone(),
                branch: Some(self.branch.clone()),
                branches: None,
                window_days: Some(request.window_days),
                label: self.label.clone(),
            },
            items,
            page.next_cursor,
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::Ordering;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::config::AppConfig;
    use crate::infra::clock::ManualClock;
    use crate::infra::fake::{FakeHost, pull_request};
    use crate::services::PullRequestPage;

    pub(crate) fn service_with(
        host: FakeHost,
        token: Option<&str>,
    ) -> (Arc<FakeHost>, Arc<ManualClock>, ChangelogService) {
        let host = Arc::new(host);
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap(),
        ));
        let config = AppConfig {
            github_token: token.map(str::to_string),
            api_url: "http://localhost".to_string(),
            repo: "acme/app".to_string(),
            label: "changelog".to_string(),
            primary_branch: "main".to_string(),
            extra_branches: Vec::new(),
            allowed_origins: Vec::new(),
        };
        let ctx = AppContext::new(config, host.clone(), clock.clone());
        (host, clock, ChangelogService::new(&ctx))
    }

    pub(crate) fn host_with_page() -> FakeHost {
        let mut host = FakeHost::default();
        host.page = PullRequestPage {
            pull_requests: vec![
                pull_request(1, "feat: older", "main", 5),
                pull_request(2, "fix: newer", "canary", 7),
                pull_request(3, "chore: same day", "nightly", 7),
            ],
            next_cursor: Some("Y3Vyc29yOjM=".to_string()),
        };
        host
    }

    #[test]
    fn clamps_page_parameters() {
        assert_eq!(
            PageRequest::new(None, None, None),
            PageRequest {
                window_days: 30,
                limit: 20,
                cursor: None
            }
        );
        let clamped = PageRequest::new(Some(0), Some(500), Some("  ".to_string()));
        assert_eq!(clamped.window_days, 1);
        assert_eq!(clamped.limit, 50);
        assert_eq!(clamped.cursor, None);
        assert_eq!(PageRequest::new(Some(9000), Some(0), None).window_days, 365);
        assert_eq!(PageRequest::new(None, Some(0), None).limit, 1);
    }

    #[tokio::test]
    async fn builds_sorted_page_with_cursor() {
        let (host, _, service) = service_with(host_with_page(), Some("token"));
        let request = PageRequest::new(Some(7), Some(10), Some("abc".to_string()));

        let payload = service.page(&request).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();

        let ids: Vec<u64> = json["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(json["items"][0]["channel"], "stable");
        assert_eq!(json["items"][1]["channel"], "canary");
        assert_eq!(json["nextCursor"], "Y3Vyc29yOjM=");
        assert_eq!(json["source"]["branch"], "main");
        assert_eq!(json["source"]["windowDays"], 7);

        let queries = host.page_queries.lock().unwrap();
        assert_eq!(queries[0].first, 10);
        assert_eq!(queries[0].after.as_deref(), Some("abc"));
        assert_eq!(
            queries[0].merged_since,
            chrono::NaiveDate::from_ymd_opt(2025, 1, 24).unwrap()
        );
    }

    #[tokio::test]
    async fn cached_read_is_identical_and_skips_upstream() {
        let (host, clock, service) = service_with(host_with_page(), Some("token"));
        let request = PageRequest::new(None, None, None);

        let first = service.page(&request).await.unwrap();
        clock.advance(TimeDelta::seconds(30));
        let second = service.page(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(host.page_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_triggers_exactly_one_refetch() {
        let (host, clock, service) = service_with(host_with_page(), Some("token"));
        let request = PageRequest::new(None, None, None);

        service.page(&request).await.unwrap();
        clock.advance(TimeDelta::seconds(61));
        service.page(&request).await.unwrap();
        service.page(&request).await.unwrap();

        assert_eq!(host.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_cursors_are_cached_separately() {
        let (host, _, service) = service_with(host_with_page(), Some("token"));

        service.page(&PageRequest::new(None, None, None)).await.unwrap();
        service
            .page(&PageRequest::new(None, None, Some("next".to_string())))
            .await
            .unwrap();

        assert_eq!(host.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn upstream_failure_is_not_cached() {
        let mut host = host_with_page();
        host.fail_pages = true;
        let (host, _, service) = service_with(host, Some("token"));
        let request = PageRequest::new(None, None, None);

        assert!(matches!(service.page(&request).await, Err(AppError::Upstream(_))));
        assert!(matches!(service.page(&request).await, Err(AppError::Upstream(_))));
        assert_eq!(host.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_token_is_configuration_error() {
        let (host, _, service) = service_with(host_with_page(), None);

        let result = service.page(&PageRequest::new(None, None, None)).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(host.page_calls.load(Ordering::SeqCst), 0);
    }
}
