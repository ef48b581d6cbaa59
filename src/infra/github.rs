use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::pull_request::RawPullRequest;
use crate::error::{AppError, AppResult};
use crate::services::{PageQuery, PullRequestPage, SearchQuery, SourceHost};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const SEARCH_PAGE_SIZE: usize = 100;
// The search endpoint stops serving results after 1000 hits.
const MAX_SEARCH_PAGES: u32 = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CLIENT_AGENT: &str = "shiplog";

const MERGED_PAGE_QUERY: &str = r"
query($q: String!, $first: Int!, $after: String) {
  search(query: $q, type: ISSUE, first: $first, after: $after) {
    pageInfo { hasNextPage endCursor }
    nodes {
      ... on PullRequest {
        number
        title
        url
        mergedAt
        baseRefName
        bodyText
        author { login }
        labels(first: 20) { nodes { name } }
      }
    }
  }
}";

pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_url,
            token,
        }
    }

    fn token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("GITHUB_TOKEN not configured".to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> AppResult<RequestBuilder> {
        let token = self.token()?;
        Ok(request
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_AGENT)
            .timeout(REQUEST_TIMEOUT))
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        request
            .send()
            .await
            .map_err(|err| AppError::Upstream(format!("failed to call GitHub: {err}")))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Upstream(format!(
                "GitHub responded with {status}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|err| AppError::Upstream(format!("failed to parse GitHub response: {err}")))
    }

    fn search_terms(repo: &str, branch: &str, label: &str, merged_since: NaiveDate) -> String {
        format!(
            "repo:{repo} is:pr is:merged base:{branch} label:\"{label}\" merged:>={}",
            merged_since.format("%Y-%m-%d")
        )
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn branch_exists(&self, repo: &str, branch: &str) -> AppResult<bool> {
        let url = self.endpoint(&format!("repos/{repo}/branches/{branch}"));
        let response = self.send(self.authorized(self.http.get(url))?).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::Upstream(format!(
                    "GitHub responded with {status} for branch {branch}: {body}"
                )))
            }
        }
    }

    async fn search_merged(&self, query: &SearchQuery) -> AppResult<Vec<u64>> {
        let terms = Self::search_terms(
            &query.repo,
            &query.branch,
            &query.label,
            query.merged_since,
        );
        let url = self.endpoint("search/issues");
        let mut numbers = Vec::new();

        for page in 1..=MAX_SEARCH_PAGES {
            let request = self.http.get(&url).query(&[
                ("q", terms.clone()),
                ("per_page", SEARCH_PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ]);
            let response = self.send(self.authorized(request)?).await?;
            let payload: SearchResponse = Self::read_json(response).await?;

            let page_len = payload.items.len();
            numbers.extend(payload.items.into_iter().filter_map(|item| item.number));
            tracing::debug!(
                branch = %query.branch,
                page,
                page_len,
                total = ?payload.total_count,
                "fetched search page"
            );

            let reached_total = payload
                .total_count
                .and_then(|total| usize::try_from(total).ok())
                .is_some_and(|total| numbers.len() >= total);
            if page_len < SEARCH_PAGE_SIZE || reached_total {
                break;
            }
        }

        Ok(numbers)
    }

    async fn pull_request(&self, repo: &str, number: u64) -> AppResult<RawPullRequest> {
        let url = self.endpoint(&format!("repos/{repo}/pulls/{number}"));
        let response = self.send(self.authorized(self.http.get(url))?).await?;
        let detail: PullRequestDetail = Self::read_json(response).await?;
        Ok(detail.into_raw(number))
    }

    async fn merged_page(&self, query: &PageQuery) -> AppResult<PullRequestPage> {
        let body = json!({
            "query": MERGED_PAGE_QUERY,
            "variables": {
                "q": format!(
                    "{} sort:updated-desc",
                    Self::search_terms(&query.repo, &query.branch, &query.label, query.merged_since)
                ),
                "first": query.first,
                "after": query.after,
            },
        });
        let request = self.http.post(self.endpoint("graphql")).json(&body);
        let response = self.send(self.authorized(request)?).await?;
        let payload: GraphQlResponse = Self::read_json(response).await?;

        if let Some(errors) = payload.errors.filter(|errors| !errors.is_empty()) {
            let messages = errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::Upstream(format!("GitHub GraphQL error: {messages}")));
        }

        let search = payload.data.and_then(|data| data.search).unwrap_or_default();
        let page_info = search.page_info.unwrap_or_default();
        let pull_requests = search
            .nodes
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(PullRequestNode::into_raw)
            .collect();

        Ok(PullRequestPage {
            pull_requests,
            next_cursor: page_info
                .end_cursor
                .filter(|_| page_info.has_next_page),
        })
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value?)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

fn label_names(labels: Option<Vec<LabelRef>>) -> Vec<String> {
    labels
        .unwrap_or_default()
        .into_iter()
        .filter_map(|label| label.name)
        .collect()
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SearchResponse {
    total_count: Option<u64>,
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    number: Option<u64>,
}

#[derive(Deserialize)]
struct UserRef {
    login: Option<String>,
}

#[derive(Deserialize)]
struct LabelRef {
    name: Option<String>,
}

#[derive(Deserialize)]
struct BaseRef {
    #[serde(rename = "ref")]
    name: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PullRequestDetail {
    number: Option<u64>,
    title: Option<String>,
    body: Option<String>,
    merged_at: Option<String>,
    html_url: Option<String>,
    user: Option<UserRef>,
    labels: Option<Vec<LabelRef>>,
    base: Option<BaseRef>,
}

impl PullRequestDetail {
    fn into_raw(self, requested: u64) -> RawPullRequest {
        RawPullRequest {
            number: self.number.unwrap_or(requested),
            title: self.title.unwrap_or_default(),
            body: self.body,
            merged_at: parse_timestamp(self.merged_at.as_deref()),
            base_branch: self.base.and_then(|base| base.name).unwrap_or_default(),
            author: self.user.and_then(|user| user.login),
            labels: label_names(self.labels),
            url: self.html_url.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GraphQlResponse {
    data: Option<SearchData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct SearchData {
    search: Option<SearchConnection>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SearchConnection {
    page_info: Option<PageInfo>,
    nodes: Option<Vec<Option<PullRequestNode>>>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct LabelConnection {
    nodes: Option<Vec<LabelRef>>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct PullRequestNode {
    number: Option<u64>,
    title: Option<String>,
    url: Option<String>,
    merged_at: Option<String>,
    base_ref_name: Option<String>,
    body_text: Option<String>,
    author: Option<UserRef>,
    labels: Option<LabelConnection>,
}

impl PullRequestNode {
    /// Search nodes that are not pull requests come back as empty objects.
    fn into_raw(self) -> Option<RawPullRequest> {
        Some(RawPullRequest {
            number: self.number?,
            title: self.title.unwrap_or_default(),
            body: self.body_text,
            merged_at: parse_timestamp(self.merged_at.as_deref()),
            base_branch: self.base_ref_name.unwrap_or_default(),
            author: self.author.and_then(|author| author.login),
            labels: label_names(self.labels.and_then(|labels| labels.nodes)),
            url: self.url.unwrap_or_default(),
        })
    }
}
