use std::env;

use crate::error::{AppError, AppResult};
use crate::infra::github::DEFAULT_API_URL;

const DEFAULT_REPO: &str = "shiplog-dev/shiplog";
const DEFAULT_LABEL: &str = "changelog";
const DEFAULT_PRIMARY_BRANCH: &str = "main";
const DEFAULT_EXTRA_BRANCHES: &str = "canary,nightly";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: Option<String>,
    pub api_url: String,
    pub repo: String,
    pub label: String,
    pub primary_branch: String,
    pub extra_branches: Vec<String>,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let value = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let repo = value("SHIPLOG_REPO").unwrap_or_else(|| DEFAULT_REPO.to_string());
        validate_repo(&repo)?;

        Ok(Self {
            github_token: value("GITHUB_TOKEN"),
            api_url: value("SHIPLOG_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            repo,
            label: value("SHIPLOG_LABEL").unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            primary_branch: value("SHIPLOG_PRIMARY_BRANCH")
                .unwrap_or_else(|| DEFAULT_PRIMARY_BRANCH.to_string()),
            extra_branches: split_list(
                &value("SHIPLOG_EXTRA_BRANCHES")
                    .unwrap_or_else(|| DEFAULT_EXTRA_BRANCHES.to_string()),
            ),
            allowed_origins: split_list(&value("SHIPLOG_ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }
}

fn validate_repo(repo: &str) -> AppResult<()> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(AppError::Configuration(format!(
            "SHIPLOG_REPO must look like owner/name, got '{repo}'"
        ))),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
