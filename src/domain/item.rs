use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::channel::{Channel, ChannelTable};
use crate::domain::pull_request::RawPullRequest;
use crate::domain::release_note::extract_release_note;
use crate::domain::title::classify;

const MAX_CHIPS: usize = 3;
const PROFILE_BASE_URL: &str = "https://github.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub login: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogItem {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub merged_at: DateTime<Utc>,
    pub url: String,
    pub diff_url: String,
    pub author: Option<Author>,
    pub labels: Vec<String>,
    pub channel: Channel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chips: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub breaking: bool,
}

/// Builds one feed entry. Pull requests without a merge timestamp are not
/// changelog material and produce `None`.
pub fn build_item(pr: &RawPullRequest, table: ChannelTable) -> Option<ChangelogItem> {
    let merged_at = pr.merged_at?;
    let classified = classify(&pr.title, &pr.labels);
    let channel = table.channel_for(&pr.base_branch);

    let chips = compose_chips([
        Some(classified.kind.as_str()),
        classified.scope.as_deref(),
        Some(channel.as_str()),
    ]);

    Some(ChangelogItem {
        id: pr.number,
        title: classified.subject,
        summary: extract_release_note(pr.body.as_deref()),
        merged_at,
        url: pr.url.clone(),
        diff_url: format!("{}/files", pr.url.trim_end_matches('/')),
        author: author_for(pr.author.as_deref()),
        labels: dedupe(pr.labels.iter().map(|label| label.trim()).filter(|l| !l.is_empty())),
        channel,
        chips,
        breaking: classified.breaking,
    })
}

fn author_for(login: Option<&str>) -> Option<Author> {
    let login = login.map(str::trim).filter(|login| !login.is_empty())?;
    Some(Author {
        login: login.to_string(),
        url: format!("{PROFILE_BASE_URL}/{login}"),
    })
}

fn compose_chips<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut chips = dedupe(
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|chip| !chip.is_empty()),
    );
    chips.truncate(MAX_CHIPS);
    chips
}

fn dedupe<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
