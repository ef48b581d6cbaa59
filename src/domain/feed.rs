use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::item::ChangelogItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSource {
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub generated_at: DateTime<Utc>,
    pub source: FeedSource,
    pub items: Vec<ChangelogItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl Feed {
    /// Orders items newest merge first (higher id wins ties) and keeps
    /// only the first entry for each id. The cursor is passed through
    /// untouched.
    pub fn assemble(
        generated_at: DateTime<Utc>,
        source: FeedSource,
        items: Vec<ChangelogItem>,
        next_cursor: Option<String>,
    ) -> Self {
        Self {
            generated_at,
            source,
            items: sort_items(items),
            next_cursor,
        }
    }
}

pub fn sort_items(mut items: Vec<ChangelogItem>) -> Vec<ChangelogItem> {
    items.sort_by(|a, b| {
        b.merged_at
            .cmp(&a.merged_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.id));
    items
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::channel::Channel;

    fn item(id: u64, day: u32) -> ChangelogItem {
        ChangelogItem {
            id,
            title: format!("Change {id}"),
            summary: None,
            merged_at: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
            url: format!("https://github.com/acme/app/pull/{id}"),
            diff_url: format!("https://github.com/acme/app/pull/{id}/files"),
            author: None,
            labels: Vec::new(),
            channel: Channel::Stable,
            chips: Vec::new(),
            breaking: false,
        }
    }

    fn ids(items: &[ChangelogItem]) -> Vec<u64> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn sorts_newest_first_with_id_tiebreak() {
        let expected = vec![4, 3, 7, 2, 1];
        let inputs = [
            vec![item(1, 1), item(2, 2), item(3, 5), item(4, 5), item(7, 3)],
            vec![item(7, 3), item(4, 5), item(1, 1), item(3, 5), item(2, 2)],
            vec![item(3, 5), item(2, 2), item(7, 3), item(1, 1), item(4, 5)],
        ];
        for input in inputs {
            assert_eq!(ids(&sort_items(input)), expected);
        }
    }

    #[test]
    fn duplicate_ids_are_dropped() {
        let sorted = sort_items(vec![item(5, 2), item(5, 2), item(6, 1)]);
        assert_eq!(ids(&sorted), vec![5, 6]);
    }

    #[test]
    fn serializes_wire_shape() {
        let generated_at = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let feed = Feed::assemble(
            generated_at,
            FeedSource {
                repo: "acme/app".to_string(),
                branch: Some("main".to_string()),
                branches: None,
                window_days: Some(30),
                label: "changelog".to_string(),
            },
            vec![item(1, 1)],
            Some("Y3Vyc29y".to_string()),
        );
        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json["generatedAt"], "2025-02-01T08:00:00Z");
        assert_eq!(json["source"]["branch"], "main");
        assert!(json["source"].get("branches").is_none());
        assert_eq!(json["source"]["windowDays"], 30);
        assert_eq!(json["nextCursor"], "Y3Vyc29y");
        assert_eq!(json["items"][0]["id"], 1);
    }
}
