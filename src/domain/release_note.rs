//! One-line release note extraction from free-form pull request bodies.
//!
//! Strategies run in priority order and the first one that produces a line
//! wins: an inline `Release note:` field, then a `## Release notes` section,
//! then the first prose paragraph of the body.

use std::sync::LazyLock;

use regex::Regex;

pub const SUMMARY_LIMIT: usize = 160;
const TRUNCATED_LENGTH: usize = 157;
const ELLIPSIS: &str = "...";

static INLINE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*release\s+notes?\s*(?:\(1 line\))?\s*:\s*(.*)$")
        .expect("inline field pattern is valid")
});

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(#{1,6})\s+(.*?)\s*#*\s*$").expect("heading pattern is valid")
});

static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*- \[[ xX]\]").expect("checkbox pattern is valid"));

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*]|\d+\.)\s+").expect("list marker pattern is valid"));

type Strategy = fn(&[&str]) -> Option<String>;

const STRATEGIES: [Strategy; 3] = [inline_field, heading_section, first_paragraph];

pub fn extract_release_note(body: Option<&str>) -> Option<String> {
    let body = body?;
    let lines: Vec<&str> = body.lines().collect();
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&lines))
        .map(|note| clamp_summary(&note))
}

/// Truncates to 157 characters plus an ellipsis once past the limit.
/// Already-clamped input comes back unchanged.
pub fn clamp_summary(summary: &str) -> String {
    if summary.chars().count() <= SUMMARY_LIMIT {
        return summary.to_string();
    }
    let head: String = summary.chars().take(TRUNCATED_LENGTH).collect();
    format!("{}{ELLIPSIS}", head.trim_end())
}

pub(crate) fn inline_field(lines: &[&str]) -> Option<String> {
    let (index, captured) = lines.iter().enumerate().find_map(|(index, line)| {
        INLINE_FIELD
            .captures(line)
            .map(|caps| (index, caps.get(1).map_or("", |m| m.as_str())))
    })?;

    meaningful_line(captured).or_else(|| {
        lines
            .iter()
            .skip(index + 1)
            .filter(|line| heading(line).is_none())
            .find_map(|line| meaningful_line(line))
    })
}

pub(crate) fn heading_section(lines: &[&str]) -> Option<String> {
    let (start, level) = lines.iter().enumerate().find_map(|(index, line)| {
        let (level, text) = heading(line)?;
        let text = text.to_lowercase();
        let is_release_heading =
            (2..=4).contains(&level) && (text == "release note" || text == "release notes");
        is_release_heading.then_some((index, level))
    })?;

    lines
        .iter()
        .skip(start + 1)
        .take_while(|line| heading(line).is_none_or(|(next, _)| next > level))
        .filter(|line| heading(line).is_none())
        .find_map(|line| meaningful_line(line))
}

pub(crate) fn first_paragraph(lines: &[&str]) -> Option<String> {
    let mut paragraph: Vec<&str> = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        // An empty release-note field label is not prose.
        let terminates = trimmed.is_empty()
            || heading(line).is_some()
            || CHECKBOX.is_match(line)
            || INLINE_FIELD.is_match(line);
        if terminates {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        paragraph.push(trimmed);
    }

    let joined = paragraph
        .iter()
        .flat_map(|line| line.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let caps = HEADING.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2).map_or("", |m| m.as_str());
    Some((level, text))
}

/// Blank and checkbox lines are never meaningful. Anything else loses one
/// list marker and one trailing period, and counts only if text remains.
fn meaningful_line(line: &str) -> Option<String> {
    if line.trim().is_empty() || CHECKBOX.is_match(line) {
        return None;
    }
    let trimmed = line.trim();
    let unlisted = LIST_MARKER.replace(trimmed, "");
    let unlisted = unlisted.trim();
    let stripped = unlisted.strip_suffix('.').unwrap_or(unlisted).trim_end();
    (!stripped.is_empty()).then(|| stripped.to_string())
}
