use std::sync::LazyLock;

use regex::Regex;

static SCOPED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\(([^)]*)\)(!)?:\s*(.+)$").expect("scoped title pattern is valid")
});

static BARE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)(!)?:\s*(.+)$").expect("bare title pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitType {
    Feat,
    Fix,
    Chore,
    Docs,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Style,
    Revert,
    Change,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Chore => "chore",
            CommitType::Docs => "docs",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Style => "style",
            CommitType::Revert => "revert",
            CommitType::Change => "change",
        }
    }

    /// Maps a raw prefix token onto the known vocabulary. Never fails:
    /// anything unrecognized is a plain `change`.
    pub fn from_token(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "feat" | "feature" | "features" => CommitType::Feat,
            "fix" | "bugfix" | "hotfix" | "bug" => CommitType::Fix,
            "chore" => CommitType::Chore,
            "docs" | "doc" => CommitType::Docs,
            "refactor" | "refactoring" => CommitType::Refactor,
            "perf" | "performance" => CommitType::Perf,
            "test" | "tests" => CommitType::Test,
            "build" => CommitType::Build,
            "ci" => CommitType::Ci,
            "style" => CommitType::Style,
            "revert" => CommitType::Revert,
            _ => CommitType::Change,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTitle {
    pub kind: CommitType,
    pub scope: Option<String>,
    pub subject: String,
    pub breaking: bool,
}

pub fn classify(title: &str, labels: &[String]) -> ClassifiedTitle {
    let trimmed = title.trim();
    let labelled_breaking = labels
        .iter()
        .any(|label| label.trim().eq_ignore_ascii_case("breaking"));

    if let Some(caps) = SCOPED_TITLE.captures(trimmed) {
        let scope = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        return ClassifiedTitle {
            kind: CommitType::from_token(&caps[1]),
            scope,
            subject: normalize_subject(&caps[4]),
            breaking: caps.get(3).is_some() || labelled_breaking,
        };
    }

    if let Some(caps) = BARE_TITLE.captures(trimmed) {
        return ClassifiedTitle {
            kind: CommitType::from_token(&caps[1]),
            scope: None,
            subject: normalize_subject(&caps[3]),
            breaking: caps.get(2).is_some() || labelled_breaking,
        };
    }

    ClassifiedTitle {
        kind: CommitType::Change,
        scope: None,
        subject: normalize_subject(trimmed),
        breaking: labelled_breaking,
    }
}

fn normalize_subject(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_suffix('.').unwrap_or(trimmed).trim_end();
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
