use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stable,
    Nightly,
    Canary,
    Unknown,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Nightly => "nightly",
            Channel::Canary => "canary",
            Channel::Unknown => "unknown",
        }
    }
}

/// Branch-to-channel table. The snapshot generator and the live service
/// grew different tables and both are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelTable {
    /// `main`, `canary` and `nightly`; anything else is `unknown`.
    Snapshot,
    /// `canary` is canary; every other branch ships as stable.
    Service,
}

impl ChannelTable {
    pub fn channel_for(&self, base_branch: &str) -> Channel {
        let branch = base_branch.trim();
        match self {
            ChannelTable::Snapshot => match branch {
                "main" => Channel::Stable,
                "canary" => Channel::Canary,
                "nightly" => Channel::Nightly,
                _ => Channel::Unknown,
            },
            ChannelTable::Service => match branch {
                "canary" => Channel::Canary,
                _ => Channel::Stable,
            },
        }
    }
}
