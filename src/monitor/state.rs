use serde::{Deserialize, Serialize};

use crate::models::{SiteConfig, SiteStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MonitorState {
    /// No claimable site yet, or the known site disappeared.
    AwaitingSite,
    /// Site active: sensor and weather evaluation run.
    Active,
    /// Operator paused the job; nothing is evaluated or reported.
    Paused,
}

impl Default for MonitorState {
    fn default() -> Self {
        MonitorState::AwaitingSite
    }
}

impl MonitorState {
    /// The site service had no matching site.
    pub fn on_site_missing(self) -> Self {
        MonitorState::AwaitingSite
    }

    /// Site fetched and, if it was idle, the claim was attempted.
    ///
    /// An idle site only leaves `AwaitingSite` once the claim moved it to
    /// active.
    pub fn on_site(self, site: &SiteConfig) -> Self {
        match site.status {
            SiteStatus::Idle => MonitorState::AwaitingSite,
            SiteStatus::Active => MonitorState::Active,
            SiteStatus::Paused(_) => MonitorState::Paused,
        }
    }

    pub fn evaluates(&self) -> bool {
        *self == MonitorState::Active
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorState::AwaitingSite => "AwaitingSite",
            MonitorState::Active => "Active",
            MonitorState::Paused => "Paused",
        }
    }
}
