use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a construction site as issued by the site service.
///
/// The service sends it as a JSON number on some endpoints and as a string on
/// others, so both are accepted and normalised to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SiteCode(String);

impl SiteCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SiteCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(value) => SiteCode(value.to_string()),
            Raw::Float(value) if value.fract() == 0.0 => SiteCode((value as i64).to_string()),
            Raw::Float(value) => SiteCode(value.to_string()),
            Raw::Text(value) => SiteCode(value),
        })
    }
}

/// Lifecycle status of a site as stored remotely.
///
/// `0` is an unclaimed site waiting for a monitor, `1` is an active print
/// job and anything above `1` means the operator paused the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SiteStatus {
    Idle,
    Active,
    Paused(i64),
}

impl SiteStatus {
    pub const IDLE_CODE: i64 = 0;
    pub const ACTIVE_CODE: i64 = 1;

    /// Map the raw status integer. Negative values are not part of the
    /// service's vocabulary and yield `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            Self::IDLE_CODE => Some(SiteStatus::Idle),
            Self::ACTIVE_CODE => Some(SiteStatus::Active),
            n if n > Self::ACTIVE_CODE => Some(SiteStatus::Paused(n)),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            SiteStatus::Idle => Self::IDLE_CODE,
            SiteStatus::Active => Self::ACTIVE_CODE,
            SiteStatus::Paused(n) => *n,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, SiteStatus::Paused(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Idle => "Idle",
            SiteStatus::Active => "Active",
            SiteStatus::Paused(_) => "Paused",
        }
    }
}

/// Maximum tolerated drift from the weather baseline, per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaLimits {
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
}

/// Allowed climate window for the concrete mix at the print head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintBounds {
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub min_humidity: f64,
    pub max_humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub code: SiteCode,
    pub status: SiteStatus,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub delta_limits: DeltaLimits,
    pub print_bounds: PrintBounds,
}

impl SiteConfig {
    pub fn is_idle(&self) -> bool {
        self.status == SiteStatus::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.status.is_paused()
    }
}
