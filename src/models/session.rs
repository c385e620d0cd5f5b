use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::site::SiteCode;

/// One tracked print/pour job.
///
/// Created once when the monitor claims an idle site and kept for the rest of
/// the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintSession {
    pub id: String,
    pub site_session_id: String,
    pub color: String,
    pub site_code: SiteCode,
    pub started_at: DateTime<Utc>,
}
