use crate::alerts::AlertDecision;
use crate::models::{SiteCode, SiteConfig};
use crate::session::{IdGenerator, SessionManager};
use crate::weather::{DeltaResult, WeatherDeltaTracker};

use super::MonitorState;

/// Everything the loop carries from one cycle to the next.
pub struct MonitoringContext<G> {
    pub state: MonitorState,
    pub sessions: SessionManager<G>,
    pub tracker: WeatherDeltaTracker,
    /// Configuration of the last successful refresh.
    pub site: Option<SiteConfig>,
    /// Site the monitor follows once it has seen one that is not idle.
    pub site_code: Option<SiteCode>,
    pub last_weather: Option<DeltaResult>,
    pub last_decision: Option<AlertDecision>,
    /// Successful site refreshes so far.
    pub refreshes: u64,
    /// Fast cycles since the last refresh.
    pub fast_cycles: u32,
}

impl<G: IdGenerator> MonitoringContext<G> {
    pub fn new(ids: G) -> Self {
        Self {
            state: MonitorState::default(),
            sessions: SessionManager::new(ids),
            tracker: WeatherDeltaTracker::new(),
            site: None,
            site_code: None,
            last_weather: None,
            last_decision: None,
            refreshes: 0,
            fast_cycles: 0,
        }
    }

    pub fn refresh_due(&self, delay_cycles: u32) -> bool {
        self.fast_cycles == 0 || self.fast_cycles >= delay_cycles
    }

    pub fn weather_alert_count(&self) -> u8 {
        self.last_weather
            .as_ref()
            .map(DeltaResult::alert_count)
            .unwrap_or(0)
    }

    /// Move to `next`, returning whether the state changed.
    pub fn transition(&mut self, next: MonitorState) -> bool {
        let changed = self.state != next;
        self.state = next;
        changed
    }
}
