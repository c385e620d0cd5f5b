use serde::Serialize;

use crate::models::{format_reading, DeltaLimits, WeatherSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Temperature,
    Humidity,
    Wind,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Temperature, Dimension::Humidity, Dimension::Wind];

    /// Short tag used in the weather summary.
    pub fn tag(&self) -> &'static str {
        match self {
            Dimension::Temperature => "-T",
            Dimension::Humidity => "-H",
            Dimension::Wind => "-W",
        }
    }

    fn index(&self) -> usize {
        match self {
            Dimension::Temperature => 0,
            Dimension::Humidity => 1,
            Dimension::Wind => 2,
        }
    }

    fn limit(&self, limits: &DeltaLimits) -> f64 {
        match self {
            Dimension::Temperature => limits.temperature,
            Dimension::Humidity => limits.humidity,
            Dimension::Wind => limits.wind,
        }
    }

    fn read(&self, sample: &WeatherSample) -> Option<f64> {
        match self {
            Dimension::Temperature => sample.temperature,
            Dimension::Humidity => sample.humidity,
            Dimension::Wind => sample.wind_speed,
        }
    }
}

/// First valid weather reading per dimension. Once a slot is filled it is
/// never overwritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherBaseline {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl WeatherBaseline {
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Temperature => self.temperature,
            Dimension::Humidity => self.humidity,
            Dimension::Wind => self.wind_speed,
        }
    }

    fn slot(&mut self, dimension: Dimension) -> &mut Option<f64> {
        match dimension {
            Dimension::Temperature => &mut self.temperature,
            Dimension::Humidity => &mut self.humidity,
            Dimension::Wind => &mut self.wind_speed,
        }
    }

    /// Record `value` if the slot is still empty; returns the baseline.
    fn settle(&mut self, dimension: Dimension, value: Option<f64>) -> Option<f64> {
        let slot = self.slot(dimension);
        if slot.is_none() {
            *slot = value;
        }
        *slot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionDelta {
    pub dimension: Dimension,
    pub current: Option<f64>,
    pub baseline: Option<f64>,
    /// `None` when the current reading is unavailable.
    pub delta: Option<f64>,
    pub triggered: bool,
}

/// Outcome of one weather observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaResult {
    pub dimensions: [DimensionDelta; 3],
}

impl DeltaResult {
    pub fn get(&self, dimension: Dimension) -> &DimensionDelta {
        &self.dimensions[dimension.index()]
    }

    pub fn alert_count(&self) -> u8 {
        self.dimensions.iter().filter(|d| d.triggered).count() as u8
    }

    pub fn triggered(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.dimensions
            .iter()
            .filter(|d| d.triggered)
            .map(|d| d.dimension)
    }

    /// `-T -H`-style tags of the triggered dimensions, or `stable`.
    pub fn summary(&self) -> String {
        if self.alert_count() == 0 {
            return "stable".to_string();
        }
        self.triggered()
            .map(|d| d.tag())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Bottom line of the weather panel.
    pub fn panel_text(&self) -> String {
        if self.alert_count() == 0 {
            "-Stable weather-".to_string()
        } else {
            format!("{} changed!", self.summary())
        }
    }

    pub fn current_text(&self, dimension: Dimension) -> String {
        format_reading(self.get(dimension).current)
    }

    pub fn baseline_text(&self, dimension: Dimension) -> String {
        format_reading(self.get(dimension).baseline)
    }
}

/// Tracks cumulative weather drift over a whole print job by comparing every
/// sample with the first one seen, not with the previous sample.
#[derive(Debug, Clone, Default)]
pub struct WeatherDeltaTracker {
    baseline: WeatherBaseline,
}

impl WeatherDeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baseline(&self) -> &WeatherBaseline {
        &self.baseline
    }

    /// Settle the baseline with any first readings, then compare.
    ///
    /// A dimension alerts when `|current - baseline| >= limit`. Missing or
    /// non-finite readings are unavailable and never alert.
    pub fn observe(&mut self, sample: &WeatherSample, limits: &DeltaLimits) -> DeltaResult {
        let dimensions = Dimension::ALL.map(|dimension| {
            let current = dimension.read(sample).filter(|value| value.is_finite());
            let baseline = self.baseline.settle(dimension, current);
            let delta = match (current, baseline) {
                (Some(current), Some(baseline)) => Some((current - baseline).abs()),
                _ => None,
            };
            let triggered = delta.is_some_and(|delta| delta >= dimension.limit(limits));

            DimensionDelta {
                dimension,
                current,
                baseline,
                delta,
                triggered,
            }
        });

        DeltaResult { dimensions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: DeltaLimits = DeltaLimits {
        temperature: 5.0,
        humidity: 10.0,
        wind: 3.0,
    };

    fn sample(t: Option<f64>, h: Option<f64>, w: Option<f64>) -> WeatherSample {
        WeatherSample {
            temperature: t,
            humidity: h,
            wind_speed: w,
        }
    }

    #[test]
    fn first_observation_sets_baseline_and_is_stable() {
        let mut tracker = WeatherDeltaTracker::new();
        let result = tracker.observe(&sample(Some(20.0), Some(60.0), Some(2.0)), &LIMITS);

        assert_eq!(result.alert_count(), 0);
        assert_eq!(result.summary(), "stable");
        assert_eq!(result.panel_text(), "-Stable weather-");
        assert_eq!(tracker.baseline().temperature, Some(20.0));
        assert_eq!(result.get(Dimension::Temperature).delta, Some(0.0));
    }

    #[test]
    fn drift_beyond_limit_triggers_temperature() {
        let mut tracker = WeatherDeltaTracker::new();
        tracker.observe(&sample(Some(20.0), Some(60.0), Some(2.0)), &LIMITS);

        let result = tracker.observe(&sample(Some(25.5), Some(60.0), Some(2.0)), &LIMITS);

        let temp = result.get(Dimension::Temperature);
        assert_eq!(temp.delta, Some(5.5));
        assert!(temp.triggered);
        assert_eq!(result.alert_count(), 1);
        assert_eq!(result.summary(), "-T");
        assert_eq!(result.panel_text(), "-T changed!");
    }

    #[test]
    fn delta_equal_to_limit_triggers() {
        let mut tracker = WeatherDeltaTracker::new();
        tracker.observe(&sample(Some(20.0), Some(50.0), Some(1.0)), &LIMITS);

        let result = tracker.observe(&sample(Some(15.0), Some(60.0), Some(4.0)), &LIMITS);

        assert_eq!(result.alert_count(), 3);
        assert_eq!(result.summary(), "-T -H -W");
    }

    #[test]
    fn baseline_never_moves() {
        let mut tracker = WeatherDeltaTracker::new();
        tracker.observe(&sample(Some(20.0), Some(50.0), Some(1.0)), &LIMITS);

        for reading in [35.0, -4.0, 20.5, 19.0] {
            tracker.observe(&sample(Some(reading), Some(reading), Some(reading)), &LIMITS);
            assert_eq!(tracker.baseline().temperature, Some(20.0));
            assert_eq!(tracker.baseline().humidity, Some(50.0));
            assert_eq!(tracker.baseline().wind_speed, Some(1.0));
        }
    }

    #[test]
    fn missing_wind_is_unavailable_and_excluded() {
        let mut tracker = WeatherDeltaTracker::new();
        tracker.observe(&sample(Some(20.0), Some(50.0), Some(1.0)), &LIMITS);

        let result = tracker.observe(&sample(Some(20.0), Some(50.0), None), &LIMITS);

        let wind = result.get(Dimension::Wind);
        assert_eq!(wind.current, None);
        assert_eq!(wind.delta, None);
        assert!(!wind.triggered);
        assert_eq!(result.alert_count(), 0);
        assert_eq!(result.current_text(Dimension::Wind), "N/A");
        assert_eq!(result.baseline_text(Dimension::Wind), "1");
    }

    #[test]
    fn baseline_settles_per_dimension_independently() {
        let mut tracker = WeatherDeltaTracker::new();
        tracker.observe(&sample(Some(20.0), None, None), &LIMITS);
        assert_eq!(tracker.baseline().humidity, None);

        tracker.observe(&sample(Some(21.0), Some(55.0), None), &LIMITS);
        let result = tracker.observe(&sample(Some(21.0), Some(70.0), Some(9.0)), &LIMITS);

        assert_eq!(tracker.baseline().temperature, Some(20.0));
        assert_eq!(tracker.baseline().humidity, Some(55.0));
        assert_eq!(tracker.baseline().wind_speed, Some(9.0));
        assert_eq!(result.triggered().collect::<Vec<_>>(), vec![Dimension::Humidity]);
    }

    #[test]
    fn non_finite_readings_are_ignored() {
        let mut tracker = WeatherDeltaTracker::new();
        let result = tracker.observe(&sample(Some(f64::NAN), Some(50.0), None), &LIMITS);

        assert_eq!(tracker.baseline().temperature, None);
        assert_eq!(result.get(Dimension::Temperature).current, None);
    }
}
