use serde::Serialize;

use crate::models::{ClimateSample, PrintBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertReason {
    WeatherChanged,
    TemperatureAboveMax,
    TemperatureBelowMin,
    HumidityAboveMax,
    HumidityBelowMin,
    WithinRanges,
}

impl AlertReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertReason::WeatherChanged => "weather changed",
            AlertReason::TemperatureAboveMax => "temperature above max",
            AlertReason::TemperatureBelowMin => "temperature below min",
            AlertReason::HumidityAboveMax => "humidity above max",
            AlertReason::HumidityBelowMin => "humidity below min",
            AlertReason::WithinRanges => "within ranges",
        }
    }

    /// Status line of the print panel (16 columns).
    pub fn panel_text(&self) -> &'static str {
        match self {
            AlertReason::WeatherChanged => "Weather changed!",
            AlertReason::TemperatureAboveMax => "Temp. above max",
            AlertReason::TemperatureBelowMin => "Temp. below min",
            AlertReason::HumidityAboveMax => "Humid. above max",
            AlertReason::HumidityBelowMin => "Humid. below min",
            AlertReason::WithinRanges => "Ok! within ranges",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDecision {
    pub alert: bool,
    pub reason: AlertReason,
}

impl AlertDecision {
    fn raise(reason: AlertReason) -> Self {
        Self {
            alert: true,
            reason,
        }
    }

    fn clear() -> Self {
        Self {
            alert: false,
            reason: AlertReason::WithinRanges,
        }
    }
}

/// Combine the weather drift state with the print-head climate.
///
/// First match wins: weather drift, then temperature above max / below min,
/// then humidity above max / below min. Bounds are inclusive.
pub fn evaluate(
    weather_alert_count: u8,
    sample: &ClimateSample,
    bounds: &PrintBounds,
) -> AlertDecision {
    if weather_alert_count > 0 {
        AlertDecision::raise(AlertReason::WeatherChanged)
    } else if sample.temperature >= bounds.max_temperature {
        AlertDecision::raise(AlertReason::TemperatureAboveMax)
    } else if sample.temperature <= bounds.min_temperature {
        AlertDecision::raise(AlertReason::TemperatureBelowMin)
    } else if sample.humidity >= bounds.max_humidity {
        AlertDecision::raise(AlertReason::HumidityAboveMax)
    } else if sample.humidity <= bounds.min_humidity {
        AlertDecision::raise(AlertReason::HumidityBelowMin)
    } else {
        AlertDecision::clear()
    }
}
