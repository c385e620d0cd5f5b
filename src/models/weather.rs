use serde::{Deserialize, Serialize};

/// Placeholder printed wherever a reading is unavailable.
pub const UNAVAILABLE: &str = "N/A";

/// Current weather at the site. `None` means the provider omitted the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSample {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// Local temperature/humidity at the print head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateSample {
    pub temperature: f64,
    pub humidity: f64,
}

impl ClimateSample {
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

/// Render an optional reading the way the panels and the lecture endpoint
/// expect it.
pub fn format_reading(value: Option<f64>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => UNAVAILABLE.to_string(),
    }
}
