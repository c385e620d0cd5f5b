use serde::Serialize;

use super::{
    session::PrintSession,
    site::{DeltaLimits, PrintBounds, SiteCode},
    weather::{format_reading, ClimateSample, WeatherSample},
};

/// A single snapshot of sensor, weather and bound data reported to the
/// remote datastore once per slow cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: String,
    pub session_id: String,
    pub site_code: SiteCode,
    pub bounds: PrintBounds,
    pub limits: DeltaLimits,
    pub print: ClimateSample,
    pub weather: WeatherSample,
}

impl Lecture {
    pub fn new(
        id: String,
        session: Option<&PrintSession>,
        site_code: SiteCode,
        bounds: PrintBounds,
        limits: DeltaLimits,
        print: ClimateSample,
        weather: WeatherSample,
    ) -> Self {
        Self {
            id,
            session_id: session.map(|s| s.id.clone()).unwrap_or_default(),
            site_code,
            bounds,
            limits,
            print,
            weather,
        }
    }

    /// Query parameters in the shape the `inslec` endpoint expects.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sensvalid", self.id.clone()),
            ("max_print_temp", self.bounds.max_temperature.to_string()),
            ("min_print_temp", self.bounds.min_temperature.to_string()),
            ("max_print_humi", self.bounds.max_humidity.to_string()),
            ("min_print_humi", self.bounds.min_humidity.to_string()),
            ("max_delta_weather_temp", self.limits.temperature.to_string()),
            ("max_delta_weather_humi", self.limits.humidity.to_string()),
            ("max_delta_weather_wind", self.limits.wind.to_string()),
            ("print_temp", self.print.temperature.to_string()),
            ("print_humi", self.print.humidity.to_string()),
            ("weather_temp", format_reading(self.weather.temperature)),
            ("weather_humi", format_reading(self.weather.humidity)),
            ("weather_wind", format_reading(self.weather.wind_speed)),
            ("sessionid", self.session_id.clone()),
            ("sitecode", self.site_code.to_string()),
        ]
    }
}
