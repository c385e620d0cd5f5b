//! Layout of the two panels: the print-job panel and the weather panel.

use crate::alerts::AlertDecision;
use crate::models::SiteConfig;
use crate::weather::{DeltaResult, Dimension};

use super::display::Frame;

pub fn waiting_for_site() -> Frame {
    Frame::new()
        .line("Waiting for site", 0)
        .line("with status 0", 15)
}

pub fn paused() -> Frame {
    Frame::new().line("Pause print job!", 0)
}

pub fn network_error(what: &str) -> Frame {
    Frame::new()
        .line("Network error", 0)
        .line(what, 15)
        .line("retrying...", 30)
}

/// Concrete-mix bounds and the current alert decision.
pub fn print_status(site: &SiteConfig, decision: &AlertDecision) -> Frame {
    let bounds = &site.print_bounds;
    Frame::new()
        .line(format!("Site: {}", site.description), 0)
        .line("Concrete Mix", 9)
        .line("   Min  Max", 20)
        .line(
            format!("T: {}   {}", bounds.min_temperature, bounds.max_temperature),
            31,
        )
        .line(
            format!("H: {}%  {}%", bounds.min_humidity, bounds.max_humidity),
            42,
        )
        .line(decision.reason.panel_text(), 55)
}

/// Baseline vs current weather, with the refresh counter.
pub fn weather_status(result: &DeltaResult, refreshes: u64) -> Frame {
    Frame::new()
        .line("   Start  Curr", 0)
        .line(format!("i:  1      {refreshes}"), 11)
        .line(
            format!(
                "T: {}  {}",
                result.baseline_text(Dimension::Temperature),
                result.current_text(Dimension::Temperature)
            ),
            22,
        )
        .line(
            format!(
                "H: {} %   {} %",
                result.baseline_text(Dimension::Humidity),
                result.current_text(Dimension::Humidity)
            ),
            33,
        )
        .line(
            format!(
                "W: {}   {}",
                result.baseline_text(Dimension::Wind),
                result.current_text(Dimension::Wind)
            ),
            44,
        )
        .line(result.panel_text(), 55)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::evaluate;
    use crate::models::{
        ClimateSample, DeltaLimits, PrintBounds, SiteCode, SiteStatus, WeatherSample,
    };
    use crate::weather::WeatherDeltaTracker;

    fn site() -> SiteConfig {
        SiteConfig {
            code: SiteCode::new("3"),
            status: SiteStatus::Active,
            description: "Dock".into(),
            latitude: 1.0,
            longitude: 2.0,
            delta_limits: DeltaLimits {
                temperature: 5.0,
                humidity: 10.0,
                wind: 3.0,
            },
            print_bounds: PrintBounds {
                min_temperature: 10.0,
                max_temperature: 30.0,
                min_humidity: 40.0,
                max_humidity: 90.0,
            },
        }
    }

    #[test]
    fn print_panel_shows_bounds_and_reason() {
        let site = site();
        let decision = evaluate(0, &ClimateSample::new(31.0, 60.0), &site.print_bounds);

        let frame = print_status(&site, &decision);

        assert_eq!(
            frame.texts(),
            vec![
                "Site: Dock",
                "Concrete Mix",
                "   Min  Max",
                "T: 10   30",
                "H: 40%  90%",
                "Temp. above max",
            ]
        );
    }

    #[test]
    fn weather_panel_marks_unavailable_wind() {
        let mut tracker = WeatherDeltaTracker::new();
        let result = tracker.observe(
            &WeatherSample {
                temperature: Some(18.5),
                humidity: Some(70.0),
                wind_speed: None,
            },
            &site().delta_limits,
        );

        let frame = weather_status(&result, 4);

        assert_eq!(frame.texts()[1], "i:  1      4");
        assert_eq!(frame.texts()[2], "T: 18.5  18.5");
        assert_eq!(frame.texts()[4], "W: N/A   N/A");
        assert_eq!(frame.texts()[5], "-Stable weather-");
    }
}
