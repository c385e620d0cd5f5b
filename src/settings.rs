use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

use crate::remote::RequestPolicy;

pub const SETTINGS_PATH_ENV: &str = "CUREWATCH_SETTINGS";
pub const WEATHER_KEY_ENV: &str = "CUREWATCH_WEATHER_API_KEY";
pub const DEBUG_ENV: &str = "CUREWATCH_DEBUG";
pub const DEFAULT_SETTINGS_FILE: &str = "curewatch.json";

/// Largest drift per reading the simulated sensor accepts.
pub const MAX_SENSOR_STEP: f64 = 10.0;

/// Starting point and drift of the simulated print-head sensor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorSettings {
    pub start_temperature: f64,
    pub start_humidity: f64,
    pub max_step: f64,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            start_temperature: 22.0,
            start_humidity: 60.0,
            max_step: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub site_api_base: String,
    pub weather_api_url: String,
    pub weather_api_key: String,
    /// Fast cycles between two site/weather refreshes.
    pub delay_cycles: u32,
    pub fast_cycle_pause_ms: u64,
    pub alert_hold_ms: u64,
    pub waiting_retry_ms: u64,
    pub alert_tone_duty: u16,
    pub alert_tone_hz: u32,
    pub request: RequestPolicy,
    pub sensor: SensorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_api_base: "https://apex.oracle.com/pls/apex/a00439670".into(),
            weather_api_url: "https://api.openweathermap.org/data/2.5/weather".into(),
            weather_api_key: String::new(),
            delay_cycles: 10,
            fast_cycle_pause_ms: 100,
            alert_hold_ms: 100,
            waiting_retry_ms: 3000,
            alert_tone_duty: 512,
            alert_tone_hz: 1000,
            request: RequestPolicy::default(),
            sensor: SensorSettings::default(),
        }
    }
}

impl Settings {
    pub fn fast_cycle_pause(&self) -> Duration {
        Duration::from_millis(self.fast_cycle_pause_ms)
    }

    pub fn alert_hold(&self) -> Duration {
        Duration::from_millis(self.alert_hold_ms)
    }

    pub fn waiting_retry(&self) -> Duration {
        Duration::from_millis(self.waiting_retry_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.delay_cycles == 0 {
            bail!("delay_cycles must be greater than zero");
        }
        if self.request.max_attempts == 0 {
            bail!("request.max_attempts must be greater than zero");
        }
        if self.alert_tone_duty == 0 || self.alert_tone_duty > 1023 {
            bail!("alert_tone_duty must be within 1..=1023");
        }
        let sensor = &self.sensor;
        if !sensor.start_temperature.is_finite() || !sensor.start_humidity.is_finite() {
            bail!("sensor start values must be finite");
        }
        if !sensor.max_step.is_finite() || sensor.max_step.abs() > MAX_SENSOR_STEP {
            bail!("sensor.max_step must be within -{MAX_SENSOR_STEP}..={MAX_SENSOR_STEP}");
        }
        Ok(())
    }

    /// Apply `CUREWATCH_*` overrides on top of the file values.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(WEATHER_KEY_ENV) {
            if !key.is_empty() {
                self.weather_api_key = key;
            }
        }

        let debug_mode = std::env::var(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            self.delay_cycles = 1;
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid settings in {}", path.display()))?
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Resolve the settings path from `CUREWATCH_SETTINGS`, falling back to
    /// `curewatch.json` in the working directory.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(SETTINGS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> Settings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, settings: Settings) -> Result<()> {
        settings.validate()?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
