use anyhow::Result;
use log::warn;
use reqwest::Client;
use serde::Deserialize;

use crate::models::WeatherSample;

use super::{
    http::{create_http_client, decode_json, get_body},
    RemoteError, RequestPolicy, WeatherService,
};

#[derive(Debug, Default, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    main: Option<MainBlock>,
    #[serde(default)]
    wind: Option<WindBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: Option<f64>,
}

/// Extract temperature, humidity and wind speed. Any of them (or their
/// enclosing block) may be missing; that dimension is then unavailable.
pub fn parse_current_weather(body: &[u8]) -> Result<WeatherSample, RemoteError> {
    let weather: CurrentWeather = decode_json(body)?;
    let main = weather.main.unwrap_or_default();
    let wind = weather.wind.unwrap_or_default();

    Ok(WeatherSample {
        temperature: main.temp,
        humidity: main.humidity,
        wind_speed: wind.speed,
    })
}

/// OpenWeatherMap "current weather" client, metric units.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    url: String,
    api_key: String,
    policy: RequestPolicy,
}

impl OpenWeatherClient {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        policy: RequestPolicy,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            warn!("Weather API key is empty; weather requests will likely be rejected");
        }

        Ok(Self {
            client: create_http_client(&policy)?,
            url: url.into(),
            api_key,
            policy,
        })
    }
}

impl WeatherService for OpenWeatherClient {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherSample, RemoteError> {
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];
        let body = self
            .policy
            .run("weather fetch", || get_body(&self.client, &self.url, &query))
            .await?;
        parse_current_weather(&body)
    }
}
