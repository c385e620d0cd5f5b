use anyhow::Result;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

use crate::models::{
    DeltaLimits, Lecture, PrintBounds, PrintSession, SiteCode, SiteConfig, SiteStatus,
};

use super::{
    http::{create_http_client, decode_json, get_body},
    RemoteError, RequestPolicy, SiteService,
};

/// Envelope returned by the site lookup endpoints.
#[derive(Debug, Deserialize)]
struct SiteListing {
    #[serde(default)]
    items: Option<Vec<SiteRecord>>,
}

/// One site row as stored by the site service.
#[derive(Debug, Deserialize)]
struct SiteRecord {
    latitude: f64,
    longitude: f64,
    max_delta_weather_temp: f64,
    max_delta_weather_humi: f64,
    max_delta_weather_wind: f64,
    max_print_temp: f64,
    max_print_humi: f64,
    min_print_temp: f64,
    min_print_humi: f64,
    code: SiteCode,
    status: i64,
    // The service spells this column without the second "i".
    #[serde(rename = "descrption", alias = "description", default)]
    description: Option<String>,
}

impl TryFrom<SiteRecord> for SiteConfig {
    type Error = RemoteError;

    fn try_from(record: SiteRecord) -> Result<Self, Self::Error> {
        let status =
            SiteStatus::from_code(record.status).ok_or(RemoteError::InvalidStatus(record.status))?;

        Ok(SiteConfig {
            code: record.code,
            status,
            description: record.description.unwrap_or_default(),
            latitude: record.latitude,
            longitude: record.longitude,
            delta_limits: DeltaLimits {
                temperature: record.max_delta_weather_temp,
                humidity: record.max_delta_weather_humi,
                wind: record.max_delta_weather_wind,
            },
            print_bounds: PrintBounds {
                min_temperature: record.min_print_temp,
                max_temperature: record.max_print_temp,
                min_humidity: record.min_print_humi,
                max_humidity: record.max_print_humi,
            },
        })
    }
}

/// Parse a lookup response. An empty or absent `items` list means no
/// matching site, which is not an error.
pub fn parse_site_listing(body: &[u8]) -> Result<Option<SiteConfig>, RemoteError> {
    let listing: SiteListing = decode_json(body)?;
    match listing.items.and_then(|items| items.into_iter().next()) {
        Some(record) => SiteConfig::try_from(record).map(Some),
        None => Ok(None),
    }
}

/// HTTP client for the site service (lookup, session registration, status
/// updates and lecture reports).
#[derive(Clone)]
pub struct HttpSiteClient {
    client: Client,
    base_url: String,
    policy: RequestPolicy,
}

impl HttpSiteClient {
    pub fn new(base_url: impl Into<String>, policy: RequestPolicy) -> Result<Self> {
        Ok(Self {
            client: create_http_client(&policy)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_once(&self, code: Option<&SiteCode>) -> Result<Option<SiteConfig>, RemoteError> {
        let body = match code {
            None => get_body(&self.client, &self.url("consite/cons"), &[]).await?,
            Some(code) => {
                get_body(
                    &self.client,
                    &self.url("consite/conscod"),
                    &[("scode", code.to_string())],
                )
                .await?
            }
        };
        parse_site_listing(&body)
    }
}

impl SiteService for HttpSiteClient {
    async fn fetch_site(&self, code: Option<&SiteCode>) -> Result<Option<SiteConfig>, RemoteError> {
        let this = self;
        this.policy
            .run("site lookup", move || this.fetch_once(code))
            .await
    }

    async fn register_session(&self, session: &PrintSession) -> Result<(), RemoteError> {
        let url = self.url("consite/insses");
        let query = [
            ("sscode", session.site_session_id.clone()),
            ("scode", session.site_code.to_string()),
            ("sses", session.id.clone()),
            ("color", session.color.clone()),
        ];
        self.policy
            .run("session registration", || get_body(&self.client, &url, &query))
            .await?;
        info!(
            "Registered print session {} for site {}",
            session.id, session.site_code
        );
        Ok(())
    }

    async fn update_status(&self, code: &SiteCode, status: SiteStatus) -> Result<(), RemoteError> {
        let url = self.url("sitestat/upd");
        let query = [
            ("sstat", status.code().to_string()),
            ("scode", code.to_string()),
        ];
        self.policy
            .run("status update", || get_body(&self.client, &url, &query))
            .await?;
        Ok(())
    }

    async fn report_lecture(&self, lecture: &Lecture) -> Result<(), RemoteError> {
        let url = self.url("consite/inslec");
        let query = lecture.query_pairs();
        self.policy
            .run("lecture report", || get_body(&self.client, &url, &query))
            .await?;
        debug!("Lecture {} stored for site {}", lecture.id, lecture.site_code);
        Ok(())
    }
}
