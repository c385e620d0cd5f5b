//! Remote collaborators: the site service and the weather provider.
//!
//! The monitor only talks to them through [`SiteService`] and
//! [`WeatherService`], so the loop can be driven by fakes in tests and by
//! the HTTP clients in production.

pub mod error;
mod http;
pub mod policy;
pub mod site_api;
pub mod weather_api;

use std::future::Future;

use crate::models::{Lecture, PrintSession, SiteCode, SiteConfig, SiteStatus, WeatherSample};

pub use error::RemoteError;
pub use policy::RequestPolicy;
pub use site_api::HttpSiteClient;
pub use weather_api::OpenWeatherClient;

/// Port for the site configuration/datastore service.
pub trait SiteService {
    /// Look up a site. With `code == None` the service returns the first
    /// unclaimed site. `Ok(None)` means nothing matched.
    fn fetch_site(
        &self,
        code: Option<&SiteCode>,
    ) -> impl Future<Output = Result<Option<SiteConfig>, RemoteError>>;

    /// Record the identifiers of a newly started print session.
    fn register_session(
        &self,
        session: &PrintSession,
    ) -> impl Future<Output = Result<(), RemoteError>>;

    fn update_status(
        &self,
        code: &SiteCode,
        status: SiteStatus,
    ) -> impl Future<Output = Result<(), RemoteError>>;

    /// Store one lecture. The response body is ignored.
    fn report_lecture(&self, lecture: &Lecture) -> impl Future<Output = Result<(), RemoteError>>;
}

/// Port for current weather conditions.
pub trait WeatherService {
    fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<WeatherSample, RemoteError>>;
}
