pub mod lecture;
pub mod session;
pub mod site;
pub mod weather;

pub use lecture::Lecture;
pub use session::PrintSession;
pub use site::{DeltaLimits, PrintBounds, SiteCode, SiteConfig, SiteStatus};
pub use weather::{format_reading, ClimateSample, WeatherSample, UNAVAILABLE};
