pub mod alerts;
pub mod devices;
pub mod models;
pub mod monitor;
pub mod remote;
pub mod session;
pub mod settings;
pub mod utils;
pub mod weather;

use std::future::Future;

use anyhow::Context;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use alerts::LogActuator;
use devices::{SimulatedSensor, TerminalDisplay};
use monitor::{LoopTiming, MonitoringLoop, Ports};
use remote::{HttpSiteClient, OpenWeatherClient};
use session::UuidIdGenerator;
use settings::SettingsStore;

pub fn run() -> anyhow::Result<()> {
    utils::logging::init();

    info!("CureWatch starting up...");

    let store = SettingsStore::from_env()?;
    let mut settings = store.settings();
    settings.apply_env();
    settings
        .validate()
        .with_context(|| format!("Invalid settings in {}", store.path().display()))?;
    info!(
        "Settings loaded from {} (site API {}, refresh every {} cycles)",
        store.path().display(),
        settings.site_api_base,
        settings.delay_cycles
    );

    // Single-threaded like the device the monitor models; the ports need not be Send.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build the async runtime")?;

    runtime.block_on(async move {
        let ports = Ports {
            site: HttpSiteClient::new(settings.site_api_base.clone(), settings.request)?,
            weather: OpenWeatherClient::new(
                settings.weather_api_url.clone(),
                settings.weather_api_key.clone(),
                settings.request,
            )?,
            sensor: SimulatedSensor::new(&settings.sensor),
            actuator: LogActuator::new(settings.alert_tone_hz),
            print_display: TerminalDisplay::new("print"),
            weather_display: TerminalDisplay::new("weather"),
        };
        let mut monitor =
            MonitoringLoop::new(ports, UuidIdGenerator, LoopTiming::from_settings(&settings));

        let cancel = CancellationToken::new();
        tokio::spawn(cancel_on_interrupt(tokio::signal::ctrl_c(), cancel.clone()));

        monitor.run(cancel).await;
        Ok::<(), anyhow::Error>(())
    })?;

    info!("CureWatch stopped");
    Ok(())
}

/// Cancel the monitor once `interrupt` reports a signal. If the listener
/// cannot be installed the token is left alone and the monitor keeps running.
async fn cancel_on_interrupt<F>(interrupt: F, cancel: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match interrupt.await {
        Ok(()) => {
            info!("Interrupt received, stopping monitor");
            cancel.cancel();
        }
        Err(err) => warn!("Failed to listen for ctrl-c, monitor keeps running: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interrupt_cancels_the_monitor() {
        let cancel = CancellationToken::new();
        cancel_on_interrupt(async { Ok(()) }, cancel.clone()).await;
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn broken_signal_listener_leaves_the_monitor_running() {
        let cancel = CancellationToken::new();
        cancel_on_interrupt(
            async { Err(std::io::Error::other("signal driver unavailable")) },
            cancel.clone(),
        )
        .await;
        assert!(!cancel.is_cancelled());
    }
}
