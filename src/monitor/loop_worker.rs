use anyhow::{Context, Result};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{
    alerts::{evaluate, AlertActuator, AlertPulse},
    devices::{panels, ClimateSensor, DisplaySurface, Frame},
    models::{ClimateSample, Lecture, SiteConfig},
    remote::{RemoteError, SiteService, WeatherService},
    session::IdGenerator,
    settings::Settings,
};

use super::{MonitorState, MonitoringContext};

// Set to false to silence this module's cycle logging
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// The collaborators the loop drives.
pub struct Ports<S, W, C, A, D> {
    pub site: S,
    pub weather: W,
    pub sensor: C,
    pub actuator: A,
    pub print_display: D,
    pub weather_display: D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Fast cycles per slow (site + weather) cycle.
    pub delay_cycles: u32,
    pub fast_pause: Duration,
    pub waiting_retry: Duration,
    pub pulse: AlertPulse,
}

impl LoopTiming {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            delay_cycles: settings.delay_cycles.max(1),
            fast_pause: settings.fast_cycle_pause(),
            waiting_retry: settings.waiting_retry(),
            pulse: AlertPulse::new(settings.alert_tone_duty, settings.alert_hold()),
        }
    }
}

/// How a slow cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlowCycle {
    /// Site active, weather refreshed (or kept) and lecture sent.
    Monitoring,
    /// Site lookup failed but the last known active configuration is used.
    Degraded,
    AwaitingSite,
    Paused,
    /// Remote failure with nothing to fall back on.
    Failed,
}

impl SlowCycle {
    pub fn proceeds(&self) -> bool {
        matches!(self, SlowCycle::Monitoring | SlowCycle::Degraded)
    }
}

pub struct MonitoringLoop<S, W, C, A, D, G> {
    ports: Ports<S, W, C, A, D>,
    context: MonitoringContext<G>,
    timing: LoopTiming,
}

impl<S, W, C, A, D, G> MonitoringLoop<S, W, C, A, D, G>
where
    S: SiteService,
    W: WeatherService,
    C: ClimateSensor,
    A: AlertActuator,
    D: DisplaySurface,
    G: IdGenerator,
{
    pub fn new(ports: Ports<S, W, C, A, D>, ids: G, timing: LoopTiming) -> Self {
        Self {
            ports,
            context: MonitoringContext::new(ids),
            timing,
        }
    }

    pub fn ports(&self) -> &Ports<S, W, C, A, D> {
        &self.ports
    }

    pub fn context(&self) -> &MonitoringContext<G> {
        &self.context
    }

    /// Run until `cancel` fires. Cycle errors are logged and retried; the
    /// alert outputs are silenced on the way out.
    pub async fn run(&mut self, cancel: CancellationToken) {
        log_info!(
            "monitoring loop started (site refresh every {} cycles)",
            self.timing.delay_cycles
        );

        loop {
            let outcome = tokio::select! {
                result = self.step() => Some(result),
                _ = cancel.cancelled() => None,
            };

            let Some(result) = outcome else {
                break;
            };

            if let Err(err) = result {
                log_error!("monitoring cycle failed: {err:?}");
                let retry = self.timing.waiting_retry;
                tokio::select! {
                    _ = tokio::time::sleep(retry) => {}
                    _ = cancel.cancelled() => break,
                }
            }
        }

        if let Err(err) = self.ports.actuator.silence() {
            log_error!("failed to silence alert outputs: {err:?}");
        }
        log_info!("monitoring loop shutting down");
    }

    /// One pass: read the sensor, refresh site and weather when due, then
    /// evaluate and render.
    ///
    /// Without a sensor reading the slow cycle still follows the remote
    /// status; only the evaluation and the lecture report are skipped.
    pub async fn step(&mut self) -> Result<()> {
        let sample = match self.ports.sensor.measure() {
            Ok(sample) => Some(sample),
            Err(err) => {
                log_warn!("sensor read failed: {err:#}");
                None
            }
        };

        if self.context.refresh_due(self.timing.delay_cycles) {
            let outcome = self.run_slow_cycle(sample.as_ref()).await;
            log_debug!("slow cycle ended: {outcome:?}");
            if !outcome.proceeds() {
                tokio::time::sleep(self.timing.waiting_retry).await;
                return Ok(());
            }
        }

        let Some(sample) = sample else {
            // Keeps the refresh cadence while the sensor is down.
            self.context.fast_cycles = self.context.fast_cycles.saturating_add(1);
            tokio::time::sleep(self.timing.fast_pause).await;
            return Ok(());
        };

        self.run_fast_cycle(&sample).await
    }

    /// Site refresh, session claim, weather drift and lecture report, in
    /// that order.
    pub async fn run_slow_cycle(&mut self, sample: Option<&ClimateSample>) -> SlowCycle {
        // A started session pins the monitor to its site, even before the
        // claim went through.
        let code = self.context.site_code.clone().or_else(|| {
            self.context
                .sessions
                .session()
                .map(|session| session.site_code.clone())
        });
        let fetched = match self
            .context
            .sessions
            .refresh(&self.ports.site, code.as_ref())
            .await
        {
            Ok(fetched) => fetched,
            Err(err) => return self.on_remote_failure("site lookup", err),
        };

        let Some(mut site) = fetched else {
            let next = self.context.state.on_site_missing();
            self.enter(next);
            self.context.site = None;
            self.render_both(&panels::waiting_for_site());
            return SlowCycle::AwaitingSite;
        };

        if self.context.sessions.check_paused(&site) {
            self.context.site_code = Some(site.code.clone());
            let next = self.context.state.on_site(&site);
            self.enter(next);
            self.context.site = Some(site);
            self.render_both(&panels::paused());
            return SlowCycle::Paused;
        }

        let claim = self
            .context
            .sessions
            .ensure_session_started(&self.ports.site, &mut site)
            .await
            .map(|_| ());
        if let Err(err) = claim {
            if let Some(session) = self.context.sessions.session() {
                self.context.site_code = Some(session.site_code.clone());
            }
            return self.on_remote_failure("session start", err);
        }

        let next = self.context.state.on_site(&site);
        self.enter(next);
        if !next.evaluates() {
            self.context.site = None;
            self.render_both(&panels::waiting_for_site());
            return SlowCycle::AwaitingSite;
        }

        self.context.site_code = Some(site.code.clone());
        self.context.site = Some(site.clone());
        self.context.fast_cycles = 0;
        self.context.refreshes += 1;

        self.refresh_weather(&site, sample).await;
        SlowCycle::Monitoring
    }

    async fn refresh_weather(&mut self, site: &SiteConfig, sample: Option<&ClimateSample>) {
        let weather = match self
            .ports
            .weather
            .current(site.latitude, site.longitude)
            .await
        {
            Ok(weather) => weather,
            Err(err) => {
                log_warn!(
                    "weather fetch failed for site {}: {err}; keeping previous weather state",
                    site.code
                );
                self.render_weather(&panels::network_error("weather"));
                return;
            }
        };

        let result = self.context.tracker.observe(&weather, &site.delta_limits);
        if result.alert_count() > 0 {
            log_warn!("weather drift at site {}: {}", site.code, result.summary());
        }
        self.render_weather(&panels::weather_status(&result, self.context.refreshes));
        self.context.last_weather = Some(result);

        let Some(sample) = sample else {
            log_debug!("no sensor reading, lecture for site {} skipped", site.code);
            return;
        };
        let lecture = Lecture::new(
            self.context.sessions.new_lecture_id(),
            self.context.sessions.session(),
            site.code.clone(),
            site.print_bounds,
            site.delta_limits,
            *sample,
            weather,
        );
        if let Err(err) = self.ports.site.report_lecture(&lecture).await {
            log_warn!("lecture {} not stored: {err}", lecture.id);
        }
    }

    /// Evaluate the local reading against the site bounds and weather state,
    /// pulse the alert outputs if needed and render the print panel.
    pub async fn run_fast_cycle(&mut self, sample: &ClimateSample) -> Result<()> {
        if !self.context.state.evaluates() {
            return Ok(());
        }
        let Some(site) = self.context.site.as_ref() else {
            return Ok(());
        };

        let decision = evaluate(
            self.context.weather_alert_count(),
            sample,
            &site.print_bounds,
        );
        let frame = panels::print_status(site, &decision);

        let previous = self.context.last_decision.map(|d| d.reason);
        if previous != Some(decision.reason) {
            if decision.alert {
                log_warn!(
                    "alert at site {}: {} (T={} H={})",
                    site.code,
                    decision.reason.as_str(),
                    sample.temperature,
                    sample.humidity
                );
            } else {
                log_info!("site {} readings within ranges", site.code);
            }
        }

        if decision.alert {
            self.timing
                .pulse
                .fire(&mut self.ports.actuator)
                .await
                .context("alert pulse failed")?;
        } else {
            tokio::time::sleep(self.timing.fast_pause).await;
        }

        self.render_print(&frame);
        self.context.last_decision = Some(decision);
        self.context.fast_cycles = self.context.fast_cycles.saturating_add(1);
        Ok(())
    }

    fn on_remote_failure(&mut self, what: &str, err: RemoteError) -> SlowCycle {
        if self.context.state.evaluates() && self.context.site.is_some() {
            log_warn!("{what} failed: {err}; monitoring continues with the last known site configuration");
            self.context.fast_cycles = 0;
            self.render_weather(&panels::network_error(what));
            SlowCycle::Degraded
        } else {
            log_error!("{what} failed: {err}; retrying next cycle");
            self.render_both(&panels::network_error(what));
            SlowCycle::Failed
        }
    }

    fn enter(&mut self, next: MonitorState) {
        let previous = self.context.state;
        if self.context.transition(next) {
            log_info!("monitor state {} -> {}", previous.as_str(), next.as_str());
        }
    }

    fn render_print(&mut self, frame: &Frame) {
        if let Err(err) = frame.draw_on(&mut self.ports.print_display) {
            log_warn!("print display update failed: {err:#}");
        }
    }

    fn render_weather(&mut self, frame: &Frame) {
        if let Err(err) = frame.draw_on(&mut self.ports.weather_display) {
            log_warn!("weather display update failed: {err:#}");
        }
    }

    fn render_both(&mut self, frame: &Frame) {
        self.render_print(frame);
        self.render_weather(frame);
    }
}
