use chrono::Utc;
use log::{info, warn};

use crate::models::{PrintSession, SiteCode, SiteConfig, SiteStatus};
use crate::remote::{RemoteError, SiteService};

use super::ids::IdGenerator;

/// Owns the print session and drives the remote site status from idle to
/// active when the monitor claims a site.
pub struct SessionManager<G> {
    ids: G,
    session: Option<PrintSession>,
}

impl<G: IdGenerator> SessionManager<G> {
    pub fn new(ids: G) -> Self {
        Self { ids, session: None }
    }

    pub fn session(&self) -> Option<&PrintSession> {
        self.session.as_ref()
    }

    /// Fresh identifier for a lecture report.
    pub fn new_lecture_id(&self) -> String {
        self.ids.unique_id()
    }

    /// Fetch the current configuration, either of the first unclaimed site
    /// (`code == None`) or of a known site. `Ok(None)` is the ordinary
    /// "nothing to monitor yet" outcome.
    pub async fn refresh<S: SiteService>(
        &self,
        site: &S,
        code: Option<&SiteCode>,
    ) -> Result<Option<SiteConfig>, RemoteError> {
        site.fetch_site(code).await
    }

    /// Start the print session for an idle site and claim it.
    ///
    /// The session is created and registered at most once per process. An
    /// idle site is then moved to active remotely and `config` is updated to
    /// match. Sites that are already active are left untouched; in that case
    /// the existing session (if any) is returned. Once a session exists, an
    /// idle site other than the session's own is never claimed.
    pub async fn ensure_session_started<S: SiteService>(
        &mut self,
        site: &S,
        config: &mut SiteConfig,
    ) -> Result<Option<&PrintSession>, RemoteError> {
        if !config.is_idle() {
            return Ok(self.session.as_ref());
        }

        if let Some(session) = &self.session {
            if session.site_code != config.code {
                warn!(
                    "Site {} is idle but session {} belongs to site {}; not claiming it",
                    config.code, session.id, session.site_code
                );
                return Ok(None);
            }
        }

        if self.session.is_none() {
            let session = PrintSession {
                id: self.ids.unique_id(),
                site_session_id: self.ids.unique_id(),
                color: self.ids.color(),
                site_code: config.code.clone(),
                started_at: Utc::now(),
            };
            site.register_session(&session).await?;
            info!(
                "Started print session {} ({}) for site {}",
                session.id, session.color, session.site_code
            );
            self.session = Some(session);
        }

        site.update_status(&config.code, SiteStatus::Active).await?;
        info!("Site {} claimed, status now active", config.code);
        config.status = SiteStatus::Active;

        Ok(self.session.as_ref())
    }

    /// A paused site must not be evaluated this cycle.
    pub fn check_paused(&self, config: &SiteConfig) -> bool {
        config.is_paused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeltaLimits, Lecture, PrintBounds};
    use std::cell::{Cell, RefCell};

    struct CountingIds {
        next: Cell<u32>,
    }

    impl IdGenerator for CountingIds {
        fn unique_id(&self) -> String {
            let n = self.next.get() + 1;
            self.next.set(n);
            format!("{n:025}")
        }

        fn color(&self) -> String {
            "teal".into()
        }
    }

    #[derive(Default)]
    struct RecordingSite {
        registrations: RefCell<Vec<PrintSession>>,
        status_updates: RefCell<Vec<(SiteCode, SiteStatus)>>,
        fail_status_update: Cell<bool>,
    }

    impl SiteService for RecordingSite {
        async fn fetch_site(
            &self,
            _code: Option<&SiteCode>,
        ) -> Result<Option<SiteConfig>, RemoteError> {
            Ok(None)
        }

        async fn register_session(&self, session: &PrintSession) -> Result<(), RemoteError> {
            self.registrations.borrow_mut().push(session.clone());
            Ok(())
        }

        async fn update_status(
            &self,
            code: &SiteCode,
            status: SiteStatus,
        ) -> Result<(), RemoteError> {
            if self.fail_status_update.get() {
                return Err(RemoteError::Http {
                    endpoint: "upd".into(),
                    status: 503,
                });
            }
            self.status_updates.borrow_mut().push((code.clone(), status));
            Ok(())
        }

        async fn report_lecture(&self, _lecture: &Lecture) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    fn site(status: SiteStatus) -> SiteConfig {
        SiteConfig {
            code: SiteCode::new("77"),
            status,
            description: "Test slab".into(),
            latitude: 0.0,
            longitude: 0.0,
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

    fn manager() -> SessionManager<CountingIds> {
        SessionManager::new(CountingIds { next: Cell::new(0) })
    }

    #[tokio::test]
    async fn idle_site_gets_session_and_is_claimed() {
        let remote = RecordingSite::default();
        let mut sessions = manager();
        let mut config = site(SiteStatus::Idle);

        let session = sessions
            .ensure_session_started(&remote, &mut config)
            .await
            .unwrap()
            .cloned()
            .unwrap();

        assert_eq!(session.id.len(), 25);
        assert_ne!(session.id, session.site_session_id);
        assert_eq!(session.color, "teal");
        assert_eq!(session.site_code, SiteCode::new("77"));
        assert_eq!(config.status, SiteStatus::Active);
        assert_eq!(remote.registrations.borrow().len(), 1);
        assert_eq!(
            remote.status_updates.borrow().as_slice(),
            &[(SiteCode::new("77"), SiteStatus::Active)]
        );
    }

    #[tokio::test]
    async fn second_call_reuses_session_without_registering() {
        let remote = RecordingSite::default();
        let mut sessions = manager();

        let mut first = site(SiteStatus::Idle);
        let first_id = sessions
            .ensure_session_started(&remote, &mut first)
            .await
            .unwrap()
            .map(|s| s.id.clone());

        let mut second = site(SiteStatus::Active);
        let second_id = sessions
            .ensure_session_started(&remote, &mut second)
            .await
            .unwrap()
            .map(|s| s.id.clone());

        assert_eq!(first_id, second_id);
        assert_eq!(remote.registrations.borrow().len(), 1);
        assert_eq!(remote.status_updates.borrow().len(), 1);
    }

    #[tokio::test]
    async fn failed_claim_keeps_session_and_retries_status_only() {
        let remote = RecordingSite::default();
        remote.fail_status_update.set(true);
        let mut sessions = manager();
        let mut config = site(SiteStatus::Idle);

        assert!(sessions
            .ensure_session_started(&remote, &mut config)
            .await
            .is_err());
        assert_eq!(config.status, SiteStatus::Idle);
        assert!(sessions.session().is_some());

        remote.fail_status_update.set(false);
        sessions
            .ensure_session_started(&remote, &mut config)
            .await
            .unwrap();

        assert_eq!(config.status, SiteStatus::Active);
        assert_eq!(remote.registrations.borrow().len(), 1);
        assert_eq!(remote.status_updates.borrow().len(), 1);
    }

    #[tokio::test]
    async fn other_idle_site_is_not_claimed_under_existing_session() {
        let remote = RecordingSite::default();
        remote.fail_status_update.set(true);
        let mut sessions = manager();
        let mut first = site(SiteStatus::Idle);
        assert!(sessions
            .ensure_session_started(&remote, &mut first)
            .await
            .is_err());

        remote.fail_status_update.set(false);
        let mut other = SiteConfig {
            code: SiteCode::new("78"),
            ..site(SiteStatus::Idle)
        };
        let claimed = sessions
            .ensure_session_started(&remote, &mut other)
            .await
            .unwrap();

        assert!(claimed.is_none());
        assert_eq!(other.status, SiteStatus::Idle);
        assert!(remote.status_updates.borrow().is_empty());
        assert_eq!(
            sessions.session().map(|s| s.site_code.clone()),
            Some(SiteCode::new("77"))
        );
    }

    #[tokio::test]
    async fn active_site_without_session_is_not_claimed_again() {
        let remote = RecordingSite::default();
        let mut sessions = manager();
        let mut config = site(SiteStatus::Active);

        let session = sessions
            .ensure_session_started(&remote, &mut config)
            .await
            .unwrap();

        assert!(session.is_none());
        assert!(remote.registrations.borrow().is_empty());
        assert!(remote.status_updates.borrow().is_empty());
    }

    #[test]
    fn status_above_one_is_paused() {
        let sessions = manager();
        assert!(!sessions.check_paused(&site(SiteStatus::Idle)));
        assert!(!sessions.check_paused(&site(SiteStatus::Active)));
        assert!(sessions.check_paused(&site(SiteStatus::Paused(2))));
    }
}
