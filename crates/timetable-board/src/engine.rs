use std::future::Future;

use chrono::NaiveDate;
use timetable_client::{BesteSchuleClient, Resolver, SourceError};
use timetable_core::config::TimetableConfig;
use timetable_core::dates::{format_date, next_valid_date};
use timetable_core::{Result, TimetableError};
use timetable_display::MergedTimeTable;
use tokio::sync::{oneshot, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::credentials::{prompt_token, TokenStore};
use crate::render::render_board;
use crate::session::{LoadState, Session};

/// Build the resolver for a config: HTTPS journal client plus search bound.
pub fn build_resolver(config: &TimetableConfig) -> Result<Resolver> {
    let client = BesteSchuleClient::from_config(&config.api)
        .map_err(|e| TimetableError::Internal(format!("HTTP client setup failed: {e}")))?;
    Ok(Resolver::new(Box::new(client), config.schedule.max_days_off))
}

/// Drives the board: refreshes on a fixed interval and resets everything on
/// the much longer reload interval.
pub struct BoardEngine {
    config: TimetableConfig,
    config_path: Option<String>,
    resolver: Resolver,
    store: TokenStore,
    token: Option<String>,
    /// Fixed start date instead of the wall-clock school day.
    start_date: Option<NaiveDate>,
    session: Session,
}

impl BoardEngine {
    pub fn new(config: TimetableConfig, config_path: Option<String>, resolver: Resolver) -> Self {
        let store = TokenStore::new(&config.credentials.token_path);
        Self {
            config,
            config_path,
            resolver,
            store,
            token: None,
            start_date: None,
            session: Session::new(),
        }
    }

    pub fn with_start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = date;
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Use the stored token, or prompt for one on stdin and store it.
    pub async fn ensure_token(&mut self) -> Result<()> {
        if self.token.is_some() {
            return Ok(());
        }
        if let Some(token) = self.store.load() {
            self.token = Some(token);
            return Ok(());
        }

        info!("no API token stored, prompting");
        // plain thread: a pending stdin read must not hold up runtime shutdown
        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            let _ = tx.send(prompt_token(std::io::stdin().lock(), std::io::stdout()));
        });
        let token = rx
            .await
            .map_err(|_| TimetableError::Internal("token prompt ended without an answer".to_string()))??;
        self.store.save(&token)?;
        self.token = Some(token);
        Ok(())
    }

    fn start_date(&self) -> NaiveDate {
        self.start_date
            .unwrap_or_else(|| next_valid_date(self.config.schedule.school_day_ends_at_hour))
    }

    /// Resolve and merge a fresh timetable into the session.
    ///
    /// Does nothing without a token or while another refresh is in flight.
    pub async fn refresh(&mut self) {
        let Some(token) = self.token.clone() else {
            warn!("no API token, skipping refresh");
            return;
        };
        if !self.session.begin_refresh() {
            debug!("refresh already in flight, ignoring trigger");
            return;
        }

        let start = self.start_date();
        info!(date = %format_date(start), "fetching timetable");
        match self.resolver.resolve(&token, start).await {
            Ok(tt) => {
                let merged = MergedTimeTable::build(&tt);
                info!(
                    date = %merged.date,
                    classes = merged.class_names.len(),
                    days_off = ?merged.days_off,
                    "timetable updated"
                );
                self.session.finish_ok(merged);
            }
            Err(e) => {
                error!(error = %e, "timetable refresh failed");
                if e.is_unauthorized() {
                    self.forget_token();
                }
                self.session.finish_err(describe_failure(&e));
            }
        }
    }

    fn forget_token(&mut self) {
        warn!("API token rejected, it will be requested again");
        self.token = None;
        if let Err(e) = self.store.clear() {
            warn!(code = e.code(), "could not remove stored token: {e}");
        }
    }

    /// Drop all session state, re-read the config and start over.
    pub async fn reload(&mut self) {
        info!("reloading board");
        match TimetableConfig::load(self.config_path.as_deref()) {
            Ok(config) => match build_resolver(&config) {
                Ok(resolver) => {
                    self.store = TokenStore::new(&config.credentials.token_path);
                    self.resolver = resolver;
                    self.config = config;
                }
                Err(e) => warn!("keeping previous resolver: {e}"),
            },
            Err(e) => warn!("config reload failed ({e}), keeping previous config"),
        }
        self.session.reset();
    }

    pub fn render(&self) -> String {
        render_board(&self.session, &self.config.display)
    }

    /// Returns false when shutdown arrived while waiting for a token.
    async fn refresh_and_print(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        if self.token.is_none() {
            match until_shutdown(self.ensure_token(), shutdown).await {
                None => return false,
                Some(Err(e)) => {
                    error!(code = e.code(), "cannot fetch without token: {e}");
                    return true;
                }
                Some(Ok(())) => {}
            }
        }
        self.refresh().await;
        println!("{}", self.render());
        true
    }

    /// Main loop. Runs until `shutdown` broadcasts `true` or its sender is gone.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("board engine started");
        let mut running = self.refresh_and_print(&mut shutdown).await;

        let mut refresh = ticker(self.config.refresh_interval());
        let mut reload = ticker(self.config.reload_interval());
        while running {
            tokio::select! {
                _ = refresh.tick() => {
                    if self.session.wants_periodic_refresh() || self.session.state() == LoadState::Error {
                        running = self.refresh_and_print(&mut shutdown).await;
                    } else {
                        debug!("days off ahead, waiting for reload");
                    }
                }
                _ = reload.tick() => {
                    self.reload().await;
                    refresh = ticker(self.config.refresh_interval());
                    reload = ticker(self.config.reload_interval());
                    running = self.refresh_and_print(&mut shutdown).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        running = false;
                    }
                }
            }
        }
        info!("board engine shutting down");
    }
}

/// Await `fut` unless shutdown is signalled first; `None` means shutdown.
async fn until_shutdown<F: Future>(fut: F, shutdown: &mut watch::Receiver<bool>) -> Option<F::Output> {
    let stop = async {
        loop {
            let stopped = *shutdown.borrow_and_update();
            if stopped || shutdown.changed().await.is_err() {
                return;
            }
        }
    };
    tokio::select! {
        biased;
        _ = stop => None,
        out = fut => Some(out),
    }
}

/// Interval whose first tick is one full period away.
fn ticker(period: std::time::Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn describe_failure(e: &SourceError) -> String {
    if e.is_unauthorized() {
        format!("API token rejected: {e}")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use timetable_client::JournalSource;
    use timetable_core::dates::IsoWeekKey;
    use timetable_core::types::{Day, Group, Lesson, WeekData, WeekJournal};

    struct StaticJournal {
        requests: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl JournalSource for StaticJournal {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch_week(&self, _token: &str, _week: IsoWeekKey) -> std::result::Result<WeekJournal, SourceError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(WeekJournal {
                data: WeekData {
                    days: vec![Day {
                        date: "2025-01-06".to_string(),
                        lessons: vec![Lesson {
                            nr: 1,
                            group: Group {
                                id: None,
                                local_id: "7a".to_string(),
                                level_id: 7,
                            },
                            ..Default::default()
                        }],
                        notes: Vec::new(),
                    }],
                },
            })
        }
    }

    struct Rejecting;

    #[async_trait]
    impl JournalSource for Rejecting {
        fn name(&self) -> &str {
            "rejecting"
        }

        async fn fetch_week(&self, _token: &str, _week: IsoWeekKey) -> std::result::Result<WeekJournal, SourceError> {
            Err(SourceError::Api {
                status: 401,
                message: "Unauthenticated.".to_string(),
            })
        }
    }

    fn config_in(dir: &tempfile::TempDir) -> TimetableConfig {
        let mut config = TimetableConfig::default();
        config.credentials.token_path = dir
            .path()
            .join("token.json")
            .to_string_lossy()
            .into_owned();
        config
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    #[tokio::test]
    async fn refresh_loads_timetable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let requests = Arc::new(AtomicUsize::new(0));
        let resolver = Resolver::new(
            Box::new(StaticJournal {
                requests: requests.clone(),
            }),
            5,
        );
        let mut engine = BoardEngine::new(config_in(&dir), None, resolver)
            .with_start_date(Some(monday()))
            .with_token(Some("tok".to_string()));

        engine.refresh().await;
        assert_eq!(engine.session().state(), LoadState::Loaded);
        let tt = engine.session().timetable().expect("timetable");
        assert_eq!(tt.class_names, vec!["7a"]);
        assert_eq!(requests.load(Ordering::SeqCst), 1);
        assert!(engine.render().contains("7a"));
    }

    #[tokio::test]
    async fn refresh_without_token_does_not_fetch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let requests = Arc::new(AtomicUsize::new(0));
        let resolver = Resolver::new(
            Box::new(StaticJournal {
                requests: requests.clone(),
            }),
            5,
        );
        let mut engine = BoardEngine::new(config_in(&dir), None, resolver);

        engine.refresh().await;
        assert_eq!(engine.session().state(), LoadState::Initial);
        assert_eq!(requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_token_is_forgotten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(&dir);
        let mut engine = BoardEngine::new(config, None, Resolver::new(Box::new(Rejecting), 5))
            .with_start_date(Some(monday()));
        engine.store().save("stale").expect("save");
        engine.ensure_token().await.expect("token from store");

        engine.refresh().await;
        assert_eq!(engine.session().state(), LoadState::Error);
        assert!(engine.store().load().is_none());
        assert!(engine.session().last_error().unwrap().contains("401"));
    }

    #[tokio::test]
    async fn pending_wait_gives_way_to_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move {
            until_shutdown(std::future::pending::<()>(), &mut rx).await
        });
        tx.send(true).expect("receiver alive");
        assert_eq!(waiter.await.expect("join"), None);
    }

    #[tokio::test]
    async fn wait_ends_when_shutdown_sender_is_gone() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert_eq!(until_shutdown(std::future::pending::<u8>(), &mut rx).await, None);
    }

    #[tokio::test]
    async fn finished_wait_returns_its_output() {
        let (_tx, mut rx) = watch::channel(false);
        assert_eq!(until_shutdown(async { 7 }, &mut rx).await, Some(7));
    }

    #[tokio::test]
    async fn shutdown_before_token_stops_the_loop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let requests = Arc::new(AtomicUsize::new(0));
        let resolver = Resolver::new(
            Box::new(StaticJournal {
                requests: requests.clone(),
            }),
            5,
        );
        let engine = BoardEngine::new(config_in(&dir), None, resolver);
        let (tx, rx) = watch::channel(false);
        tx.send(true).expect("receiver alive");

        // no stored token: the prompt must not keep the loop alive
        engine.run(rx).await;
        assert_eq!(requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failure_description_mentions_rejected_token() {
        let e = SourceError::Api {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert!(describe_failure(&e).starts_with("API token rejected"));
    }
}
