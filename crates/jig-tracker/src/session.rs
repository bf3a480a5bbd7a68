//! Search session controller
//!
//! A search runs on a worker thread and reports back over a channel. Each
//! search is tagged with an increasing id and the jig number it was issued
//! for; outcomes that do not match the active search are dropped. Shortage
//! notifications run on their own thread and never alter the session.

use anyhow::{anyhow, bail, Result};
use jig_api::{AlertChannel, ApiClient, ApiError, Notifier};
use jig_core::{
    alert_context, assess_launch, compose_alert, count_shortages, normalize_jig_number,
    sorted_parts, JigSummary, LaunchAssessment, PartRecord,
};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Backend calls needed to run a search
pub trait Backend: Send + Sync {
    fn jig_details(&self, jig_number: &str) -> jig_api::Result<JigSummary>;
    fn all_parts_for_jig(&self, jig_number: &str) -> jig_api::Result<Option<Vec<PartRecord>>>;
}

impl Backend for ApiClient {
    fn jig_details(&self, jig_number: &str) -> jig_api::Result<JigSummary> {
        ApiClient::jig_details(self, jig_number)
    }

    fn all_parts_for_jig(&self, jig_number: &str) -> jig_api::Result<Option<Vec<PartRecord>>> {
        ApiClient::all_parts_for_jig(self, jig_number)
    }
}

/// Where the launch status of a search comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchSource {
    /// Derived from part availability
    Derived,
    /// Answered by the operator
    Operator(bool),
}

#[derive(Debug, Clone, Copy)]
pub struct TrackerOptions {
    pub launch: LaunchSource,
    pub alert_channel: AlertChannel,
    /// Send an alert when the jig is not launched
    pub notify: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            launch: LaunchSource::Derived,
            alert_channel: AlertChannel::default(),
            notify: true,
        }
    }
}

/// Everything known about the jig of the last completed search
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub search_id: u64,
    pub summary: JigSummary,
    /// Display order; `None` when the backend sent no usable list
    pub parts: Option<Vec<PartRecord>>,
    pub launch: LaunchAssessment,
    pub shortage_count: usize,
}

impl Session {
    fn build(
        search_id: u64,
        summary: JigSummary,
        parts: Option<Vec<PartRecord>>,
        launch: LaunchSource,
    ) -> Self {
        // Launch reason follows input order, so assess before sorting
        let launch = match launch {
            LaunchSource::Derived => assess_launch(parts.as_deref()),
            LaunchSource::Operator(is_launched) => LaunchAssessment::manual(is_launched),
        };
        let shortage_count = parts.as_deref().map(count_shortages).unwrap_or(0);
        let parts = parts.map(|p| sorted_parts(&p));

        Self {
            search_id,
            summary,
            parts,
            launch,
            shortage_count,
        }
    }

    pub fn alert_message(&self) -> String {
        compose_alert(
            &self.summary,
            &alert_context(&self.launch),
            self.shortage_count,
        )
    }
}

/// Tagged result sent by the search worker
struct SearchOutcome {
    id: u64,
    jig_number: String,
    result: jig_api::Result<(JigSummary, Option<Vec<PartRecord>>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveSearch {
    id: u64,
    jig_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationState {
    Pending,
    Succeeded(String),
    Failed(String),
}

/// A notification running in the background
pub struct NotificationTask {
    search_id: u64,
    channel: AlertChannel,
    rx: Receiver<std::result::Result<String, String>>,
    state: NotificationState,
}

impl NotificationTask {
    fn spawn(
        notifier: Arc<dyn Notifier>,
        channel: AlertChannel,
        summary: JigSummary,
        message: String,
        search_id: u64,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = notifier
                .notify(channel, &summary, &message)
                .map_err(|e| e.to_string());
            let _ = tx.send(result);
        });

        Self {
            search_id,
            channel,
            rx,
            state: NotificationState::Pending,
        }
    }

    pub fn search_id(&self) -> u64 {
        self.search_id
    }

    pub fn channel(&self) -> AlertChannel {
        self.channel
    }

    /// Current state, picking up a finished result without blocking
    pub fn state(&mut self) -> &NotificationState {
        if self.state == NotificationState::Pending {
            match self.rx.try_recv() {
                Ok(result) => self.finish(result),
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.finish(Err("notification task stopped".to_string()))
                }
            }
        }
        &self.state
    }

    /// Block until the task finishes or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> &NotificationState {
        if self.state == NotificationState::Pending {
            match self.rx.recv_timeout(timeout) {
                Ok(result) => self.finish(result),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.finish(Err("notification task stopped".to_string()))
                }
            }
        }
        &self.state
    }

    fn finish(&mut self, result: std::result::Result<String, String>) {
        self.state = match result {
            Ok(message) => NotificationState::Succeeded(message),
            Err(e) => {
                log::warn!("{} alert failed: {e}", self.channel);
                NotificationState::Failed(e)
            }
        };
    }
}

/// Owns the session and coordinates searches and notifications
pub struct JigTracker {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    options: TrackerOptions,
    search_counter: u64,
    active: Option<ActiveSearch>,
    outcome_tx: Sender<SearchOutcome>,
    outcome_rx: Receiver<SearchOutcome>,
    session: Option<Session>,
    notification: Option<NotificationTask>,
    stale_discarded: u64,
}

impl JigTracker {
    pub fn new(
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        options: TrackerOptions,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            backend,
            notifier,
            options,
            search_counter: 0,
            active: None,
            outcome_tx,
            outcome_rx,
            session: None,
            notification: None,
            stale_discarded: 0,
        }
    }

    /// Start searching for a jig and return the search id.
    ///
    /// Supersedes any search still in flight.
    pub fn search(&mut self, input: &str) -> jig_api::Result<u64> {
        let jig_number = normalize_jig_number(input).ok_or_else(|| {
            ApiError::invalid_input("Please enter a Tester Jig Number to search.")
        })?;

        self.search_counter += 1;
        let id = self.search_counter;
        self.active = Some(ActiveSearch {
            id,
            jig_number: jig_number.clone(),
        });
        log::debug!("Search {id} started for {jig_number}");

        let backend = Arc::clone(&self.backend);
        let tx = self.outcome_tx.clone();
        thread::spawn(move || {
            let result = backend.jig_details(&jig_number).and_then(|summary| {
                let parts = backend.all_parts_for_jig(&jig_number)?;
                Ok((summary, parts))
            });
            let _ = tx.send(SearchOutcome {
                id,
                jig_number,
                result,
            });
        });

        Ok(id)
    }

    /// Apply any finished search without blocking.
    ///
    /// Returns `Some` when the active search completed during this call.
    pub fn poll(&mut self) -> Option<jig_api::Result<()>> {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if let Some(result) = self.apply(outcome) {
                return Some(result);
            }
        }
        None
    }

    /// Block until the active search completes
    pub fn wait(&mut self, timeout: Duration) -> Result<&Session> {
        if self.active.is_none() {
            bail!("No search in progress");
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let outcome = match self.outcome_rx.recv_timeout(remaining) {
                Ok(outcome) => outcome,
                Err(RecvTimeoutError::Timeout) => bail!("Timed out waiting for the backend"),
                Err(RecvTimeoutError::Disconnected) => bail!("Search worker stopped"),
            };
            if let Some(result) = self.apply(outcome) {
                result?;
                return self
                    .session
                    .as_ref()
                    .ok_or_else(|| anyhow!("Search finished without a session"));
            }
        }
    }

    /// Returns `None` for stale outcomes
    fn apply(&mut self, outcome: SearchOutcome) -> Option<jig_api::Result<()>> {
        let is_current = self
            .active
            .as_ref()
            .is_some_and(|a| a.id == outcome.id && a.jig_number == outcome.jig_number);
        if !is_current {
            log::debug!(
                "Discarding stale result of search {} for {}",
                outcome.id,
                outcome.jig_number
            );
            self.stale_discarded += 1;
            return None;
        }
        self.active = None;

        let (summary, parts) = match outcome.result {
            Ok(found) => found,
            Err(e) => {
                self.session = None;
                self.notification = None;
                return Some(Err(e));
            }
        };

        let session = Session::build(outcome.id, summary, parts, self.options.launch);
        self.notification = None;
        if self.options.notify && !session.launch.is_launched {
            self.notification = Some(NotificationTask::spawn(
                Arc::clone(&self.notifier),
                self.options.alert_channel,
                session.summary.clone(),
                session.alert_message(),
                session.search_id,
            ));
        }
        self.session = Some(session);
        Some(Ok(()))
    }

    /// Forget the current session and ignore any search in flight
    pub fn reset(&mut self) {
        self.active = None;
        self.session = None;
        self.notification = None;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.active.is_some()
    }

    /// Notification started by the last completed search
    pub fn notification(&mut self) -> Option<&mut NotificationTask> {
        self.notification.as_mut()
    }

    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded
    }
}
