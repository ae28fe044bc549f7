//! Reconciliation of the mirror calendar against the source-event set.
//!
//! One reconciler owns one mirror calendar and its mapping set. A run walks
//! fetch, diff, apply; individual event failures are logged and retried on
//! the next run instead of aborting the batch.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::diff::SyncDiff;
use crate::error::{SyncError, SyncResult};
use crate::event::{MirrorFields, SourceEvent};
use crate::provider::CalendarProvider;
use crate::store::{MappingStore, Mappings};
use crate::window::PlanningWindow;

/// Phase of the current run, observable while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Diffing,
    Applying,
}

/// Outcome of one reconciliation pass. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub deleted: usize,
    pub kept: usize,
    pub failed_creates: usize,
    pub failed_deletes: usize,
    /// Mirrored events found on the calendar with no mapping pointing at
    /// them, removed by the recovery sweep.
    pub orphans_removed: usize,
    /// Source calendars skipped after a fetch failure.
    pub calendars_failed: usize,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.failed_creates > 0 || self.failed_deletes > 0 || self.calendars_failed > 0
    }
}

/// Resets the state machine to `Idle` on every exit path.
struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
}

impl<'a> RunGuard<'a> {
    fn acquire(state: &'a Mutex<RunState>) -> SyncResult<Self> {
        let mut current = state.lock().unwrap();
        if *current != RunState::Idle {
            return Err(SyncError::SyncInProgress);
        }
        *current = RunState::Fetching;
        Ok(RunGuard { state })
    }

    fn enter(&self, next: RunState) {
        *self.state.lock().unwrap() = next;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap() = RunState::Idle;
    }
}

pub struct Reconciler<P, S> {
    provider: P,
    store: S,
    mirror_calendar_id: String,
    config: SyncConfig,
    state: Mutex<RunState>,
}

impl<P, S> Reconciler<P, S>
where
    P: CalendarProvider,
    S: MappingStore,
{
    pub fn new(
        provider: P,
        store: S,
        mirror_calendar_id: impl Into<String>,
        config: SyncConfig,
    ) -> Self {
        Reconciler {
            provider,
            store,
            mirror_calendar_id: mirror_calendar_id.into(),
            config,
            state: Mutex::new(RunState::Idle),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap()
    }

    /// One full reconciliation pass for the given source-calendar selection.
    ///
    /// Refuses to start while another run against this mirror calendar is
    /// in flight. Permission failures abort the run; everything else is
    /// isolated per calendar or per event and retried next time.
    pub async fn run(&self, selection: &[String]) -> SyncResult<SyncReport> {
        let guard = RunGuard::acquire(&self.state)?;
        let window = PlanningWindow::starting(Utc::now(), self.config.extension_threshold_days);
        let mut report = SyncReport::default();

        let mut source_events: Vec<SourceEvent> = Vec::new();
        for calendar_id in selection {
            match self.provider.fetch_events(calendar_id, &window).await {
                Ok(events) => source_events.extend(events),
                Err(err @ SyncError::Permission(_)) => return Err(err),
                Err(err) => {
                    warn!(calendar = %calendar_id, error = %err, "skipping source calendar after fetch failure");
                    report.calendars_failed += 1;
                }
            }
        }
        debug!(
            events = source_events.len(),
            days = window.days(),
            "fetched source events"
        );

        guard.enter(RunState::Diffing);
        let mut mappings = self.store.load();
        self.recover(&source_events, &mut mappings, &window, &mut report)
            .await?;

        let diff = SyncDiff::compute(&source_events, &mappings);
        report.kept = diff.to_keep.len();

        guard.enter(RunState::Applying);
        for mapping in &diff.to_delete {
            match self
                .provider
                .delete_mirrored_event(&self.mirror_calendar_id, &mapping.mirrored_event_id)
                .await
            {
                Ok(()) => {
                    self.store.remove(&mapping.source_event_id)?;
                    report.deleted += 1;
                }
                Err(err @ SyncError::Permission(_)) => return Err(err),
                Err(err) => {
                    // Mapping stays in place so the delete retries next run.
                    warn!(source_event = %mapping.source_event_id, error = %err, "failed to delete mirrored event");
                    report.failed_deletes += 1;
                }
            }
        }

        for event in &diff.to_create {
            let fields = MirrorFields::from_source(event, &self.config.mirror_title);
            match self
                .provider
                .create_mirrored_event(&self.mirror_calendar_id, &fields)
                .await
            {
                Ok(mirrored_id) => {
                    self.store.add(&event.id, &mirrored_id)?;
                    report.created += 1;
                }
                Err(err @ SyncError::Permission(_)) => return Err(err),
                Err(err) => {
                    // Event stays unmapped, so it is classified as new again
                    // next run.
                    warn!(source_event = %event.id, error = %err, "failed to create mirrored event");
                    report.failed_creates += 1;
                }
            }
        }

        info!(
            created = report.created,
            deleted = report.deleted,
            kept = report.kept,
            failed_creates = report.failed_creates,
            failed_deletes = report.failed_deletes,
            orphans_removed = report.orphans_removed,
            calendars_failed = report.calendars_failed,
            "sync run finished"
        );
        Ok(report)
    }

    /// Reconcile the mapping set against what is actually on the mirror
    /// calendar.
    ///
    /// The store may be empty or stale (wiped data dir, externally cleared
    /// mirror calendar). Two repairs, both within the current window only:
    /// mirrored events no mapping points at are deleted, so an empty store
    /// cannot accumulate duplicates; mappings whose mirror vanished while
    /// the source event still exists are dropped, so the diff recreates the
    /// mirror. Best-effort: a failing listing skips the sweep.
    async fn recover(
        &self,
        source_events: &[SourceEvent],
        mappings: &mut Mappings,
        window: &PlanningWindow,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        let listed = match self
            .provider
            .list_mirrored_events(&self.mirror_calendar_id, window)
            .await
        {
            Ok(listed) => listed,
            Err(err @ SyncError::Permission(_)) => return Err(err),
            Err(err) => {
                warn!(error = %err, "could not list mirrored events, skipping recovery sweep");
                return Ok(());
            }
        };

        let mapped: HashSet<&str> = mappings.values().map(String::as_str).collect();
        let orphans: Vec<&str> = listed
            .iter()
            .filter(|e| !mapped.contains(e.id.as_str()))
            .map(|e| e.id.as_str())
            .collect();
        drop(mapped);

        for mirrored_id in orphans {
            match self
                .provider
                .delete_mirrored_event(&self.mirror_calendar_id, mirrored_id)
                .await
            {
                Ok(()) => report.orphans_removed += 1,
                Err(err) => {
                    warn!(mirrored_event = %mirrored_id, error = %err, "failed to delete orphaned mirrored event");
                }
            }
        }

        let listed_ids: HashSet<&str> = listed.iter().map(|e| e.id.as_str()).collect();
        let current: HashSet<&str> = source_events.iter().map(|e| e.id.as_str()).collect();
        let vanished: Vec<String> = mappings
            .iter()
            .filter(|(source_id, mirrored_id)| {
                current.contains(source_id.as_str()) && !listed_ids.contains(mirrored_id.as_str())
            })
            .map(|(source_id, _)| source_id.clone())
            .collect();

        for source_id in vanished {
            warn!(source_event = %source_id, "mapped mirrored event no longer exists, scheduling recreate");
            mappings.remove(&source_id);
            self.store.remove(&source_id)?;
        }

        Ok(())
    }

    /// Delete every mapped mirrored event and empty the store.
    ///
    /// The full-clear request: afterwards the mirror calendar holds no
    /// engine-owned events and the next run starts from scratch.
    pub async fn clear(&self) -> SyncResult<SyncReport> {
        let guard = RunGuard::acquire(&self.state)?;
        guard.enter(RunState::Applying);

        let mappings = self.store.load();
        let mut report = SyncReport::default();

        for (source_id, mirrored_id) in &mappings {
            match self
                .provider
                .delete_mirrored_event(&self.mirror_calendar_id, mirrored_id)
                .await
            {
                Ok(()) => {
                    self.store.remove(source_id)?;
                    report.deleted += 1;
                }
                Err(err @ SyncError::Permission(_)) => return Err(err),
                Err(err) => {
                    warn!(source_event = %source_id, error = %err, "failed to delete mirrored event during clear");
                    report.failed_deletes += 1;
                }
            }
        }

        info!(deleted = report.deleted, "mirror calendar cleared");
        Ok(report)
    }
}
