//! Application-facing entry points.
//!
//! One service per mirror calendar: selection changes route through the
//! debouncer, manual syncs run immediately. The persisted selection list
//! itself belongs to the surrounding application; the service only keeps
//! the last value it was handed.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::config::SyncConfig;
use crate::debounce::DebounceController;
use crate::error::SyncResult;
use crate::provider::CalendarProvider;
use crate::reconciler::{Reconciler, SyncReport};
use crate::store::MappingStore;

pub struct SyncService<P, S> {
    reconciler: Arc<Reconciler<P, S>>,
    debounce: DebounceController,
    selection: Mutex<Vec<String>>,
}

impl<P, S> SyncService<P, S>
where
    P: CalendarProvider + 'static,
    S: MappingStore + 'static,
{
    /// Must be called inside a Tokio runtime (spawns the debounce
    /// scheduler).
    pub fn new(
        provider: P,
        store: S,
        mirror_calendar_id: impl Into<String>,
        config: SyncConfig,
    ) -> Self {
        let quiet = config.debounce_interval();
        let reconciler = Arc::new(Reconciler::new(provider, store, mirror_calendar_id, config));
        let debounce = DebounceController::new(reconciler.clone(), quiet);

        SyncService {
            reconciler,
            debounce,
            selection: Mutex::new(Vec::new()),
        }
    }

    /// New set of selected source calendars; syncs after the quiet period.
    pub fn on_selection_changed(&self, selection: Vec<String>) {
        *self.selection.lock().unwrap() = selection.clone();
        self.debounce.trigger(selection);
    }

    /// Sync right now with the current selection, bypassing the debouncer.
    pub async fn manual_sync(&self) -> SyncResult<SyncReport> {
        let selection = self.selection.lock().unwrap().clone();
        self.reconciler.run(&selection).await
    }

    /// Remove every mirrored event this engine created.
    pub async fn clear_mirror(&self) -> SyncResult<SyncReport> {
        self.reconciler.clear().await
    }

    pub fn is_syncing(&self) -> bool {
        self.debounce.is_syncing()
    }

    pub fn subscribe_syncing(&self) -> watch::Receiver<bool> {
        self.debounce.subscribe()
    }
}
