//! Trigger debouncing.
//!
//! Selection changes arrive in bursts as the user toggles checkboxes; each
//! burst should cost one reconciliation, not one per click. A trigger arms
//! a deadline one quiet period away and replaces any deadline already
//! armed. A single scheduler task serves deadlines, so at most one
//! scheduled run is pending and an in-flight run is never cancelled; a
//! trigger landing during a run simply arms the next deadline.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::warn;

use crate::provider::CalendarProvider;
use crate::reconciler::Reconciler;
use crate::store::MappingStore;

struct Pending {
    deadline: Option<Instant>,
    selection: Vec<String>,
}

/// Coalesces trigger requests into debounced reconciler runs.
pub struct DebounceController {
    quiet: Duration,
    pending: Arc<Mutex<Pending>>,
    notify: Arc<Notify>,
    syncing_tx: watch::Sender<bool>,
    syncing_rx: watch::Receiver<bool>,
    scheduler: JoinHandle<()>,
}

impl DebounceController {
    /// Spawns the scheduler task; must be called inside a Tokio runtime.
    pub fn new<P, S>(reconciler: Arc<Reconciler<P, S>>, quiet: Duration) -> Self
    where
        P: CalendarProvider + 'static,
        S: MappingStore + 'static,
    {
        let pending = Arc::new(Mutex::new(Pending {
            deadline: None,
            selection: Vec::new(),
        }));
        let notify = Arc::new(Notify::new());
        let (syncing_tx, syncing_rx) = watch::channel(false);

        let scheduler = tokio::spawn(scheduler_loop(
            reconciler,
            pending.clone(),
            notify.clone(),
            syncing_tx.clone(),
        ));

        DebounceController {
            quiet,
            pending,
            notify,
            syncing_tx,
            syncing_rx,
            scheduler,
        }
    }

    /// Schedule a run with this selection after the quiet period, replacing
    /// any pending schedule.
    pub fn trigger(&self, selection: Vec<String>) {
        {
            let mut pending = self.pending.lock().unwrap();
            pending.selection = selection;
            pending.deadline = Some(Instant::now() + self.quiet);
        }
        self.syncing_tx.send_replace(true);
        self.notify.notify_one();
    }

    /// True from the moment a trigger is accepted until the scheduled run
    /// completes with no newer trigger pending.
    pub fn is_syncing(&self) -> bool {
        *self.syncing_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.syncing_tx.subscribe()
    }
}

impl Drop for DebounceController {
    fn drop(&mut self) {
        self.scheduler.abort();
    }
}

async fn scheduler_loop<P, S>(
    reconciler: Arc<Reconciler<P, S>>,
    pending: Arc<Mutex<Pending>>,
    notify: Arc<Notify>,
    syncing: watch::Sender<bool>,
) where
    P: CalendarProvider,
    S: MappingStore,
{
    loop {
        let deadline = pending.lock().unwrap().deadline;
        let Some(deadline) = deadline else {
            notify.notified().await;
            continue;
        };

        tokio::select! {
            // A new trigger moved the deadline; re-read it.
            _ = notify.notified() => {}
            _ = time::sleep_until(deadline) => {
                let selection = {
                    let mut pending = pending.lock().unwrap();
                    pending.deadline = None;
                    pending.selection.clone()
                };

                if let Err(err) = reconciler.run(&selection).await {
                    warn!(error = %err, "debounced sync run failed");
                }

                // Only go quiet if no trigger arrived during the run.
                if pending.lock().unwrap().deadline.is_none() {
                    syncing.send_replace(false);
                }
            }
        }
    }
}
