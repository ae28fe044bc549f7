//! In-memory test doubles for the provider seam.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Notify;

use crate::error::{SyncError, SyncResult};
use crate::event::{Availability, EventStatus, MirrorFields, MirroredEvent, SourceEvent};
use crate::provider::CalendarProvider;
use crate::window::PlanningWindow;

pub(crate) const MIRROR_ID: &str = "booked-mirror";

/// A source event `start_in_hours` from now, lasting one hour. Well inside
/// any planning window for small offsets.
pub(crate) fn source_event(
    id: &str,
    calendar_id: &str,
    summary: &str,
    start_in_hours: i64,
) -> SourceEvent {
    let start = Utc::now() + Duration::hours(start_in_hours);
    SourceEvent {
        id: id.to_string(),
        calendar_id: calendar_id.to_string(),
        summary: summary.to_string(),
        start,
        end: start + Duration::hours(1),
        all_day: false,
        availability: Availability::Busy,
        status: EventStatus::Confirmed,
    }
}

/// Scriptable in-memory calendar backend.
#[derive(Default)]
pub(crate) struct MockProvider {
    source: Mutex<HashMap<String, Vec<SourceEvent>>>,
    mirror: Mutex<BTreeMap<String, MirroredEvent>>,
    next_id: AtomicU64,
    deny_permission: AtomicBool,
    fail_fetch: Mutex<HashSet<String>>,
    fail_create_starts: Mutex<HashSet<DateTime<Utc>>>,
    fail_delete_ids: Mutex<HashSet<String>>,
    fetch_log: Mutex<Vec<String>>,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source_event(&self, event: SourceEvent) {
        self.source
            .lock()
            .unwrap()
            .entry(event.calendar_id.clone())
            .or_default()
            .push(event);
    }

    pub fn remove_source_event(&self, calendar_id: &str, event_id: &str) {
        if let Some(events) = self.source.lock().unwrap().get_mut(calendar_id) {
            events.retain(|e| e.id != event_id);
        }
    }

    /// Plant a mirrored event no mapping knows about.
    pub fn seed_mirror(&self, start_in_hours: i64) -> String {
        let id = format!("orphan-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let start = Utc::now() + Duration::hours(start_in_hours);
        self.mirror.lock().unwrap().insert(
            id.clone(),
            MirroredEvent {
                id: id.clone(),
                calendar_id: MIRROR_ID.to_string(),
                title: "Booked".to_string(),
                start,
                end: start + Duration::hours(1),
                all_day: false,
            },
        );
        id
    }

    pub fn mirror_events(&self) -> Vec<MirroredEvent> {
        self.mirror.lock().unwrap().values().cloned().collect()
    }

    /// Wipe the mirror calendar without telling the engine.
    pub fn clear_mirror_storage(&self) {
        self.mirror.lock().unwrap().clear();
    }

    pub fn fetch_log(&self) -> Vec<String> {
        self.fetch_log.lock().unwrap().clone()
    }

    pub fn set_deny_permission(&self, deny: bool) {
        self.deny_permission.store(deny, Ordering::SeqCst);
    }

    pub fn fail_fetch_for(&self, calendar_id: &str) {
        self.fail_fetch
            .lock()
            .unwrap()
            .insert(calendar_id.to_string());
    }

    pub fn fail_create_at(&self, start: DateTime<Utc>) {
        self.fail_create_starts.lock().unwrap().insert(start);
    }

    pub fn clear_create_failures(&self) {
        self.fail_create_starts.lock().unwrap().clear();
    }

    pub fn fail_delete(&self, mirrored_id: &str) {
        self.fail_delete_ids
            .lock()
            .unwrap()
            .insert(mirrored_id.to_string());
    }

    pub fn clear_delete_failures(&self) {
        self.fail_delete_ids.lock().unwrap().clear();
    }

    /// Make every fetch park until the returned handle is notified.
    pub fn gate_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.fetch_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl CalendarProvider for MockProvider {
    async fn fetch_events(
        &self,
        calendar_id: &str,
        window: &PlanningWindow,
    ) -> SyncResult<Vec<SourceEvent>> {
        self.fetch_log.lock().unwrap().push(calendar_id.to_string());

        let gate = self.fetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(SyncError::Permission("calendar access denied".into()));
        }
        if self.fail_fetch.lock().unwrap().contains(calendar_id) {
            return Err(SyncError::Provider(format!(
                "calendar {calendar_id} unavailable"
            )));
        }

        Ok(self
            .source
            .lock()
            .unwrap()
            .get(calendar_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| window.overlaps(e.start, e.end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_mirrored_event(
        &self,
        calendar_id: &str,
        fields: &MirrorFields,
    ) -> SyncResult<String> {
        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(SyncError::Permission("calendar access denied".into()));
        }
        if self.fail_create_starts.lock().unwrap().contains(&fields.start) {
            return Err(SyncError::Provider("create rejected".into()));
        }

        let id = format!("mir-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.mirror.lock().unwrap().insert(
            id.clone(),
            MirroredEvent {
                id: id.clone(),
                calendar_id: calendar_id.to_string(),
                title: fields.title.clone(),
                start: fields.start,
                end: fields.end,
                all_day: fields.all_day,
            },
        );
        Ok(id)
    }

    async fn delete_mirrored_event(&self, _calendar_id: &str, event_id: &str) -> SyncResult<()> {
        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(SyncError::Permission("calendar access denied".into()));
        }
        if self.fail_delete_ids.lock().unwrap().contains(event_id) {
            return Err(SyncError::Provider("delete rejected".into()));
        }

        match self.mirror.lock().unwrap().remove(event_id) {
            Some(_) => Ok(()),
            None => Err(SyncError::Provider(format!(
                "no such mirrored event: {event_id}"
            ))),
        }
    }

    async fn list_mirrored_events(
        &self,
        calendar_id: &str,
        window: &PlanningWindow,
    ) -> SyncResult<Vec<MirroredEvent>> {
        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(SyncError::Permission("calendar access denied".into()));
        }

        Ok(self
            .mirror
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.calendar_id == calendar_id && window.overlaps(e.start, e.end))
            .cloned()
            .collect())
    }
}
