//! Calendar provider capability surface.
//!
//! The engine's only I/O boundary besides the mapping store. Implementors
//! wrap a platform calendar API (EventKit, Google Calendar, CalDAV, a test
//! double); the engine never sees anything more concrete than this trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::event::{MirrorFields, MirroredEvent, SourceEvent};
use crate::window::PlanningWindow;

/// Operations the engine requires from its calendar environment.
///
/// Fetching is one call per source calendar so the reconciler can isolate
/// a failing calendar without losing the others. Implementations should
/// return [`SyncError::Permission`](crate::SyncError::Permission) for
/// authorization failures; the reconciler treats those as fatal for the
/// run and everything else as a per-item or per-calendar failure.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Events from one source calendar intersecting the window.
    async fn fetch_events(
        &self,
        calendar_id: &str,
        window: &PlanningWindow,
    ) -> SyncResult<Vec<SourceEvent>>;

    /// Create an event on the mirror calendar, returning the identity the
    /// provider assigned to it.
    async fn create_mirrored_event(
        &self,
        calendar_id: &str,
        fields: &MirrorFields,
    ) -> SyncResult<String>;

    /// Delete a previously created mirrored event.
    async fn delete_mirrored_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<()>;

    /// Events currently on the mirror calendar within the window. Used to
    /// recover true state when the mapping store disagrees with reality.
    async fn list_mirrored_events(
        &self,
        calendar_id: &str,
        window: &PlanningWindow,
    ) -> SyncResult<Vec<MirroredEvent>>;
}

#[async_trait]
impl<T: CalendarProvider + ?Sized> CalendarProvider for Arc<T> {
    async fn fetch_events(
        &self,
        calendar_id: &str,
        window: &PlanningWindow,
    ) -> SyncResult<Vec<SourceEvent>> {
        (**self).fetch_events(calendar_id, window).await
    }

    async fn create_mirrored_event(
        &self,
        calendar_id: &str,
        fields: &MirrorFields,
    ) -> SyncResult<String> {
        (**self).create_mirrored_event(calendar_id, fields).await
    }

    async fn delete_mirrored_event(&self, calendar_id: &str, event_id: &str) -> SyncResult<()> {
        (**self).delete_mirrored_event(calendar_id, event_id).await
    }

    async fn list_mirrored_events(
        &self,
        calendar_id: &str,
        window: &PlanningWindow,
    ) -> SyncResult<Vec<MirroredEvent>> {
        (**self).list_mirrored_events(calendar_id, window).await
    }
}
