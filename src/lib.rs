//! Busy-block mirroring between calendars.
//!
//! This crate keeps a derived "Booked" calendar in step with a set of
//! selected source calendars: every source event inside the planning
//! window gets an opaque busy block on the mirror, and nothing else
//! crosses over. Third parties consulting the mirror see when you are
//! busy, never why.
//!
//! The pieces:
//! - [`CalendarProvider`]: the I/O seam to an actual calendar backend
//! - [`PlanningWindow`]: how far ahead to synchronize
//! - [`SyncDiff`]: minimal create/delete set against the persisted mapping
//! - [`MappingStore`]: durable source-to-mirror event mapping
//! - [`Reconciler`]: fetch, diff, apply, with per-event failure isolation
//! - [`DebounceController`] / [`SyncService`]: trigger coalescing and the
//!   entry points the surrounding application calls

pub mod config;
pub mod debounce;
pub mod diff;
pub mod error;
pub mod event;
pub mod provider;
pub mod reconciler;
pub mod service;
pub mod store;
pub mod window;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::SyncConfig;
pub use debounce::DebounceController;
pub use diff::SyncDiff;
pub use error::{SyncError, SyncResult};
pub use event::{Availability, EventStatus, MirrorFields, MirroredEvent, SourceEvent};
pub use provider::CalendarProvider;
pub use reconciler::{Reconciler, RunState, SyncReport};
pub use service::SyncService;
pub use store::{JsonMappingStore, MappingStore, Mappings, MemoryMappingStore, SyncMapping};
pub use window::{planned_day_count, PlanningWindow, DEFAULT_EXTENSION_THRESHOLD_DAYS};
