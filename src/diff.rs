//! Diff computation between the current source-event set and the mapping.
//!
//! Identity is the source event id alone: an event whose time range changed
//! keeps its id and is therefore classified as kept, not recreated. The
//! mirror is intentionally left stale in that case.

use std::collections::HashSet;

use crate::event::SourceEvent;
use crate::store::{Mappings, SyncMapping};

/// The create/delete/keep split for one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct SyncDiff {
    /// Source events with no mapping yet.
    pub to_create: Vec<SourceEvent>,
    /// Mappings whose source event disappeared from the current set
    /// (deleted, moved outside the window, or calendar deselected).
    pub to_delete: Vec<SyncMapping>,
    /// Mappings whose source event is still present. Never touched.
    pub to_keep: Vec<SyncMapping>,
}

impl SyncDiff {
    pub fn compute(source_events: &[SourceEvent], mappings: &Mappings) -> SyncDiff {
        let current: HashSet<&str> = source_events.iter().map(|e| e.id.as_str()).collect();

        let mut to_delete = Vec::new();
        let mut to_keep = Vec::new();
        for (source_id, mirrored_id) in mappings {
            let mapping = SyncMapping {
                source_event_id: source_id.clone(),
                mirrored_event_id: mirrored_id.clone(),
            };
            if current.contains(source_id.as_str()) {
                to_keep.push(mapping);
            } else {
                to_delete.push(mapping);
            }
        }

        // One create per id even if the fetch produced duplicates.
        let mut seen: HashSet<&str> = HashSet::new();
        let to_create = source_events
            .iter()
            .filter(|e| !mappings.contains_key(&e.id) && seen.insert(e.id.as_str()))
            .cloned()
            .collect();

        SyncDiff {
            to_create,
            to_delete,
            to_keep,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}
