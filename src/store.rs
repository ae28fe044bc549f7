//! Persisted mapping between source events and their mirrors.
//!
//! The engine's only durable state: a flat `sourceEventId -> mirroredEventId`
//! record. A missing or corrupt store is not an error; it loads as empty and
//! the reconciler recovers true state from the mirror calendar itself.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SyncError, SyncResult};

/// One persisted association between a source event and its mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMapping {
    pub source_event_id: String,
    pub mirrored_event_id: String,
}

/// The full mapping set, keyed by source event id.
///
/// A `BTreeMap` keeps the serialized file deterministic.
pub type Mappings = BTreeMap<String, String>;

/// Durable key-value persistence for sync mappings.
pub trait MappingStore: Send + Sync {
    /// Load all mappings. Never fails: unreadable or corrupt data yields an
    /// empty set, which callers must treat as "unknown", not "no mirrors".
    fn load(&self) -> Mappings;

    /// Replace the full mapping set.
    fn save(&self, mappings: &Mappings) -> SyncResult<()>;

    /// Record one mapping.
    fn add(&self, source_event_id: &str, mirrored_event_id: &str) -> SyncResult<()>;

    /// Drop the mapping for one source event, if present.
    fn remove(&self, source_event_id: &str) -> SyncResult<()>;
}

impl<T: MappingStore + ?Sized> MappingStore for Arc<T> {
    fn load(&self) -> Mappings {
        (**self).load()
    }

    fn save(&self, mappings: &Mappings) -> SyncResult<()> {
        (**self).save(mappings)
    }

    fn add(&self, source_event_id: &str, mirrored_event_id: &str) -> SyncResult<()> {
        (**self).add(source_event_id, mirrored_event_id)
    }

    fn remove(&self, source_event_id: &str) -> SyncResult<()> {
        (**self).remove(source_event_id)
    }
}

/// File-backed store: one JSON object, written atomically via a temp file
/// and rename.
pub struct JsonMappingStore {
    path: PathBuf,
}

impl JsonMappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonMappingStore { path: path.into() }
    }

    /// Store at the platform data directory, e.g.
    /// `~/.local/share/booked/mappings.json`.
    pub fn default_location() -> SyncResult<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| SyncError::Store("Could not determine data directory".into()))?
            .join("booked");
        Ok(JsonMappingStore::new(dir.join("mappings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingStore for JsonMappingStore {
    fn load(&self) -> Mappings {
        if !self.path.exists() {
            return Mappings::new();
        }

        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "could not read mapping store, starting empty");
                return Mappings::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(mappings) => mappings,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "mapping store corrupt, starting empty");
                Mappings::new()
            }
        }
    }

    fn save(&self, mappings: &Mappings) -> SyncResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(mappings)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;

        // Write to a temp file first, then rename. Rename is atomic on the
        // same filesystem, so a crash never leaves a half-written store.
        let temp = self.path.with_extension("tmp");
        std::fs::write(&temp, contents)?;
        std::fs::rename(&temp, &self.path)?;

        Ok(())
    }

    fn add(&self, source_event_id: &str, mirrored_event_id: &str) -> SyncResult<()> {
        let mut mappings = self.load();
        mappings.insert(source_event_id.to_string(), mirrored_event_id.to_string());
        self.save(&mappings)
    }

    fn remove(&self, source_event_id: &str) -> SyncResult<()> {
        let mut mappings = self.load();
        if mappings.remove(source_event_id).is_some() {
            self.save(&mappings)?;
        }
        Ok(())
    }
}

/// In-memory store behind a mutex.
#[derive(Default)]
pub struct MemoryMappingStore {
    inner: Mutex<Mappings>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents, for inspection.
    pub fn snapshot(&self) -> Mappings {
        self.inner.lock().unwrap().clone()
    }
}

impl MappingStore for MemoryMappingStore {
    fn load(&self) -> Mappings {
        self.inner.lock().unwrap().clone()
    }

    fn save(&self, mappings: &Mappings) -> SyncResult<()> {
        *self.inner.lock().unwrap() = mappings.clone();
        Ok(())
    }

    fn add(&self, source_event_id: &str, mirrored_event_id: &str) -> SyncResult<()> {
        self.inner
            .lock()
            .unwrap()
            .insert(source_event_id.to_string(), mirrored_event_id.to_string());
        Ok(())
    }

    fn remove(&self, source_event_id: &str) -> SyncResult<()> {
        self.inner.lock().unwrap().remove(source_event_id);
        Ok(())
    }
}
