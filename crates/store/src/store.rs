//! Typed entity access over a storage backend.
//!
//! [`EntityStore`] is the single owned instance every component receives a
//! handle to; all mutation in the workspace funnels through it. Collections
//! are read and written whole, one durable key per collection.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, MutexGuard};

use crewline_core::{AttendanceRecord, Event, Operator};

use crate::backend::{StorageBackend, StorageChange};

// ---------------------------------------------------------------------------
// Collection keys
// ---------------------------------------------------------------------------

/// Storage key for the operator collection.
pub const KEY_OPERATORS: &str = "operators";

/// Storage key for the event collection.
pub const KEY_EVENTS: &str = "events";

/// Storage key for the attendance record collection.
pub const KEY_ATTENDANCE: &str = "attendance-records";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for store write failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An outgoing snapshot could not be serialized; nothing was written.
    #[error("Failed to serialize collection '{key}': {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

/// Typed whole-collection access over a [`StorageBackend`].
///
/// Mutators hold [`EntityStore::lock_writes`] across their read-modify-write
/// cycle, so no two in-flight mutations interleave on the same store. Reads
/// clone an immutable snapshot and never block a writer beyond the backend
/// map lock; a read racing a write sees either the pre- or post-write state,
/// never a torn one.
pub struct EntityStore {
    backend: Arc<dyn StorageBackend>,
    write_lock: Mutex<()>,
}

impl EntityStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Acquire the write serialization lock.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Subscribe to raw key changes on the underlying backend.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.backend.subscribe()
    }

    // -----------------------------------------------------------------------
    // Loads
    // -----------------------------------------------------------------------

    pub async fn load_operators(&self) -> Vec<Operator> {
        self.load(KEY_OPERATORS).await
    }

    pub async fn load_events(&self) -> Vec<Event> {
        self.load(KEY_EVENTS).await
    }

    pub async fn load_attendance(&self) -> Vec<AttendanceRecord> {
        self.load(KEY_ATTENDANCE).await
    }

    // -----------------------------------------------------------------------
    // Saves
    // -----------------------------------------------------------------------

    pub async fn save_operators(&self, operators: &[Operator]) -> Result<(), StoreError> {
        self.save(KEY_OPERATORS, operators).await
    }

    pub async fn save_events(&self, events: &[Event]) -> Result<(), StoreError> {
        self.save(KEY_EVENTS, events).await
    }

    pub async fn save_attendance(&self, records: &[AttendanceRecord]) -> Result<(), StoreError> {
        self.save(KEY_ATTENDANCE, records).await
    }

    /// Persist both sides of the assignment relation.
    ///
    /// Both payloads are serialized before either key is written, so a
    /// serialization failure aborts with neither side changed.
    pub async fn save_assignment(
        &self,
        operators: &[Operator],
        events: &[Event],
    ) -> Result<(), StoreError> {
        let operators_json = Self::encode(KEY_OPERATORS, operators)?;
        let events_json = Self::encode(KEY_EVENTS, events)?;
        self.backend.set(KEY_OPERATORS, operators_json).await;
        self.backend.set(KEY_EVENTS, events_json).await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Load a collection, resetting to empty on a malformed payload.
    ///
    /// Storage corruption must never take the system down; the condition is
    /// logged and the caller proceeds with an empty collection.
    async fn load<T: DeserializeOwned>(&self, key: &'static str) -> Vec<T> {
        let Some(raw) = self.backend.get(key).await else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(key, error = %e, "Malformed stored collection, resetting to empty");
                Vec::new()
            }
        }
    }

    async fn save<T: Serialize>(&self, key: &'static str, items: &[T]) -> Result<(), StoreError> {
        let json = Self::encode(key, items)?;
        self.backend.set(key, json).await;
        Ok(())
    }

    fn encode<T: Serialize>(key: &'static str, items: &[T]) -> Result<String, StoreError> {
        serde_json::to_string(items).map_err(|source| StoreError::Serialize { key, source })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
