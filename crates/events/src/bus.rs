//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is the publish/subscribe hub for [`ChangeEvent`]s. One bus
//! exists per open context and is shared via `Arc<ChangeBus>`. Collection
//! topics are fed exclusively by the storage bridge; the assignment topic is
//! published directly by the assignment manager after each commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crewline_store::{KEY_ATTENDANCE, KEY_EVENTS, KEY_OPERATORS};

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// Typed bus topics: one per entity collection plus the assignment relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    Operators,
    Events,
    #[serde(rename = "attendance-records")]
    Attendance,
    /// Fired after every assignment manager operation, decoupled from raw
    /// collection writes so consumers that only care about relational
    /// changes need not re-derive on unrelated field edits.
    AssignmentChanged,
}

impl Topic {
    /// Stable wire name of the topic.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operators => "operators",
            Self::Events => "events",
            Self::Attendance => "attendance-records",
            Self::AssignmentChanged => "assignment-changed",
        }
    }

    /// Map a storage key to its collection topic.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        match key {
            KEY_OPERATORS => Some(Self::Operators),
            KEY_EVENTS => Some(Self::Events),
            KEY_ATTENDANCE => Some(Self::Attendance),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// A change notification delivered on the bus.
///
/// Constructed via [`ChangeEvent::new`] and optionally enriched with
/// [`with_payload`](ChangeEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub topic: Topic,

    /// Free-form JSON payload carrying change-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a new event on `topic` with an empty payload.
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out change bus.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers can
/// independently receive every published [`ChangeEvent`]. Delivery is
/// at-most-once per publish and preserves publish order; slow receivers
/// observe `RecvError::Lagged` when the buffer overflows.
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// consumers always recompute from the store, so nothing is lost.
    pub fn publish(&self, event: ChangeEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
