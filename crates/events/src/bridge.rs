//! Storage-to-bus bridge.
//!
//! [`StorageBridge`] subscribes to a backend watch channel and republishes
//! every key change as a typed topic on the local [`ChangeBus`]. The watch
//! channel is the only feed for collection topics, so each durable write is
//! observed exactly once per context — in the context that performed the
//! write and in every other open context over the same backend.

use std::sync::Arc;

use tokio::sync::broadcast;

use crewline_store::StorageChange;

use crate::bus::{ChangeBus, ChangeEvent, Topic};

/// Background task that forwards storage changes onto the change bus.
pub struct StorageBridge;

impl StorageBridge {
    /// Run the bridge loop.
    ///
    /// Subscribes to the storage watch channel via the provided `receiver`
    /// and republishes every collection change. The loop exits when the
    /// channel is closed (i.e. the backend is dropped).
    pub async fn run(mut receiver: broadcast::Receiver<StorageChange>, bus: Arc<ChangeBus>) {
        loop {
            match receiver.recv().await {
                Ok(change) => {
                    let Some(topic) = Topic::from_storage_key(&change.key) else {
                        tracing::debug!(key = %change.key, "Ignoring change on unknown storage key");
                        continue;
                    };
                    bus.publish(
                        ChangeEvent::new(topic)
                            .with_payload(serde_json::json!({ "key": change.key })),
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Coalesced deliveries are safe: consumers recompute from
                    // the store, not from the event payload.
                    tracing::warn!(skipped = n, "Storage bridge lagged, changes were coalesced");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Storage watch channel closed, bridge shutting down");
                    break;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crewline_store::{MemoryBackend, StorageBackend};

    #[tokio::test]
    async fn collection_writes_surface_as_topics() {
        let backend = Arc::new(MemoryBackend::new());
        let bus = Arc::new(ChangeBus::default());
        let mut rx = bus.subscribe();

        tokio::spawn(StorageBridge::run(backend.subscribe(), bus.clone()));

        backend.set("operators", "[]".to_string()).await;
        backend.set("events", "[]".to_string()).await;

        assert_eq!(rx.recv().await.unwrap().topic, Topic::Operators);
        assert_eq!(rx.recv().await.unwrap().topic, Topic::Events);
    }

    #[tokio::test]
    async fn unknown_keys_are_not_republished() {
        let backend = Arc::new(MemoryBackend::new());
        let bus = Arc::new(ChangeBus::default());
        let mut rx = bus.subscribe();

        tokio::spawn(StorageBridge::run(backend.subscribe(), bus.clone()));

        backend.set("session-token", "x".to_string()).await;
        backend.set("attendance-records", "[]".to_string()).await;

        // Only the known collection key comes through.
        let event = rx.recv().await.unwrap();
        assert_eq!(event.topic, Topic::Attendance);
    }

    #[tokio::test]
    async fn each_write_is_delivered_exactly_once() {
        let backend = Arc::new(MemoryBackend::new());
        let bus = Arc::new(ChangeBus::default());
        let mut rx = bus.subscribe();

        tokio::spawn(StorageBridge::run(backend.subscribe(), bus.clone()));

        backend.set("operators", "[1]".to_string()).await;

        assert_eq!(rx.recv().await.unwrap().topic, Topic::Operators);

        // No duplicate delivery follows.
        let no_more =
            tokio::time::timeout(std::time::Duration::from_millis(50), rx.recv()).await;
        assert!(no_more.is_err());
    }
}
