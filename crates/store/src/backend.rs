//! Storage backends: the durable key/value contract and its implementations.
//!
//! [`StorageBackend`] is the only storage interface the rest of the
//! workspace sees: string get/set/remove plus a watch channel that reports
//! every write to all subscribers sharing the backend — including
//! subscribers in other open contexts over the same data.
//!
//! - [`MemoryBackend`] — non-durable; the test substrate and the degrade
//!   target when durable storage is unavailable.
//! - [`FileBackend`] — one JSON file per key under a root directory. State
//!   is held in memory and persisted best-effort; a failed disk write is
//!   logged, never fatal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

/// Buffer capacity for the watch channel carried by each backend.
const WATCH_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// A single key change observed on a backend.
#[derive(Debug, Clone)]
pub struct StorageChange {
    pub key: String,
    /// The value after the change; `None` when the key was removed.
    pub new_value: Option<String>,
}

/// Durable key/value storage with change notification.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the current value for `key`.
    async fn get(&self, key: &str) -> Option<String>;

    /// Replace the value for `key`. Notifies all watchers.
    async fn set(&self, key: &str, value: String);

    /// Remove `key`. Notifies all watchers with an empty value.
    async fn remove(&self, key: &str);

    /// Subscribe to every change applied through this backend.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// Open durable storage rooted at `root`, degrading to a non-durable
/// in-memory backend when the directory cannot be prepared.
pub async fn open(root: impl AsRef<Path>) -> Arc<dyn StorageBackend> {
    let root = root.as_ref();
    match FileBackend::open(root).await {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            tracing::warn!(
                root = %root.display(),
                error = %e,
                "Durable storage unavailable, falling back to in-memory backend"
            );
            Arc::new(MemoryBackend::new())
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// Non-durable in-memory backend.
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    watch: broadcast::Sender<StorageChange>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (watch, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            watch,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.clone());
        // Ignore the SendError — it only means there are zero watchers.
        let _ = self.watch.send(StorageChange {
            key: key.to_string(),
            new_value: Some(value),
        });
    }

    async fn remove(&self, key: &str) {
        self.entries.lock().await.remove(key);
        let _ = self.watch.send(StorageChange {
            key: key.to_string(),
            new_value: None,
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.watch.subscribe()
    }
}

// ---------------------------------------------------------------------------
// FileBackend
// ---------------------------------------------------------------------------

/// File-backed backend storing one JSON document per key.
///
/// The in-memory map is the source of truth; every `set` updates it first
/// and then persists to `<root>/<key>.json`. A failed disk write leaves the
/// value available in memory for the lifetime of the process.
pub struct FileBackend {
    root: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    watch: broadcast::Sender<StorageChange>,
}

impl FileBackend {
    /// Open a backend rooted at `root`, loading any existing key files.
    ///
    /// Unreadable key files are skipped with a warning; only a missing or
    /// uncreatable root directory is an error.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;

        let mut entries = HashMap::new();
        let mut dir = tokio::fs::read_dir(&root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => {
                    entries.insert(key.to_string(), contents);
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "Failed to read stored key, skipping");
                }
            }
        }

        let (watch, _) = broadcast::channel(WATCH_CAPACITY);
        Ok(Self {
            root,
            entries: Mutex::new(entries),
            watch,
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait::async_trait]
impl StorageBackend for FileBackend {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.clone());

        if let Err(e) = tokio::fs::write(self.path_for(key), &value).await {
            tracing::error!(key, error = %e, "Durable write failed, value kept in memory only");
        }

        let _ = self.watch.send(StorageChange {
            key: key.to_string(),
            new_value: Some(value),
        });
    }

    async fn remove(&self, key: &str) {
        self.entries.lock().await.remove(key);

        if let Err(e) = tokio::fs::remove_file(self.path_for(key)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!(key, error = %e, "Failed to remove stored key file");
            }
        }

        let _ = self.watch.send(StorageChange {
            key: key.to_string(),
            new_value: None,
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.watch.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_round_trips_values() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("operators").await, None);

        backend.set("operators", "[]".to_string()).await;
        assert_eq!(backend.get("operators").await, Some("[]".to_string()));

        backend.remove("operators").await;
        assert_eq!(backend.get("operators").await, None);
    }

    #[tokio::test]
    async fn every_watcher_sees_a_write() {
        let backend = MemoryBackend::new();
        let mut first = backend.subscribe();
        let mut second = backend.subscribe();

        backend.set("events", "[1]".to_string()).await;

        let change = first.recv().await.expect("first watcher should receive");
        assert_eq!(change.key, "events");
        assert_eq!(change.new_value.as_deref(), Some("[1]"));

        let change = second.recv().await.expect("second watcher should receive");
        assert_eq!(change.key, "events");
    }

    #[tokio::test]
    async fn remove_notifies_with_empty_value() {
        let backend = MemoryBackend::new();
        let mut watcher = backend.subscribe();

        backend.remove("events").await;

        let change = watcher.recv().await.expect("should receive removal");
        assert_eq!(change.key, "events");
        assert!(change.new_value.is_none());
    }

    #[tokio::test]
    async fn set_with_no_watchers_does_not_panic() {
        let backend = MemoryBackend::new();
        backend.set("operators", "[]".to_string()).await;
    }

    #[tokio::test]
    async fn file_backend_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");

        {
            let backend = FileBackend::open(dir.path()).await.expect("open");
            backend.set("operators", "[{\"id\":1}]".to_string()).await;
        }

        let reopened = FileBackend::open(dir.path()).await.expect("reopen");
        assert_eq!(
            reopened.get("operators").await,
            Some("[{\"id\":1}]".to_string())
        );
    }

    #[tokio::test]
    async fn file_backend_remove_deletes_the_key_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::open(dir.path()).await.expect("open");

        backend.set("events", "[]".to_string()).await;
        assert!(dir.path().join("events.json").exists());

        backend.remove("events").await;
        assert!(!dir.path().join("events.json").exists());

        // Removing an absent key is a no-op.
        backend.remove("events").await;
    }

    #[tokio::test]
    async fn open_degrades_to_memory_when_root_is_unusable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-directory");
        tokio::fs::write(&blocker, "x").await.expect("write blocker");

        // The root path points through a regular file, so the file backend
        // cannot be prepared and the in-memory substitute takes over.
        let backend = open(blocker.join("data")).await;
        backend.set("operators", "[]".to_string()).await;
        assert_eq!(backend.get("operators").await, Some("[]".to_string()));
    }
}
