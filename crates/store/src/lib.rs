//! Crewline entity storage.
//!
//! This crate owns durable state for the scheduling engine:
//!
//! - [`StorageBackend`] — the narrow key/value contract the engine depends
//!   on, with change notification to every subscriber sharing the backend.
//! - [`MemoryBackend`] / [`FileBackend`] — the non-durable and file-backed
//!   implementations; [`open`] picks the file backend and degrades to
//!   memory when the directory cannot be prepared.
//! - [`EntityStore`] — typed whole-collection access plus the write
//!   serialization lock every mutator must hold.

pub mod backend;
pub mod store;

pub use backend::{open, FileBackend, MemoryBackend, StorageBackend, StorageChange};
pub use store::{EntityStore, StoreError, KEY_ATTENDANCE, KEY_EVENTS, KEY_OPERATORS};
