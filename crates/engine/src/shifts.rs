//! Shift scheduling and append-only attendance capture.
//!
//! [`ShiftTracker`] validates shifts against their owning event's schedule
//! window and appends attendance observations without write-time ordering
//! checks — reconciliation happens at derivation time and tolerates missing
//! or out-of-order records.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crewline_core::types::{EntityId, Timestamp};
use crewline_core::{next_shift_id, AttendanceKind, AttendanceRecord, Shift};
use crewline_store::{EntityStore, StoreError};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for shift and attendance operations.
#[derive(Debug, thiserror::Error)]
pub enum ShiftError {
    /// The referenced event is absent from the current snapshot.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// The shift date falls outside the event's schedule window.
    /// The shift list is unchanged.
    #[error("Shift date {date} is outside the event window {start}..{end}")]
    OutOfRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// A snapshot could not be serialized; nothing was written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// ShiftTracker
// ---------------------------------------------------------------------------

/// Validates and stores shift and attendance records.
///
/// Writes go through the shared [`EntityStore`]; change propagation rides
/// the storage watch channel, so the tracker publishes nothing itself.
pub struct ShiftTracker {
    store: Arc<EntityStore>,
}

impl ShiftTracker {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Append a shift to an event.
    ///
    /// The date must fall within the event's window (date-only comparison,
    /// both bounds normalized to midnight). Returns the updated shift list
    /// in append order — append order is the display order.
    pub async fn add_shift(
        &self,
        event_id: EntityId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        operator_id: Option<EntityId>,
    ) -> Result<Vec<Shift>, ShiftError> {
        let _guard = self.store.lock_writes().await;
        let mut events = self.store.load_events().await;

        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(ShiftError::NotFound {
                entity: "event",
                id: event_id,
            })?;

        if !event.contains_date(date) {
            return Err(ShiftError::OutOfRange {
                date,
                start: event.start_date.date_naive(),
                end: event.end_date.date_naive(),
            });
        }

        event.shifts.push(Shift {
            id: next_shift_id(&event.shifts),
            date,
            start_time,
            end_time,
            operator_id,
        });
        let updated = event.shifts.clone();

        self.store.save_events(&events).await?;
        Ok(updated)
    }

    /// Remove a shift by id, wherever it lives.
    ///
    /// Idempotent: removing a shift that no longer exists performs no write.
    pub async fn remove_shift(&self, shift_id: EntityId) -> Result<(), ShiftError> {
        let _guard = self.store.lock_writes().await;
        let mut events = self.store.load_events().await;

        let mut changed = false;
        for event in events.iter_mut() {
            let before = event.shifts.len();
            event.shifts.retain(|s| s.id != shift_id);
            changed |= event.shifts.len() != before;
        }

        if changed {
            self.store.save_events(&events).await?;
        }
        Ok(())
    }

    /// Append an attendance observation.
    ///
    /// Pure append: no check that a check-in precedes a check-out, and no
    /// resolution of the operator or event ids.
    pub async fn record_attendance(
        &self,
        operator_id: EntityId,
        event_id: EntityId,
        kind: AttendanceKind,
        timestamp: Timestamp,
    ) -> Result<(), ShiftError> {
        let _guard = self.store.lock_writes().await;
        let mut records = self.store.load_attendance().await;

        records.push(AttendanceRecord {
            operator_id,
            event_id,
            kind,
            timestamp,
        });

        self.store.save_attendance(&records).await?;
        Ok(())
    }
}
