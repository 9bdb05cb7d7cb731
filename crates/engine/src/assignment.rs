//! Bidirectional Operator↔Event assignment management.
//!
//! [`AssignmentManager`] is the only component permitted to mutate the
//! operator-side `assigned_events` set and the event-side
//! `assigned_operators` list. Every operation is an atomic read-modify-write
//! under the store's write lock: both sides of the relation are updated
//! before the operation completes, or neither is.

use std::sync::Arc;

use crewline_core::types::EntityId;
use crewline_core::{Event, Operator, OperatorRef};
use crewline_events::{
    AssignmentNotification, ChangeBus, ChangeEvent, NotificationKind, OperatorNotifier, Topic,
};
use crewline_store::{EntityStore, StoreError};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for assignment operations.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    /// The referenced operator or event is absent from the current snapshot.
    /// Nothing was written.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// The relation already holds on both sides. Informational rather than
    /// fatal: the relation state is exactly what the caller asked for.
    #[error("Operator {operator_id} is already assigned to event {event_id}")]
    AlreadyAssigned {
        operator_id: EntityId,
        event_id: EntityId,
    },

    /// A snapshot could not be serialized; neither side was written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// AssignmentManager
// ---------------------------------------------------------------------------

/// Owns the Operator↔Event relation.
///
/// Holds shared handles to the single [`EntityStore`] instance and the local
/// [`ChangeBus`]; optionally a notifier for best-effort operator emails.
pub struct AssignmentManager {
    store: Arc<EntityStore>,
    bus: Arc<ChangeBus>,
    notifier: Option<Arc<OperatorNotifier>>,
}

impl AssignmentManager {
    pub fn new(store: Arc<EntityStore>, bus: Arc<ChangeBus>) -> Self {
        Self {
            store,
            bus,
            notifier: None,
        }
    }

    /// Attach an operator notification channel.
    pub fn with_notifier(mut self, notifier: Arc<OperatorNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create the relation between an operator and an event.
    ///
    /// Fails with [`AssignmentError::NotFound`] when either id does not
    /// resolve, and with [`AssignmentError::AlreadyAssigned`] when the
    /// relation already holds on both sides. A one-sided relation (the trace
    /// of an interrupted write) is repaired rather than reported.
    pub async fn assign(
        &self,
        operator_id: EntityId,
        event_id: EntityId,
    ) -> Result<(), AssignmentError> {
        let _guard = self.store.lock_writes().await;
        let mut operators = self.store.load_operators().await;
        let mut events = self.store.load_events().await;

        let operator = operators
            .iter_mut()
            .find(|o| o.id == operator_id)
            .ok_or(AssignmentError::NotFound {
                entity: "operator",
                id: operator_id,
            })?;
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(AssignmentError::NotFound {
                entity: "event",
                id: event_id,
            })?;

        if operator.assigned_events.contains(&event_id) && event.has_operator(operator_id) {
            return Err(AssignmentError::AlreadyAssigned {
                operator_id,
                event_id,
            });
        }

        operator.assigned_events.insert(event_id);
        if !event.has_operator(operator_id) {
            event.assigned_operators.push(OperatorRef::from(&*operator));
        }

        let notification =
            Self::notification_for(operator, event, NotificationKind::Assignment);

        self.store.save_assignment(&operators, &events).await?;

        self.publish_assignment_changed(serde_json::json!({
            "operator_id": operator_id,
            "event_id": event_id,
            "action": "assigned",
        }));
        self.dispatch(Some(notification));
        Ok(())
    }

    /// Remove the relation on both sides.
    ///
    /// Idempotent: removing an absent relation is not an error and performs
    /// no write.
    pub async fn unassign(
        &self,
        operator_id: EntityId,
        event_id: EntityId,
    ) -> Result<(), AssignmentError> {
        let _guard = self.store.lock_writes().await;
        let mut operators = self.store.load_operators().await;
        let mut events = self.store.load_events().await;

        let notification = match (
            operators.iter().find(|o| o.id == operator_id),
            events.iter().find(|e| e.id == event_id),
        ) {
            (Some(operator), Some(event)) => Some(Self::notification_for(
                operator,
                event,
                NotificationKind::Removal,
            )),
            _ => None,
        };

        let mut changed = false;
        if let Some(operator) = operators.iter_mut().find(|o| o.id == operator_id) {
            changed |= operator.assigned_events.remove(&event_id);
        }
        if let Some(event) = events.iter_mut().find(|e| e.id == event_id) {
            let before = event.assigned_operators.len();
            event.assigned_operators.retain(|r| r.id != operator_id);
            changed |= event.assigned_operators.len() != before;
        }

        if !changed {
            return Ok(());
        }

        self.store.save_assignment(&operators, &events).await?;

        self.publish_assignment_changed(serde_json::json!({
            "operator_id": operator_id,
            "event_id": event_id,
            "action": "unassigned",
        }));
        self.dispatch(notification);
        Ok(())
    }

    /// Delete an operator, removing its id from every event's roster first.
    pub async fn cascade_delete_operator(
        &self,
        operator_id: EntityId,
    ) -> Result<(), AssignmentError> {
        let _guard = self.store.lock_writes().await;
        let mut operators = self.store.load_operators().await;
        let mut events = self.store.load_events().await;

        operators.retain(|o| o.id != operator_id);
        for event in events.iter_mut() {
            event.assigned_operators.retain(|r| r.id != operator_id);
        }

        self.store.save_assignment(&operators, &events).await?;

        self.publish_assignment_changed(serde_json::json!({
            "operator_id": operator_id,
            "action": "operator-deleted",
        }));
        Ok(())
    }

    /// Delete an event, removing its id from every operator's set first.
    pub async fn cascade_delete_event(&self, event_id: EntityId) -> Result<(), AssignmentError> {
        let _guard = self.store.lock_writes().await;
        let mut operators = self.store.load_operators().await;
        let mut events = self.store.load_events().await;

        events.retain(|e| e.id != event_id);
        for operator in operators.iter_mut() {
            operator.assigned_events.remove(&event_id);
        }

        self.store.save_assignment(&operators, &events).await?;

        self.publish_assignment_changed(serde_json::json!({
            "event_id": event_id,
            "action": "event-deleted",
        }));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn notification_for(
        operator: &Operator,
        event: &Event,
        kind: NotificationKind,
    ) -> AssignmentNotification {
        AssignmentNotification {
            operator_email: operator.email.clone(),
            operator_name: operator.display_name(),
            event_title: event.title.clone(),
            event_date: event.start_date,
            kind,
        }
    }

    fn publish_assignment_changed(&self, payload: serde_json::Value) {
        self.bus
            .publish(ChangeEvent::new(Topic::AssignmentChanged).with_payload(payload));
    }

    /// Fire-and-forget notification dispatch.
    ///
    /// The assignment is authoritative either way; a delivery failure is
    /// logged and never rolled back against local state.
    fn dispatch(&self, notification: Option<AssignmentNotification>) {
        let (Some(notifier), Some(notification)) = (self.notifier.clone(), notification) else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&notification).await {
                tracing::warn!(
                    error = %e,
                    to = %notification.operator_email,
                    "Operator notification failed"
                );
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
