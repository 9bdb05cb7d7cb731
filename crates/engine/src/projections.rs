//! Derived projections: payroll and staffing figures per event.
//!
//! [`snapshot_derived`] is the single call site for the two pure derivation
//! functions; [`ProjectionRefresher`] re-invokes it whenever the change bus
//! fires and publishes the result on a `watch` channel. Derived values are
//! never cached across deliveries — every recompute reads a fresh store
//! snapshot, so a consumer can never observe figures that disagree with the
//! last committed write.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crewline_core::types::EntityId;
use crewline_core::{compute_event_payroll, compute_staffing_kpi, PayrollCalculation, StaffingKpi};
use crewline_events::ChangeEvent;
use crewline_store::EntityStore;

/// Derived figures for one event.
#[derive(Debug, Clone, Serialize)]
pub struct EventDerived {
    pub event_id: EntityId,
    pub payroll: PayrollCalculation,
    pub staffing: StaffingKpi,
}

/// Compute derived figures for every event from one store snapshot.
pub async fn snapshot_derived(store: &EntityStore) -> Vec<EventDerived> {
    let events = store.load_events().await;
    let operators = store.load_operators().await;
    let attendance = store.load_attendance().await;

    events
        .iter()
        .map(|event| EventDerived {
            event_id: event.id,
            payroll: compute_event_payroll(event, &attendance),
            staffing: compute_staffing_kpi(event, &operators),
        })
        .collect()
}

/// Background service that refreshes derived projections.
pub struct ProjectionRefresher;

impl ProjectionRefresher {
    /// Run the refresh loop.
    ///
    /// Recomputes once per bus delivery and publishes the result on `tx`.
    /// Exits when `cancel` fires or the bus closes. A lagged receiver simply
    /// recomputes — recomputing from source is always safe.
    pub async fn run(
        store: Arc<EntityStore>,
        mut receiver: broadcast::Receiver<ChangeEvent>,
        tx: watch::Sender<Vec<EventDerived>>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Projection refresher cancelled");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        tracing::debug!(
                            topic = event.topic.as_str(),
                            "Recomputing derived projections"
                        );
                        let _ = tx.send(snapshot_derived(&store).await);
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Projection refresher lagged, recomputing");
                        let _ = tx.send(snapshot_derived(&store).await);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Change bus closed, projection refresher shutting down");
                        break;
                    }
                },
            }
        }
    }
}
