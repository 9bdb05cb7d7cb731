//! Headless host for the scheduling engine.
//!
//! Wires storage, the change bus, the storage bridge and the projection
//! refresher together, then logs every derived-projection update until
//! interrupted. Presentation layers embed the same wiring; this binary is
//! the reference composition.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crewline_engine::ProjectionRefresher;
use crewline_events::{ChangeBus, StorageBridge};
use crewline_store::EntityStore;

/// Default storage root when `CREWLINE_DATA_DIR` is not set.
const DEFAULT_DATA_DIR: &str = "./data";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewline_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir =
        std::env::var("CREWLINE_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let backend = crewline_store::open(&data_dir).await;
    let store = Arc::new(EntityStore::new(backend));
    let bus = Arc::new(ChangeBus::default());

    tokio::spawn(StorageBridge::run(store.subscribe(), bus.clone()));

    let (tx, mut derived_rx) = watch::channel(Vec::new());
    let cancel = CancellationToken::new();
    tokio::spawn(ProjectionRefresher::run(
        store.clone(),
        bus.subscribe(),
        tx,
        cancel.clone(),
    ));

    tracing::info!(data_dir = %data_dir, "Crewline worker started, watching for changes");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                cancel.cancel();
                break;
            }
            changed = derived_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let derived = derived_rx.borrow().clone();
                for projection in &derived {
                    tracing::info!(
                        event_id = projection.event_id,
                        staffed_pct = projection.staffing.percentage,
                        net_hours = projection.payroll.net_hours,
                        "Event projection updated"
                    );
                }
            }
        }
    }
}
