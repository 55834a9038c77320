//! Background refresh of a mounted view

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::store::{ResourceStore, SyncTicket};

/// Settle the mount-time sync, then run a silent sync every `interval`
/// until `cancel` fires.
///
/// Each tick runs in its own task, so a slow backend can leave several
/// syncs in flight at once; the store decides which answer sticks. Tasks
/// still running at cancellation are aborted.
pub async fn poll_loop(
    store: Arc<ResourceStore>,
    initial: SyncTicket,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut in_flight = JoinSet::new();

    let initial_store = Arc::clone(&store);
    in_flight.spawn(async move {
        let _ = initial_store.complete_sync(initial).await;
    });

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::debug!("Poll tick, {} syncs still in flight", in_flight.len());
                let store = Arc::clone(&store);
                in_flight.spawn(async move {
                    let _ = store.sync(true).await;
                });
            }
            Some(_) = in_flight.join_next() => {}
            _ = cancel.cancelled() => {
                tracing::debug!("Polling loop cancelled");
                break;
            }
        }
    }

    in_flight.shutdown().await;
}
