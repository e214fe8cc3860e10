// ABOUTME: Background task that mirrors the live flow into local storage after every change.
// ABOUTME: Subscribes to the actor's broadcast channel and writes once per settled burst of events.

use std::sync::Arc;

use agentflow_core::FlowActorHandle;
use agentflow_store::FlowStorage;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Spawn the persister. Each wakeup drains every queued event first, so a
/// command producing several events results in a single write of the
/// latest state.
pub fn spawn_flow_persister(
    actor: &FlowActorHandle,
    storage: Arc<FlowStorage>,
) -> tokio::task::JoinHandle<()> {
    let mut rx = actor.subscribe();
    let actor = actor.clone();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("flow persister lagged, skipped {} events", n);
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("flow persister shutting down (channel closed)");
                    break;
                }
            }

            loop {
                match rx.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }

            let document = actor.document().await;
            if let Err(e) = storage.persist(&document) {
                tracing::error!("flow persister failed to write {}: {}", storage.key(), e);
            }
        }
    })
}
