//! Persistence service — startup hydration and background write-behind.
//!
//! DESIGN
//! ======
//! Collections are hydrated from the store once at startup. After that a
//! background task snapshots each collection's pending changes, writes
//! them with no lock held (upserts, then deletes), and acks the batch.
//!
//! ERROR HANDLING
//! ==============
//! Pending changes are acked only after a successful write. A failed flush
//! is logged and the same changes are retried on the next cycle: repeated
//! upserts are harmless, silent loss is not.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::services::collection::PendingBatch;
use crate::state::{AppState, Message, Room};
use crate::store::StoreError;

/// Load both collections from the store.
pub async fn hydrate(state: &AppState) -> Result<(), StoreError> {
    let rooms = state.store.load_rooms().await?;
    let messages = state.store.load_messages().await?;
    info!(rooms = rooms.len(), messages = messages.len(), "hydrated collections from store");

    state.rooms.hydrate(rooms).await;
    state.messages.hydrate(messages).await;
    Ok(())
}

/// Spawn the background flush loop. Returns a handle for shutdown.
pub fn spawn_persistence_task(state: AppState, flush_interval_ms: u64) -> JoinHandle<()> {
    info!(flush_interval_ms, "collection persistence flush configured");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(flush_interval_ms)).await;
            flush_all(&state).await;
        }
    })
}

/// Flush both collections once.
pub async fn flush_all(state: &AppState) {
    flush_rooms(state).await;
    flush_messages(state).await;
}

async fn flush_rooms(state: &AppState) {
    let batch = state.rooms.pending().await;
    if batch.is_empty() {
        return;
    }
    match write_rooms(state, &batch).await {
        Ok(()) => state.rooms.ack(&batch).await,
        Err(e) => error!(error = %e, count = batch.len(), collection = state.rooms.name(), "persistence flush failed"),
    }
}

async fn flush_messages(state: &AppState) {
    let batch = state.messages.pending().await;
    if batch.is_empty() {
        return;
    }
    match write_messages(state, &batch).await {
        Ok(()) => state.messages.ack(&batch).await,
        Err(e) => error!(error = %e, count = batch.len(), collection = state.messages.name(), "persistence flush failed"),
    }
}

async fn write_rooms(state: &AppState, batch: &PendingBatch<Room>) -> Result<(), StoreError> {
    state.store.upsert_rooms(&batch.upserts).await?;
    state.store.delete_rooms(&batch.deletes).await
}

async fn write_messages(state: &AppState, batch: &PendingBatch<Message>) -> Result<(), StoreError> {
    state.store.upsert_messages(&batch.upserts).await?;
    state.store.delete_messages(&batch.deletes).await
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
