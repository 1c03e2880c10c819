//! Live change feed — connected clients and fan-out.
//!
//! DESIGN
//! ======
//! Every client subscribes to both collections; there is no per-room
//! subscription. A mutation is broadcast to all connected clients,
//! optionally excluding the originator (who receives its own reply).

use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::frame::Frame;
use crate::state::AppState;

/// Register a client's outbound channel.
pub async fn connect(state: &AppState, client_id: Uuid, tx: mpsc::Sender<Frame>) {
    let mut clients = state.clients.write().await;
    clients.insert(client_id, tx);
    info!(%client_id, clients = clients.len(), "feed: client subscribed");
}

pub async fn disconnect(state: &AppState, client_id: Uuid) {
    let mut clients = state.clients.write().await;
    clients.remove(&client_id);
    info!(%client_id, remaining = clients.len(), "feed: client unsubscribed");
}

/// Broadcast a frame to all clients, optionally excluding one.
pub async fn broadcast(state: &AppState, frame: &Frame, exclude: Option<Uuid>) {
    let clients = state.clients.read().await;
    for (client_id, tx) in clients.iter() {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: a full or closed channel skips that client.
        if tx.try_send(frame.clone()).is_err() {
            debug!(%client_id, syscall = %frame.syscall, "feed: client channel full, frame skipped");
        }
    }
}
