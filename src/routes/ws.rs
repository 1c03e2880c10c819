//! WebSocket handler — the live feed and the landing controller's
//! operations.
//!
//! DESIGN
//! ======
//! On upgrade, the connection gets a client ID, a `LandingController`
//! bound to the caller's session identity, and a subscription to the change
//! feed. It then enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Change frames from other clients → forward to this client
//!
//! Handler functions drive the controller and return an `Outcome`. The
//! dispatch layer owns all outbound concerns: reply to sender and broadcast
//! to peers.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → push `session:connected` (a `done` notification, like peer
//!    changes) with `client_id`, the heading and the identity
//! 2. Client sends frames → dispatch → handler returns Outcome
//! 3. Dispatch applies Outcome (reply, or reply + broadcast)
//! 4. Close → unsubscribe from the feed

use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::controllers::landing::LandingController;
use crate::frame::{Data, FRAME_CODE, FRAME_MESSAGE, Frame, Status};
use crate::services::{feed, session::SessionIdentity};
use crate::state::AppState;

/// Outbound queue depth per client.
const CLIENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. Handlers never send frames.
#[derive(Debug)]
enum Outcome {
    /// Reply done+data to the sender and push the same data to every other
    /// client as a change notification.
    Broadcast(Data),
    /// Send done+data to the sender only.
    Reply(Data),
}

// =============================================================================
// UPGRADE
// =============================================================================

/// `GET /api/ws`
pub async fn handle_ws(State(state): State<AppState>, identity: SessionIdentity, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state, identity))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, identity: SessionIdentity) {
    let client_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(CLIENT_CHANNEL_CAPACITY);

    // Subscribe before greeting so no change published after the greeting
    // is missed.
    feed::connect(&state, client_id, client_tx).await;
    info!(%client_id, user_name = identity.get_user(), "ws: client connected");

    let needs_prompt = identity.needs_prompt();
    let mut landing = LandingController::new(state.clone(), identity);
    let welcome = Frame::notify("session:connected", Data::new())
        .with_data("client_id", client_id.to_string())
        .with_data("welcome", landing.welcome())
        .with_data("user_name", landing.current_user_name())
        .with_data("needs_prompt", needs_prompt);
    if send_frame(&mut socket, &welcome).await.is_err() {
        feed::disconnect(&state, client_id).await;
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    WsMessage::Text(text) => {
                        let replies = process_inbound_text(&state, &mut landing, client_id, text.as_str()).await;
                        for frame in replies {
                            let _ = send_frame(&mut socket, &frame).await;
                        }
                    }
                    WsMessage::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    feed::disconnect(&state, client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the
/// sender. Peers are reached through the feed.
async fn process_inbound_text(
    state: &AppState,
    landing: &mut LandingController,
    client_id: Uuid,
    text: &str,
) -> Vec<Frame> {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let mut err = Frame::request("gateway:error", Data::new())
                .with_data(FRAME_MESSAGE, format!("invalid json: {e}"));
            err.status = Status::Error;
            return vec![err];
        }
    };

    // The sender is whoever the session says it is, not what the frame claims.
    req.from = Some(landing.current_user_name().to_owned());
    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.prefix() {
        "rooms" => handle_rooms(landing, &req).await,
        "messages" => handle_messages(landing, &req).await,
        prefix => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(Outcome::Broadcast(data)) => {
            let sender_frame = req.done_with(data.clone());
            let peer_frame = Frame::notify(&req.syscall, data).with_from(landing.current_user_name());
            feed::broadcast(state, &peer_frame, Some(client_id)).await;
            vec![sender_frame]
        }
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Err(err_frame) => vec![err_frame],
    }
}

// =============================================================================
// ROOM HANDLERS
// =============================================================================

async fn handle_rooms(landing: &mut LandingController, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "list" => {
            let mut data = Data::new();
            data.insert("rooms".into(), to_value(&landing.rooms().await));
            Ok(Outcome::Reply(data))
        }
        "add" => {
            landing.new_room_name = req.str_field("name").unwrap_or_default().to_owned();
            match landing.add_room().await {
                Ok(room) => Ok(Outcome::Broadcast(to_data(&room))),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "remove" => {
            let Some(room_id) = req.uuid_field("id") else {
                return Err(req.error("id required"));
            };
            match landing.remove_room(room_id).await {
                Ok(room) => Ok(Outcome::Broadcast(id_data(room.id))),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "set" => {
            let Some(room_id) = req.uuid_field("id") else {
                return Err(req.error("id required"));
            };
            match landing.set_room_by_id(room_id).await {
                Ok(active) => {
                    let mut data = to_data(&active);
                    data.insert("room_panel_open".into(), landing.room_panel_open.into());
                    data.insert("messages".into(), to_value(&landing.visible_messages().await));
                    Ok(Outcome::Reply(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        op => Err(req.error(format!("unknown rooms op: {op}"))),
    }
}

// =============================================================================
// MESSAGE HANDLERS
// =============================================================================

async fn handle_messages(landing: &mut LandingController, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "list" => {
            let messages = match req.uuid_field("room_id") {
                Some(room_id) => landing.room_messages(room_id).await,
                None => landing.messages().await,
            };
            let mut data = Data::new();
            data.insert("messages".into(), to_value(&messages));
            Ok(Outcome::Reply(data))
        }
        "add" => {
            landing.msg_text = req.str_field("content").unwrap_or_default().to_owned();
            match landing.add_message().await {
                Ok(msg) => Ok(Outcome::Broadcast(to_data(&msg))),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "remove" => {
            let Some(message_id) = req.uuid_field("id") else {
                return Err(req.error("id required"));
            };
            match landing.remove_message(message_id).await {
                Ok(msg) => Ok(Outcome::Broadcast(id_data(msg.id))),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        op => Err(req.error(format!("unknown messages op: {op}"))),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame.data.get(FRAME_CODE).and_then(|v| v.as_str()).unwrap_or("-");
        let message = frame.data.get(FRAME_MESSAGE).and_then(|v| v.as_str()).unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    socket.send(WsMessage::Text(json.into())).await.map_err(|_| ())
}

fn to_value(value: &impl Serialize) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// Flatten a serializable record into frame data.
fn to_data(value: &impl Serialize) -> Data {
    match to_value(value) {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        _ => Data::new(),
    }
}

fn id_data(id: Uuid) -> Data {
    let mut data = Data::new();
    data.insert("id".into(), serde_json::json!(id));
    data
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
