//! Read-only collection snapshots over plain HTTP.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::services::{message, room};
use crate::state::{AppState, Message, Room};

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub room_id: Option<Uuid>,
}

/// `GET /api/rooms`
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<Room>> {
    Json(room::list_rooms(&state).await)
}

/// `GET /api/messages[?room_id=...]`
pub async fn list_messages(State(state): State<AppState>, Query(query): Query<MessagesQuery>) -> Json<Vec<Message>> {
    Json(message::list_messages(&state, query.room_id).await)
}
