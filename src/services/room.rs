//! Room service — create and remove rooms in the shared collection.
//!
//! Mutations only touch the in-memory collection; the persistence worker
//! writes them behind.

use tracing::info;
use uuid::Uuid;

use crate::frame::ErrorCode;
use crate::services::collection::CollectionError;
use crate::state::{AppState, Room, RoomKind};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("room name required")]
    EmptyName,
    #[error("room not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

impl ErrorCode for RoomError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "E_ROOM_NAME_REQUIRED",
            Self::NotFound(_) => "E_ROOM_NOT_FOUND",
            Self::Collection(e) => e.error_code(),
        }
    }
}

/// Append a new room. The name is kept verbatim but must not be blank.
pub async fn create_room(state: &AppState, name: &str) -> Result<Room, RoomError> {
    if name.trim().is_empty() {
        return Err(RoomError::EmptyName);
    }

    let room = Room { id: Uuid::new_v4(), name: name.to_owned(), kind: RoomKind::Room };
    state.rooms.insert(room.clone()).await?;

    info!(room_id = %room.id, name = %room.name, "room created");
    Ok(room)
}

/// Remove exactly the room with `room_id`. Messages posted to it stay.
pub async fn remove_room(state: &AppState, room_id: Uuid) -> Result<Room, RoomError> {
    let room = state
        .rooms
        .remove(room_id)
        .await
        .ok_or(RoomError::NotFound(room_id))?;

    info!(room_id = %room.id, name = %room.name, "room removed");
    Ok(room)
}

pub async fn get_room(state: &AppState, room_id: Uuid) -> Result<Room, RoomError> {
    state
        .rooms
        .get(room_id)
        .await
        .ok_or(RoomError::NotFound(room_id))
}

pub async fn list_rooms(state: &AppState) -> Vec<Room> {
    state.rooms.snapshot().await
}
