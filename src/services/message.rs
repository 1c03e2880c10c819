//! Message service — post and remove messages in the shared feed.
//!
//! The feed is one global collection; `room_id` tags each message with the
//! room it was posted to. Filtering by room is a read-side concern.

use tracing::info;
use uuid::Uuid;

use crate::frame::{ErrorCode, now_ms};
use crate::services::collection::CollectionError;
use crate::state::{AppState, Message};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("message content required")]
    EmptyContent,
    #[error("select a room before sending")]
    NoActiveRoom,
    #[error("room not found: {0}")]
    RoomNotFound(Uuid),
    #[error("message not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

impl ErrorCode for MessageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyContent => "E_MESSAGE_CONTENT_REQUIRED",
            Self::NoActiveRoom => "E_NO_ACTIVE_ROOM",
            Self::RoomNotFound(_) => "E_ROOM_NOT_FOUND",
            Self::NotFound(_) => "E_MESSAGE_NOT_FOUND",
            Self::Collection(e) => e.error_code(),
        }
    }
}

/// Post `content` to `room_id` as `user_name`, stamped with the current time.
pub async fn post_message(
    state: &AppState,
    user_name: &str,
    content: &str,
    room_id: Option<Uuid>,
) -> Result<Message, MessageError> {
    let room_id = room_id.ok_or(MessageError::NoActiveRoom)?;
    if content.trim().is_empty() {
        return Err(MessageError::EmptyContent);
    }
    if state.rooms.get(room_id).await.is_none() {
        return Err(MessageError::RoomNotFound(room_id));
    }

    let msg = Message {
        id: Uuid::new_v4(),
        user_name: user_name.to_owned(),
        content: content.to_owned(),
        sent_at: now_ms(),
        room_id,
    };
    state.messages.insert(msg.clone()).await?;

    info!(message_id = %msg.id, %room_id, user_name = %msg.user_name, "message posted");
    Ok(msg)
}

/// Remove exactly the message with `message_id`.
pub async fn remove_message(state: &AppState, message_id: Uuid) -> Result<Message, MessageError> {
    let msg = state
        .messages
        .remove(message_id)
        .await
        .ok_or(MessageError::NotFound(message_id))?;

    info!(message_id = %msg.id, room_id = %msg.room_id, "message removed");
    Ok(msg)
}

/// The whole feed, or only the messages of one room.
pub async fn list_messages(state: &AppState, room_id: Option<Uuid>) -> Vec<Message> {
    match room_id {
        Some(room_id) => state.messages.filter(|m| m.room_id == room_id).await,
        None => state.messages.snapshot().await,
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
