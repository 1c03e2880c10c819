//! Landing controller — per-connection view state over the shared
//! collections.
//!
//! DESIGN
//! ======
//! One controller lives for the duration of a websocket connection. It owns
//! what a single viewer sees: the two input fields, the active room, and
//! whether the room panel is open. Every mutation is delegated to the room
//! and message services; the controller only builds records from its view
//! state and clears the inputs afterwards.

use serde::Serialize;
use uuid::Uuid;

use crate::services::message::{self as message_svc, MessageError};
use crate::services::room::{self as room_svc, RoomError};
use crate::services::session::SessionIdentity;
use crate::state::{AppState, Message, Room};

/// Heading shown on the landing page.
pub const WELCOME: &str = "BLOC CHAT";

/// The room currently shown in the message panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveRoom {
    pub name: String,
    pub room_id: Uuid,
}

pub struct LandingController {
    state: AppState,
    identity: SessionIdentity,
    /// Room name input field.
    pub new_room_name: String,
    /// Message input field.
    pub msg_text: String,
    pub current: Option<ActiveRoom>,
    pub room_panel_open: bool,
}

impl LandingController {
    #[must_use]
    pub fn new(state: AppState, identity: SessionIdentity) -> Self {
        Self {
            state,
            identity,
            new_room_name: String::new(),
            msg_text: String::new(),
            current: None,
            room_panel_open: false,
        }
    }

    #[must_use]
    pub fn welcome(&self) -> &'static str {
        WELCOME
    }

    #[must_use]
    pub fn current_user_name(&self) -> &str {
        self.identity.get_user()
    }

    // =========================================================================
    // ROOMS
    // =========================================================================

    /// Append a room named after the input field, then clear the field.
    /// The field is kept when the name is rejected.
    pub async fn add_room(&mut self) -> Result<Room, RoomError> {
        let room = room_svc::create_room(&self.state, &self.new_room_name).await?;
        self.new_room_name.clear();
        Ok(room)
    }

    pub async fn remove_room(&mut self, room_id: Uuid) -> Result<Room, RoomError> {
        room_svc::remove_room(&self.state, room_id).await
    }

    /// Select a room: flip the panel flag and remember the room as active.
    pub fn set_room(&mut self, room: &Room) {
        self.room_panel_open = !self.room_panel_open;
        self.current = Some(ActiveRoom { name: room.name.clone(), room_id: room.id });
    }

    /// Resolve `room_id` against the collection and select it.
    pub async fn set_room_by_id(&mut self, room_id: Uuid) -> Result<ActiveRoom, RoomError> {
        let room = room_svc::get_room(&self.state, room_id).await?;
        self.set_room(&room);
        Ok(ActiveRoom { name: room.name, room_id: room.id })
    }

    pub async fn rooms(&self) -> Vec<Room> {
        room_svc::list_rooms(&self.state).await
    }

    // =========================================================================
    // MESSAGES
    // =========================================================================

    /// Post the input field to the active room as the session user, then
    /// clear the field. The field is kept when the post is rejected.
    pub async fn add_message(&mut self) -> Result<Message, MessageError> {
        let room_id = self.current.as_ref().map(|c| c.room_id);
        let msg =
            message_svc::post_message(&self.state, self.identity.get_user(), &self.msg_text, room_id).await?;
        self.msg_text.clear();
        Ok(msg)
    }

    pub async fn remove_message(&mut self, message_id: Uuid) -> Result<Message, MessageError> {
        message_svc::remove_message(&self.state, message_id).await
    }

    /// The global feed, every room included.
    pub async fn messages(&self) -> Vec<Message> {
        message_svc::list_messages(&self.state, None).await
    }

    pub async fn room_messages(&self, room_id: Uuid) -> Vec<Message> {
        message_svc::list_messages(&self.state, Some(room_id)).await
    }

    /// Messages of the active room; empty when no room is selected.
    pub async fn visible_messages(&self) -> Vec<Message> {
        match &self.current {
            Some(active) => message_svc::list_messages(&self.state, Some(active.room_id)).await,
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "landing_test.rs"]
mod tests;
