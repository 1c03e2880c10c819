//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the two synchronized collections (`rooms`, `messages`), the
//! durable store they are flushed to, and the senders of every connected
//! websocket client for change fan-out.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::frame::Frame;
use crate::services::collection::{Collection, Record};
use crate::store::Store;

// =============================================================================
// RECORDS
// =============================================================================

/// Record type tag. Rooms only ever carry `"Room"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    #[default]
    Room,
}

impl RoomKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Room => "Room",
        }
    }
}

/// A named chat channel. Mirrors the `rooms` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: RoomKind,
}

/// A single chat post. Mirrors the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub user_name: String,
    pub content: String,
    /// Milliseconds since Unix epoch, stamped when the message is created.
    pub sent_at: i64,
    pub room_id: Uuid,
}

impl Record for Room {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Message {
    fn id(&self) -> Uuid {
        self.id
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Connected websocket clients: `client_id` -> sender for outgoing frames.
pub type Clients = Arc<RwLock<HashMap<Uuid, mpsc::Sender<Frame>>>>;

/// Shared application state. Clone is required by Axum; every field is
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub rooms: Arc<Collection<Room>>,
    pub messages: Arc<Collection<Message>>,
    pub clients: Clients,
    /// Whether the identity cookie is marked `Secure`.
    pub cookie_secure: bool,
    pub static_dir: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self {
            store,
            rooms: Arc::new(Collection::new("rooms")),
            messages: Arc::new(Collection::new("messages")),
            clients: Arc::new(RwLock::new(HashMap::new())),
            cookie_secure: config.cookie_secure,
            static_dir: config.static_dir.clone(),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
