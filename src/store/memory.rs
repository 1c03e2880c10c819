//! In-memory store. Nothing survives a restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::state::{Message, Room};

#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<Vec<Room>>,
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with records, as if loaded from a previous run.
    #[cfg(test)]
    #[must_use]
    pub fn with_records(rooms: Vec<Room>, messages: Vec<Message>) -> Self {
        Self { rooms: RwLock::new(rooms), messages: RwLock::new(messages) }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.rooms.read().await.clone())
    }

    async fn load_messages(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self.messages.read().await.clone())
    }

    async fn upsert_rooms(&self, rooms: &[Room]) -> Result<(), StoreError> {
        let mut stored = self.rooms.write().await;
        for room in rooms {
            if !stored.iter().any(|r| r.id == room.id) {
                stored.push(room.clone());
            }
        }
        Ok(())
    }

    async fn delete_rooms(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        self.rooms.write().await.retain(|r| !ids.contains(&r.id));
        Ok(())
    }

    async fn upsert_messages(&self, messages: &[Message]) -> Result<(), StoreError> {
        let mut stored = self.messages.write().await;
        for msg in messages {
            if !stored.iter().any(|m| m.id == msg.id) {
                stored.push(msg.clone());
            }
        }
        Ok(())
    }

    async fn delete_messages(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        self.messages.write().await.retain(|m| !ids.contains(&m.id));
        Ok(())
    }
}
