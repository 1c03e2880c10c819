//! Durable store behind the synchronized collections.
//!
//! ARCHITECTURE
//! ============
//! The collections own the live view; a `Store` only has to load them at
//! startup and accept batched upserts/deletes from the persistence worker.
//! `PgStore` is the production backend, `MemoryStore` serves development
//! runs without a database and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::state::{Message, Room};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// All rooms in insertion order.
    async fn load_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// All messages in insertion order.
    async fn load_messages(&self) -> Result<Vec<Message>, StoreError>;

    /// Insert rooms, ignoring ids that already exist.
    async fn upsert_rooms(&self, rooms: &[Room]) -> Result<(), StoreError>;

    /// Delete rooms by id. Unknown ids are ignored.
    async fn delete_rooms(&self, ids: &[Uuid]) -> Result<(), StoreError>;

    async fn upsert_messages(&self, messages: &[Message]) -> Result<(), StoreError>;

    async fn delete_messages(&self, ids: &[Uuid]) -> Result<(), StoreError>;
}
