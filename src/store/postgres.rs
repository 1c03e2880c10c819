//! Postgres store.
//!
//! Rows carry a `seq BIGSERIAL` column so loads come back in insertion
//! order. Batches are written in one transaction each.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::state::{Message, Room, RoomKind};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn load_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM rooms ORDER BY seq ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Room { id, name, kind: RoomKind::Room })
            .collect())
    }

    async fn load_messages(&self) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, i64, Uuid)>(
            "SELECT id, user_name, content, sent_at, room_id FROM messages ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, user_name, content, sent_at, room_id)| Message { id, user_name, content, sent_at, room_id })
            .collect())
    }

    async fn upsert_rooms(&self, rooms: &[Room]) -> Result<(), StoreError> {
        if rooms.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for room in rooms {
            sqlx::query("INSERT INTO rooms (id, name, kind) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING")
                .bind(room.id)
                .bind(&room.name)
                .bind(room.kind.as_str())
                .execute(tx.as_mut())
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_rooms(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM rooms WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_messages(&self, messages: &[Message]) -> Result<(), StoreError> {
        if messages.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for msg in messages {
            sqlx::query(
                "INSERT INTO messages (id, user_name, content, sent_at, room_id) \
                 VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
            )
            .bind(msg.id)
            .bind(&msg.user_name)
            .bind(&msg.content)
            .bind(msg.sent_at)
            .bind(msg.room_id)
            .execute(tx.as_mut())
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_messages(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM messages WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
