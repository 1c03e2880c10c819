//! Synchronized collection — ordered in-memory records with write-behind
//! bookkeeping.
//!
//! DESIGN
//! ======
//! Every mutation lands in memory first and is visible to readers
//! immediately. The collection remembers which ids still have to be written
//! to (or deleted from) the durable store; the persistence worker snapshots
//! that pending set, writes it without holding the lock, and acks it.
//!
//! ORDERING
//! ========
//! Records keep insertion order. Hydration replaces the whole record list
//! in the order the store returns it.

use std::collections::HashSet;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Anything stored in a `Collection`.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("duplicate record id: {0}")]
    DuplicateId(Uuid),
}

impl crate::frame::ErrorCode for CollectionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
        }
    }
}

/// Changes not yet acknowledged by the store.
#[derive(Debug, Clone)]
pub struct PendingBatch<T> {
    pub upserts: Vec<T>,
    pub deletes: Vec<Uuid>,
}

impl<T> PendingBatch<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletes.len()
    }
}

struct Inner<T> {
    records: Vec<T>,
    pending_upserts: HashSet<Uuid>,
    pending_deletes: HashSet<Uuid>,
}

pub struct Collection<T> {
    name: &'static str,
    inner: RwLock<Inner<T>>,
}

impl<T: Record> Collection<T> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: RwLock::new(Inner {
                records: Vec::new(),
                pending_upserts: HashSet::new(),
                pending_deletes: HashSet::new(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append a record and mark it for persistence.
    pub async fn insert(&self, record: T) -> Result<(), CollectionError> {
        let id = record.id();
        let mut inner = self.inner.write().await;
        if inner.records.iter().any(|r| r.id() == id) {
            return Err(CollectionError::DuplicateId(id));
        }
        inner.records.push(record);
        inner.pending_deletes.remove(&id);
        inner.pending_upserts.insert(id);
        Ok(())
    }

    /// Remove exactly the record with `id`. Returns it if it existed.
    pub async fn remove(&self, id: Uuid) -> Option<T> {
        let mut inner = self.inner.write().await;
        let pos = inner.records.iter().position(|r| r.id() == id)?;
        let removed = inner.records.remove(pos);
        // EDGE: the upsert may already be in flight, so the delete is always
        // queued even if the record never reached the store.
        inner.pending_upserts.remove(&id);
        inner.pending_deletes.insert(id);
        Some(removed)
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        let inner = self.inner.read().await;
        inner.records.iter().find(|r| r.id() == id).cloned()
    }

    /// All records in insertion order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.records.clone()
    }

    /// Records matching `pred`, in insertion order.
    pub async fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let inner = self.inner.read().await;
        inner.records.iter().filter(|r| pred(r)).cloned().collect()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Replace contents with records loaded from the store. Clears pending
    /// state since the store is the source of these records.
    pub async fn hydrate(&self, records: Vec<T>) {
        let mut inner = self.inner.write().await;
        inner.records = records;
        inner.pending_upserts.clear();
        inner.pending_deletes.clear();
    }

    /// Snapshot pending changes without clearing them.
    pub async fn pending(&self) -> PendingBatch<T> {
        let inner = self.inner.read().await;
        let upserts = inner
            .records
            .iter()
            .filter(|r| inner.pending_upserts.contains(&r.id()))
            .cloned()
            .collect();
        let deletes = inner.pending_deletes.iter().copied().collect();
        PendingBatch { upserts, deletes }
    }

    /// Mark a batch as durably written.
    pub async fn ack(&self, batch: &PendingBatch<T>) {
        let mut inner = self.inner.write().await;
        for record in &batch.upserts {
            inner.pending_upserts.remove(&record.id());
        }
        for id in &batch.deletes {
            inner.pending_deletes.remove(id);
        }
    }

    #[cfg(test)]
    pub async fn pending_len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.pending_upserts.len() + inner.pending_deletes.len()
    }
}

#[cfg(test)]
#[path = "collection_test.rs"]
mod tests;
