//! The generic whole-collection read-modify-write cycle.

use std::marker::PhantomData;
use std::sync::Arc;

use lodge_store::{KvStore, KvStoreExt, StoreError};
use lodge_types::{stamp_new, stamp_update, CollectionEnvelope, Draft, Patch, Record, RecordId};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{RepoError, RepoResult};

/// Repository for every record of type `R`, stored as one blob under one key.
///
/// Each write loads the whole collection, changes it, and saves the whole
/// collection back. Writes through the same repository are serialized by an
/// internal async mutex, so overlapping callers in one process cannot lose
/// each other's updates. Separate processes sharing a key are not
/// coordinated: the last save wins.
pub struct CollectionRepository<R: Record> {
    store: Arc<dyn KvStore>,
    key: String,
    write_gate: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> CollectionRepository<R> {
    /// Repository for `R::COLLECTION` within `namespace`.
    pub fn new(store: Arc<dyn KvStore>, namespace: &str) -> Self {
        Self {
            store,
            key: R::COLLECTION.key(namespace),
            write_gate: Mutex::new(()),
            _record: PhantomData,
        }
    }

    /// The storage key this repository reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// All records in stored order. An absent key is an empty collection.
    pub async fn list_all(&self) -> RepoResult<Vec<R>> {
        self.load().await
    }

    /// Find a record by id.
    pub async fn get_by_id(&self, id: &RecordId) -> RepoResult<Option<R>> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|r| r.id() == id))
    }

    /// Stamp `draft` into a new record and append it to the collection.
    pub async fn create<D>(&self, draft: D) -> RepoResult<R>
    where
        D: Draft<Record = R>,
    {
        draft.validate()?;
        let _guard = self.write_gate.lock().await;
        let mut records = self.load().await?;

        let mut record = stamp_new(draft);
        while records.iter().any(|r| r.id() == record.id()) {
            record.meta_mut().id = RecordId::generate();
        }

        records.push(record.clone());
        self.persist(&records).await?;
        debug!(collection = %R::COLLECTION, id = %record.id(), count = records.len(), "created record");
        Ok(record)
    }

    /// Apply `patch` to the record with `id`, replacing it in place.
    ///
    /// Returns `Ok(None)` without writing when no record has that id.
    pub async fn update<P>(&self, id: &RecordId, patch: P) -> RepoResult<Option<R>>
    where
        P: Patch<R>,
    {
        patch.validate()?;
        let _guard = self.write_gate.lock().await;
        let mut records = self.load().await?;

        let Some(slot) = records.iter_mut().find(|r| r.id() == id) else {
            debug!(collection = %R::COLLECTION, %id, "update target not found");
            return Ok(None);
        };
        let updated = stamp_update(slot, patch);
        *slot = updated.clone();

        self.persist(&records).await?;
        debug!(collection = %R::COLLECTION, %id, "updated record");
        Ok(Some(updated))
    }

    /// Remove the record with `id`.
    ///
    /// Returns `Ok(false)` without writing when no record has that id.
    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let _guard = self.write_gate.lock().await;
        let records = self.load().await?;
        let before = records.len();
        let remaining: Vec<R> = records.into_iter().filter(|r| r.id() != id).collect();

        if remaining.len() == before {
            debug!(collection = %R::COLLECTION, %id, "delete target not found");
            return Ok(false);
        }

        self.persist(&remaining).await?;
        debug!(collection = %R::COLLECTION, %id, count = remaining.len(), "deleted record");
        Ok(true)
    }

    async fn load(&self) -> RepoResult<Vec<R>> {
        let read_err = |source| RepoError::Read {
            collection: R::COLLECTION,
            source,
        };
        let envelope: Option<CollectionEnvelope<R>> =
            self.store.load_json(&self.key).await.map_err(read_err)?;
        let Some(envelope) = envelope else {
            return Ok(Vec::new());
        };
        envelope.check_version().map_err(|e| {
            read_err(StoreError::Corrupt {
                key: self.key.clone(),
                reason: e.to_string(),
            })
        })?;
        Ok(envelope.into_records())
    }

    async fn persist(&self, records: &[R]) -> RepoResult<()> {
        let envelope = CollectionEnvelope::current(records.iter().collect::<Vec<&R>>());
        self.store
            .save_json(&self.key, &envelope)
            .await
            .map_err(|source| RepoError::Write {
                collection: R::COLLECTION,
                source,
            })
    }
}

impl<R: Record> std::fmt::Debug for CollectionRepository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionRepository")
            .field("collection", &R::COLLECTION)
            .field("key", &self.key)
            .finish()
    }
}
