use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Asynchronous key-value store of string blobs.
///
/// All implementations must satisfy these invariants:
/// - `load` of a key that was never saved (or was removed) returns `Ok(None)`.
/// - `save` replaces the whole value; a failed save leaves the previous
///   value readable.
/// - `remove` of an absent key succeeds.
/// - The store never interprets values.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Err` on I/O failure or when the stored bytes are unreadable.
    async fn load(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete the value stored under `key`.
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// All keys currently stored, sorted.
    async fn keys(&self) -> StoreResult<Vec<String>>;
}

/// JSON helpers available on every [`KvStore`].
#[async_trait]
pub trait KvStoreExt: KvStore {
    /// Load and decode a JSON value. Undecodable content is
    /// [`StoreError::Corrupt`].
    async fn load_json<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let Some(raw) = self.load(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Encode `value` as JSON and save it.
    async fn save_json<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::Encode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.save(key, &raw).await
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}
