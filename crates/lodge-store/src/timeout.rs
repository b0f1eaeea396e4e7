use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{StoreError, StoreOp, StoreResult};
use crate::traits::KvStore;

/// Decorator that fails any operation of the inner store that does not
/// complete within `after`.
///
/// An expired operation yields [`StoreError::TimedOut`], classified as a read
/// or write failure by the operation that expired. The inner future is
/// dropped; a save that was already renamed into place stays applied.
#[derive(Debug)]
pub struct TimeoutKvStore<S> {
    inner: S,
    after: Duration,
}

impl<S: KvStore> TimeoutKvStore<S> {
    pub fn new(inner: S, after: Duration) -> Self {
        Self { inner, after }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn deadline(&self) -> Duration {
        self.after
    }

    async fn bounded<T>(
        &self,
        key: &str,
        op: StoreOp,
        fut: impl Future<Output = StoreResult<T>> + Send,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.after, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(key, %op, after = ?self.after, "store operation timed out");
                Err(StoreError::TimedOut {
                    key: key.to_string(),
                    op,
                    after: self.after,
                })
            }
        }
    }
}

#[async_trait]
impl<S: KvStore> KvStore for TimeoutKvStore<S> {
    async fn load(&self, key: &str) -> StoreResult<Option<String>> {
        self.bounded(key, StoreOp::Load, self.inner.load(key)).await
    }

    async fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        self.bounded(key, StoreOp::Save, self.inner.save(key, value))
            .await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.bounded(key, StoreOp::Remove, self.inner.remove(key))
            .await
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        self.bounded("*", StoreOp::Keys, self.inner.keys()).await
    }
}
