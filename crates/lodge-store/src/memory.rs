//! In-memory key-value store for tests and ephemeral use.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// `HashMap`-based [`KvStore`].
///
/// Data is lost when the store is dropped. Reads and writes can be made to
/// fail on demand with [`fail_reads`](Self::fail_reads) and
/// [`fail_writes`](Self::fail_writes), which is how callers exercise their
/// error paths without a real disk.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    values: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryKvStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent load (and key listing) fail until reset.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent save and remove fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves and removes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_read(&self, key: &str) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read {
                key: key.to_string(),
                source: io::Error::other("injected read failure"),
            });
        }
        Ok(())
    }

    fn check_write(&self, key: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                key: key.to_string(),
                source: io::Error::other("injected write failure"),
            });
        }
        Ok(())
    }
}

fn poisoned(key: &str, write: bool) -> StoreError {
    let source = io::Error::other("lock poisoned");
    if write {
        StoreError::Write {
            key: key.to_string(),
            source,
        }
    } else {
        StoreError::Read {
            key: key.to_string(),
            source,
        }
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn load(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_read(key)?;
        let map = self.values.read().map_err(|_| poisoned(key, false))?;
        Ok(map.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_write(key)?;
        let mut map = self.values.write().map_err(|_| poisoned(key, true))?;
        map.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_write(key)?;
        let mut map = self.values.write().map_err(|_| poisoned(key, true))?;
        map.remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        self.check_read("*")?;
        let map = self.values.read().map_err(|_| poisoned("*", false))?;
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
