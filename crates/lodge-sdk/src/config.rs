use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lodge_repo::RoomRepository;
use lodge_store::{FileKvStore, InMemoryKvStore, KvStore, TimeoutKvStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{LodgeError, LodgeResult};
use crate::store::RoomStore;

/// Top-level configuration, usually read from `lodge.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodgeConfig {
    pub storage: StorageConfig,
}

/// Where and how collections are persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Root directory of the file backend.
    pub data_dir: PathBuf,
    /// Prefix of every collection key (`<namespace>:rooms`).
    pub namespace: String,
    /// Deadline for each storage operation in milliseconds. `0` disables it.
    pub op_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::File,
            data_dir: PathBuf::from("lodge-data"),
            namespace: "lodge".into(),
            op_timeout_ms: 5_000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Memory,
}

impl LodgeConfig {
    /// Read a TOML config file.
    pub fn load(path: &Path) -> LodgeResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> LodgeResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| LodgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LodgeResult<()> {
        if self.storage.namespace.trim().is_empty() {
            return Err(LodgeError::Config("storage.namespace must not be empty".into()));
        }
        Ok(())
    }

    /// Per-operation storage deadline, if enabled.
    pub fn op_timeout(&self) -> Option<Duration> {
        match self.storage.op_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// Build the configured backend and return a store that has completed its
/// first refresh.
pub async fn open_store(config: &LodgeConfig) -> LodgeResult<RoomStore> {
    config.validate()?;
    let timeout = config.op_timeout();
    let kv = match config.storage.backend {
        Backend::Memory => with_deadline(InMemoryKvStore::new(), timeout),
        Backend::File => with_deadline(FileKvStore::open(&config.storage.data_dir).await?, timeout),
    };
    info!(
        backend = ?config.storage.backend,
        namespace = %config.storage.namespace,
        ?timeout,
        "opening room store"
    );
    let repo = RoomRepository::new(kv, &config.storage.namespace);
    Ok(RoomStore::open(repo).await)
}

fn with_deadline<S: KvStore + 'static>(store: S, timeout: Option<Duration>) -> Arc<dyn KvStore> {
    match timeout {
        Some(after) => Arc::new(TimeoutKvStore::new(store, after)),
        None => Arc::new(store),
    }
}
