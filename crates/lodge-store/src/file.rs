//! File-backed key-value store.
//!
//! Each key maps to one file `<root>/<escaped-key>.json`. Bytes of the key
//! outside `[A-Za-z0-9_-]` are written as `%XX`, so distinct keys never share
//! a file and the key can be recovered from the file name.
//!
//! Saves write a temporary sibling file, flush it to disk, rename it over
//! the target, and sync the directory so the rename itself is durable. A
//! crash mid-save leaves either the old value or the new one, never a
//! truncated blob. Every save uses its own temporary name, so overlapping
//! saves of one key never write into the same file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

const EXTENSION: &str = "json";

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// [`KvStore`] persisting each key as a file under a root directory.
#[derive(Clone, Debug)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Open (or create) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Write {
                key: root.display().to_string(),
                source,
            })?;
        debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    /// The directory holding the store's files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{EXTENSION}", escape_key(key)))
    }

    /// Unique temporary sibling of `path`, e.g. `k.json.4711-3.tmp`.
    fn temp_path(path: &Path) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        path.with_extension(format!("{EXTENSION}.{}-{seq}.tmp", std::process::id()))
    }

    async fn write_atomically(&self, path: &Path, value: &str) -> io::Result<()> {
        let temp = Self::temp_path(path);
        let result = async {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(value.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp, path).await?;
            self.sync_root().await
        }
        .await;

        if result.is_err() {
            if let Err(e) = fs::remove_file(&temp).await {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %temp.display(), error = %e, "failed to clean up temp file");
                }
            }
        }
        result
    }

    #[cfg(unix)]
    async fn sync_root(&self) -> io::Result<()> {
        fs::File::open(&self.root).await?.sync_all().await
    }

    // Directories cannot be opened as files here; rename durability is left
    // to the filesystem.
    #[cfg(not(unix))]
    async fn sync_root(&self) -> io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    key: key.to_string(),
                    source,
                })
            }
        };
        debug!(key, bytes = bytes.len(), "loaded value");
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        self.write_atomically(&path, value)
            .await
            .map_err(|source| StoreError::Write {
                key: key.to_string(),
                source,
            })?;
        debug!(key, bytes = value.len(), "saved value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!(key, "removed value");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        let read_err = |source| StoreError::Read {
            key: self.root.display().to_string(),
            source,
        };
        let mut dir = fs::read_dir(&self.root).await.map_err(read_err)?;
        let mut keys = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(read_err)? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            if let Some(key) = unescape_key(stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn unescape_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (TempDir, FileKvStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::open(dir.path().join("data")).await.unwrap();
        (dir, store)
    }

    #[test]
    fn key_escaping_is_reversible() {
        for key in ["lodge:rooms", "plain_key-1", "@motel_manager:rooms", "a%b", "phòng"] {
            let escaped = escape_key(key);
            assert!(escaped
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'%'));
            assert_eq!(unescape_key(&escaped).as_deref(), Some(key));
        }
        assert_ne!(escape_key("a:b"), escape_key("a_b"));
    }

    #[tokio::test]
    async fn open_creates_root() {
        let (_dir, store) = store().await;
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn save_load_remove() {
        let (_dir, store) = store().await;
        assert!(store.load("lodge:rooms").await.unwrap().is_none());

        store.save("lodge:rooms", r#"{"records":[]}"#).await.unwrap();
        assert_eq!(
            store.load("lodge:rooms").await.unwrap().as_deref(),
            Some(r#"{"records":[]}"#)
        );
        assert!(store.path_for("lodge:rooms").is_file());

        store.remove("lodge:rooms").await.unwrap();
        assert!(store.load("lodge:rooms").await.unwrap().is_none());
        store.remove("lodge:rooms").await.unwrap();
    }

    #[tokio::test]
    async fn overwrite_leaves_no_temp_file() {
        let (_dir, store) = store().await;
        store.save("k", "one").await.unwrap();
        store.save("k", "two").await.unwrap();
        assert_eq!(store.load("k").await.unwrap().as_deref(), Some("two"));

        let mut names = Vec::new();
        let mut dir = fs::read_dir(store.root()).await.unwrap();
        while let Some(entry) = dir.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["k.json"]);
    }

    #[test]
    fn temp_paths_are_unique_siblings() {
        let target = Path::new("/data/lodge%3Arooms.json");
        let a = FileKvStore::temp_path(target);
        let b = FileKvStore::temp_path(target);
        assert_ne!(a, b);
        assert_eq!(a.parent(), target.parent());
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("lodge%3Arooms.json."));
        assert!(name.ends_with(".tmp"));
    }

    #[tokio::test]
    async fn overlapping_saves_of_one_key_all_land() {
        let (_dir, store) = store().await;
        let store = std::sync::Arc::new(store);
        let mut tasks = Vec::new();
        for n in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.save("lodge:rooms", &format!("value-{n}")).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let value = store.load("lodge:rooms").await.unwrap().unwrap();
        assert!(value.starts_with("value-"));
        assert_eq!(store.keys().await.unwrap(), vec!["lodge:rooms"]);

        let mut names = Vec::new();
        let mut dir = fs::read_dir(store.root()).await.unwrap();
        while let Some(entry) = dir.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["lodge%3Arooms.json"]);
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileKvStore::open(dir.path()).await.unwrap();
            store.save("lodge:rooms", "[]").await.unwrap();
        }
        let store = FileKvStore::open(dir.path()).await.unwrap();
        assert_eq!(store.load("lodge:rooms").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn keys_lists_decoded_names() {
        let (_dir, store) = store().await;
        store.save("lodge:rooms", "[]").await.unwrap();
        store.save("lodge:bills", "[]").await.unwrap();
        fs::write(store.root().join("stray.json.1-1.tmp"), "x").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["lodge:bills", "lodge:rooms"]);
    }

    #[tokio::test]
    async fn non_utf8_content_is_corrupt() {
        let (_dir, store) = store().await;
        fs::write(store.path_for("k"), [0xff, 0xfe, 0x00]).await.unwrap();
        let err = store.load("k").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn read_failure_is_read_error() {
        let (_dir, store) = store().await;
        // A directory where the value file should be cannot be read as a file.
        fs::create_dir_all(store.path_for("k")).await.unwrap();
        let err = store.load("k").await.unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }
}
