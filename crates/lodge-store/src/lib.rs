//! Key-value persistence for Lodge.
//!
//! Collections are persisted as whole serialized blobs, one per key. This
//! crate provides the storage contract and its backends; it never interprets
//! the blobs it stores.
//!
//! # Storage Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`InMemoryKvStore`] -- `HashMap`-based store for tests and embedding,
//!   with failure injection
//! - [`FileKvStore`] -- one file per key under a root directory, written
//!   atomically via rename
//! - [`TimeoutKvStore`] -- decorator bounding every operation by a deadline
//!
//! # Design Rules
//!
//! 1. Keys are opaque strings; callers namespace them (`lodge:rooms`).
//! 2. A missing key is `Ok(None)`, never an error.
//! 3. A write either replaces the whole value or leaves the old one intact.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod timeout;
pub mod traits;

pub use error::{StoreError, StoreOp, StoreResult};
pub use file::FileKvStore;
pub use memory::InMemoryKvStore;
pub use timeout::TimeoutKvStore;
pub use traits::{KvStore, KvStoreExt};
