//! High-level API for Lodge.
//!
//! [`RoomStore`] is the only surface consumers (screens, the CLI) should
//! use. It keeps an observable in-memory copy of the rooms collection,
//! routes every mutation through the repository, and updates the cache only
//! after the repository confirms the write.

pub mod config;
pub mod error;
pub mod query;
pub mod state;
pub mod store;

pub use config::{open_store, Backend, LodgeConfig, StorageConfig};
pub use error::{LodgeError, LodgeResult};
pub use query::StatusCounts;
pub use state::StoreState;
pub use store::RoomStore;

// Re-export key types
pub use lodge_repo::{RepoError, RoomRepository};
pub use lodge_types::{NewRoom, RecordId, Room, RoomPatch, RoomStatus, TenantId};
