//! Entity repositories for Lodge.
//!
//! A repository owns one collection key in a [`KvStore`](lodge_store::KvStore)
//! and performs every write as a read-modify-write of the whole collection:
//! load all records, change them in memory, save them all back.
//!
//! # Modules
//!
//! - [`error`] -- [`RepoError`] separating read, write, and argument failures
//! - [`collection`] -- [`CollectionRepository`], the generic read-modify-write cycle
//! - [`room`] -- [`RoomRepository`], room CRUD plus status and tenant transitions
//!
//! Absence is not an error: lookups and updates of an unknown id return
//! `Ok(None)` and deletes return `Ok(false)`.

pub mod collection;
pub mod error;
pub mod room;

pub use collection::CollectionRepository;
pub use error::{RepoError, RepoResult};
pub use room::RoomRepository;
