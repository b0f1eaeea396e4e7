//! Foundation types for Lodge.
//!
//! This crate provides the identity, timestamp, and record types shared by
//! every other Lodge crate. It performs no I/O.
//!
//! # Key Types
//!
//! - [`RecordId`] -- Collision-resistant string identifier (UUID v7 on creation)
//! - [`RecordMeta`] -- Identity and creation/update timestamps embedded in every record
//! - [`Record`], [`Draft`], [`Patch`] -- The record factory contracts
//! - [`Room`] -- The room entity and its [`RoomStatus`] state machine
//! - [`Collection`] -- Persisted entity collections and their storage keys
//! - [`CollectionEnvelope`] -- Versioned on-disk layout of a collection

pub mod collection;
pub mod error;
pub mod id;
pub mod record;
pub mod room;

pub use collection::{Collection, CollectionEnvelope, SCHEMA_VERSION};
pub use error::TypeError;
pub use id::{RecordId, TenantId};
pub use record::{stamp_new, stamp_update, Draft, Patch, Record, RecordMeta, Timestamp};
pub use room::{NewRoom, Room, RoomChange, RoomPatch, RoomStatus};
