use thiserror::Error;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid room status: {0:?} (expected empty, occupied, or cleaning)")]
    InvalidStatus(String),

    #[error("room number must not be empty")]
    EmptyRoomNumber,

    #[error("price must be a positive number, got {0}")]
    InvalidPrice(String),

    #[error("record id must not be empty")]
    EmptyId,

    #[error("collection schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
}
