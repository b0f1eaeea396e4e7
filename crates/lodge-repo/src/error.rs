//! Error types for repository operations.

use lodge_store::StoreError;
use lodge_types::{Collection, TypeError};
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The collection could not be loaded.
    #[error("failed to read {collection}: {source}")]
    Read {
        collection: Collection,
        #[source]
        source: StoreError,
    },

    /// The collection could not be saved. Nothing was persisted.
    #[error("failed to write {collection}: {source}")]
    Write {
        collection: Collection,
        #[source]
        source: StoreError,
    },

    /// The request was rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] TypeError),
}

impl RepoError {
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Convenience type alias for repository operations.
pub type RepoResult<T> = std::result::Result<T, RepoError>;
