use std::fmt;
use std::io;
use std::time::Duration;

/// The storage operation an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOp {
    Load,
    Save,
    Remove,
    Keys,
}

impl StoreOp {
    /// `true` for operations that only read.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Load | Self::Keys)
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Save => "save",
            Self::Remove => "remove",
            Self::Keys => "keys",
        };
        f.write_str(name)
    }
}

/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O failure while reading.
    #[error("failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The stored value exists but cannot be decoded.
    #[error("corrupt value at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// I/O failure while writing or removing.
    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The value could not be serialized for writing.
    #[error("failed to encode value for {key}: {reason}")]
    Encode { key: String, reason: String },

    /// The backend did not answer within the configured deadline.
    #[error("{op} of {key} timed out after {after:?}")]
    TimedOut {
        key: String,
        op: StoreOp,
        after: Duration,
    },
}

impl StoreError {
    /// The operation that failed.
    pub fn op(&self) -> StoreOp {
        match self {
            Self::Read { .. } | Self::Corrupt { .. } => StoreOp::Load,
            Self::Write { .. } | Self::Encode { .. } => StoreOp::Save,
            Self::TimedOut { op, .. } => *op,
        }
    }

    /// `true` for read-side failures (I/O while reading, corrupt content).
    pub fn is_read(&self) -> bool {
        self.op().is_read()
    }

    /// `true` for write-side failures.
    pub fn is_write(&self) -> bool {
        !self.is_read()
    }

    /// The key involved in the failure.
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. }
            | Self::Corrupt { key, .. }
            | Self::Write { key, .. }
            | Self::Encode { key, .. }
            | Self::TimedOut { key, .. } => key,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
