use thiserror::Error;

#[derive(Debug, Error)]
pub enum LodgeError {
    #[error("{0}")]
    Repo(#[from] lodge_repo::RepoError),

    #[error("store error: {0}")]
    Store(#[from] lodge_store::StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LodgeError {
    /// `true` when the request itself was rejected (bad status, empty room
    /// number, non-positive price).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Repo(e) if e.is_invalid_argument())
    }
}

pub type LodgeResult<T> = Result<T, LodgeError>;
