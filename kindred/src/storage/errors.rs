//! Error types for storage operations

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced record does not exist
    #[error("record not found: character {0}")]
    NotFound(u32),

    /// A record with the same key already exists
    #[error("record already exists: character {0}")]
    AlreadyExists(u32),

    /// A multi-record transaction could not commit
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend-specific error
    #[error("backend error: {0}")]
    Backend(String),

    /// Internal invariant violation inside the store
    #[error("internal storage error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
