//! Storage error types.

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (`user`, `transaction`, `history entry`).
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A uniqueness constraint was violated on insert.
    #[error("duplicate {field}")]
    Duplicate {
        /// The conflicting field (`username` or `email`).
        field: &'static str,
    },

    /// A data file could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// A data file could not be parsed or encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
