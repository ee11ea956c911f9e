//! Event store error handling

use thiserror::Error;

/// Failure to build an [`EventStore`](crate::EventStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// Fixture file could not be read
    #[error("Failed to read store fixture {path}: {source}")]
    Io {
        /// Fixture path
        path: String,
        /// Underlying read failure
        #[source]
        source: std::io::Error,
    },

    /// Fixture is not valid JSON for the store layout
    #[error("Invalid store fixture: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two records of one collection share an id
    #[error("Duplicate {kind} id `{id}`")]
    Duplicate {
        /// Collection name
        kind: &'static str,
        /// Repeated id
        id: String,
    },

    /// Role name matches no tier
    #[error("Unknown role `{0}`")]
    UnknownRole(String),
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
