use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A compare-and-swap write lost against a concurrent writer.
    #[error("version conflict on `{id}`: expected {expected}")]
    Conflict { id: String, expected: u64 },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a version conflict for the given document.
    pub fn conflict(id: impl ToString, expected: u64) -> Self {
        StorageError::Conflict {
            id: id.to_string(),
            expected,
        }
    }
}
