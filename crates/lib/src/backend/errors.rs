//! Error types for the document store backend.
//!
//! Structured errors for collection and state operations, so callers can
//! branch on the failure kind instead of matching strings.

use thiserror::Error;

/// Errors that can occur during document store operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Document not found by primary key.
    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound {
        /// The collection that was searched
        collection: String,
        /// The primary key that was not found
        id: String,
    },

    /// A document with the same primary key already exists.
    #[error("Document already exists: {collection}/{id}")]
    DocumentAlreadyExists {
        /// The collection the insert targeted
        collection: String,
        /// The conflicting primary key
        id: String,
    },

    /// A document did not have the shape a collection requires.
    #[error("Invalid document in {collection}: {reason}")]
    InvalidDocument {
        /// The collection the document belongs to
        collection: String,
        /// Why the document was rejected
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The storage layer refused or aborted an operation.
    #[error("Backend operation '{operation}' failed: {reason}")]
    OperationFailed {
        /// The operation that failed
        operation: String,
        /// Description of the failure
        reason: String,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::DocumentNotFound { .. })
    }

    /// Check if this error indicates a conflicting primary key.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, BackendError::DocumentAlreadyExists { .. })
    }

    /// Check if this error is related to I/O or (de)serialization.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Get the collection name if this error is about a specific collection.
    pub fn collection(&self) -> Option<&str> {
        match self {
            BackendError::DocumentNotFound { collection, .. }
            | BackendError::DocumentAlreadyExists { collection, .. }
            | BackendError::InvalidDocument { collection, .. } => Some(collection),
            _ => None,
        }
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
