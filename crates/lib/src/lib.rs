//!
//! Tillpoint: session bootstrap and store identity for a point-of-sale client.
//!
//! ## Core Concepts
//!
//! * **Local IDs (`identity::LocalID`)**: Deterministic store identifiers derived by hashing
//!   the (user, site, credentials, remote store) tuple, so repeated syncs map a remote store
//!   to the same local record without any central ID authority.
//! * **Databases (`database::Database`)**: Named handles over a pluggable document backend
//!   (`backend::DocumentBackend`), exposing typed collections and reactive state records.
//! * **Reconciliation (`merge`)**: Brings the stores linked to a login in line with the list
//!   the server returned, removing stale stores before inserting new ones.
//! * **Hydration (`hydration`)**: The sequential bootstrap pipeline that opens the user
//!   database, applies server-injected props and loads the session pointer.
//! * **Sessions (`session`)**: A snapshot of the current site, credentials, store and
//!   per-store databases, re-resolved whenever the session pointer changes.
//! * **App (`app::App`)**: The process-lifetime container that runs hydration exactly once
//!   and hands out sessions and session actions.

pub mod app;
pub mod backend;
pub mod config;
pub mod constants;
pub mod database;
pub mod hydration;
pub mod identity;
pub mod merge;
pub mod models;
pub mod navigator;
pub mod session;

pub use app::App;
pub use config::{AppConfig, Platform};
pub use identity::LocalID;

/// Result type used throughout the Tillpoint library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Tillpoint library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Structured document store errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured bootstrap errors from the hydration module
    #[error(transparent)]
    Hydration(hydration::HydrationError),

    /// Structured reconciliation errors from the merge module
    #[error(transparent)]
    Merge(merge::MergeError),

    /// Structured session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Hydration(_) => "hydration",
            Error::Merge(_) => "merge",
            Error::Session(_) => "session",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Url(_) => "url",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error is database/backend-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error came out of the bootstrap pipeline.
    pub fn is_hydration_error(&self) -> bool {
        matches!(self, Error::Hydration(_))
    }

    /// Check if a hydration step ran without its required context.
    ///
    /// Looks through a wrapped failed run.
    pub fn is_context_missing(&self) -> bool {
        match self {
            Error::Hydration(hydration::HydrationError::Failed { source }) => {
                source.is_context_missing()
            }
            Error::Hydration(hydration_err) => hydration_err.is_context_missing(),
            _ => false,
        }
    }

    /// Check if the user database failed to initialize.
    pub fn is_database_init_error(&self) -> bool {
        match self {
            Error::Hydration(hydration::HydrationError::Failed { source }) => {
                source.is_database_init_error()
            }
            Error::Hydration(hydration_err) => hydration_err.is_database_init(),
            _ => false,
        }
    }

    /// Check if this error is a store reconciliation failure.
    pub fn is_merge_error(&self) -> bool {
        matches!(self, Error::Merge(_))
    }

    /// Check if this error is session-related.
    pub fn is_session_error(&self) -> bool {
        matches!(self, Error::Session(_))
    }
}
