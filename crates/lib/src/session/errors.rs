//! Error types for the session layer.

use thiserror::Error;

use crate::identity::LocalID;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The per-store databases of a store could not be opened.
    #[error("Failed to open databases of store {local_id}")]
    StoreDatabaseOpen {
        /// The store whose databases were requested
        local_id: LocalID,
        /// The underlying failure
        #[source]
        source: Box<crate::Error>,
    },

    /// The background resolver stopped publishing snapshots.
    #[error("Session resolver is no longer running")]
    ResolverStopped,
}

impl SessionError {
    pub fn is_resolver_stopped(&self) -> bool {
        matches!(self, SessionError::ResolverStopped)
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
