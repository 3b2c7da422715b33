//! Error types for store reconciliation.

use thiserror::Error;

use crate::identity::LocalID;

/// Errors raised while reconciling remote stores against local records.
///
/// Reconciliation is not transactional. Every variant carries the local IDs
/// that were already removed before the failure, so callers can see exactly
/// how far the merge got.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MergeError {
    /// Reading the currently linked stores failed.
    #[error("Failed to load stores linked to credentials {credentials_id}")]
    LoadFailed {
        /// The credentials being reconciled
        credentials_id: String,
        /// The underlying failure
        #[source]
        source: Box<crate::Error>,
    },

    /// The bulk removal of stale stores failed.
    #[error("Failed to remove {} stale store(s)", .attempted.len())]
    RemoveFailed {
        /// The local IDs the removal targeted
        attempted: Vec<LocalID>,
        /// The underlying failure
        #[source]
        source: Box<crate::Error>,
    },

    /// Inserting the remote stores failed.
    #[error("Failed to insert stores after removing {} stale store(s)", .removed.len())]
    InsertFailed {
        /// Stores already removed before the failure
        removed: Vec<LocalID>,
        /// The underlying failure
        #[source]
        source: Box<crate::Error>,
    },

    /// Writing the new store list onto the credentials failed.
    #[error("Failed to update store list of credentials {credentials_id}")]
    CredentialsUpdateFailed {
        /// The credentials being reconciled
        credentials_id: String,
        /// Stores already removed before the failure
        removed: Vec<LocalID>,
        /// Stores already inserted before the failure
        inserted: Vec<LocalID>,
        /// The underlying failure
        #[source]
        source: Box<crate::Error>,
    },
}

impl MergeError {
    /// True when some local state was already changed before the failure.
    pub fn is_partial(&self) -> bool {
        match self {
            MergeError::LoadFailed { .. } | MergeError::RemoveFailed { .. } => false,
            MergeError::InsertFailed { removed, .. } => !removed.is_empty(),
            MergeError::CredentialsUpdateFailed {
                removed, inserted, ..
            } => !removed.is_empty() || !inserted.is_empty(),
        }
    }

    /// Local IDs removed before the failure.
    pub fn removed(&self) -> &[LocalID] {
        match self {
            MergeError::InsertFailed { removed, .. }
            | MergeError::CredentialsUpdateFailed { removed, .. } => removed,
            _ => &[],
        }
    }

    /// The underlying error that aborted the merge.
    pub fn cause(&self) -> &crate::Error {
        match self {
            MergeError::LoadFailed { source, .. }
            | MergeError::RemoveFailed { source, .. }
            | MergeError::InsertFailed { source, .. }
            | MergeError::CredentialsUpdateFailed { source, .. } => source.as_ref(),
        }
    }
}

impl From<MergeError> for crate::Error {
    fn from(err: MergeError) -> Self {
        crate::Error::Merge(err)
    }
}
