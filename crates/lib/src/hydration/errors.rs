//! Error types for the bootstrap pipeline.

use std::sync::Arc;

use thiserror::Error;

use super::context::ContextKey;

/// Errors raised by the hydration pipeline itself.
///
/// A step may also fail with any other [`crate::Error`]; the pipeline passes
/// such errors through unchanged.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HydrationError {
    /// A step needs context that no earlier step produced.
    #[error("Step '{step}' requires '{key}' but no earlier step provided it")]
    ContextMissing {
        /// The step that could not run
        step: String,
        /// The missing context entry
        key: ContextKey,
    },

    /// The user database could not be opened or seeded.
    #[error("Failed to initialize user database '{name}'")]
    DatabaseInit {
        /// Name of the database being opened
        name: String,
        /// The underlying failure
        #[source]
        source: Box<crate::Error>,
    },

    /// The pipeline task stopped without producing a result.
    #[error("Hydration aborted: {reason}")]
    Aborted {
        /// Why the task stopped
        reason: String,
    },

    /// An earlier hydration run failed. Every later request sees this.
    #[error("Hydration failed")]
    Failed {
        /// The error the run failed with
        #[source]
        source: Arc<crate::Error>,
    },
}

impl HydrationError {
    /// Check if a step ran without its required context.
    pub fn is_context_missing(&self) -> bool {
        matches!(self, HydrationError::ContextMissing { .. })
    }

    /// Check if the user database failed to initialize.
    pub fn is_database_init(&self) -> bool {
        matches!(self, HydrationError::DatabaseInit { .. })
    }

    /// Check if this wraps an earlier failed run.
    pub fn is_failed_run(&self) -> bool {
        matches!(self, HydrationError::Failed { .. })
    }

    /// The step that failed, when known.
    pub fn step(&self) -> Option<&str> {
        match self {
            HydrationError::ContextMissing { step, .. } => Some(step),
            _ => None,
        }
    }
}

impl From<HydrationError> for crate::Error {
    fn from(err: HydrationError) -> Self {
        crate::Error::Hydration(err)
    }
}
