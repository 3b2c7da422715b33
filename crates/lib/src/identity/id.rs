//! Local store identifier type.
//!
//! The `LocalID` type wraps the truncated hex digest produced by
//! [`super::resolve_local_id`].

use serde::{Deserialize, Serialize};

/// The local primary key of a store record.
///
/// Derived from `(user, site, credentials, remote store id)`, so the same
/// remote store seen through the same login always maps to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalID(String);

impl LocalID {
    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LocalID {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LocalID {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for LocalID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocalID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::ops::Deref for LocalID {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<&str> for LocalID {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
