//! Deployment configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    Result,
    constants::{DEFAULT_FAST_STORE_DB_PREFIX, DEFAULT_STORE_DB_PREFIX, DEFAULT_USER_DB_NAME},
    identity::LocalID,
};

/// Where the app runs. Only web deployments see bootstrap props, query
/// parameters and the logout redirect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    #[default]
    Native,
}

impl Platform {
    pub fn is_web(self) -> bool {
        matches!(self, Platform::Web)
    }
}

/// Settings for one [`crate::App`].
///
/// Every field has a default, so a partial JSON file is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub platform: Platform,
    /// Where `logout()` sends the browser on web deployments.
    pub logout_url: Option<Url>,
    pub user_db_name: String,
    pub store_db_prefix: String,
    pub fast_store_db_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            logout_url: None,
            user_db_name: DEFAULT_USER_DB_NAME.to_string(),
            store_db_prefix: DEFAULT_STORE_DB_PREFIX.to_string(),
            fast_store_db_prefix: DEFAULT_FAST_STORE_DB_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_logout_url(mut self, url: Url) -> Self {
        self.logout_url = Some(url);
        self
    }

    pub fn with_user_db_name(mut self, name: impl Into<String>) -> Self {
        self.user_db_name = name.into();
        self
    }

    pub fn with_store_db_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.store_db_prefix = prefix.into();
        self
    }

    pub fn with_fast_store_db_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fast_store_db_prefix = prefix.into();
        self
    }

    /// Database name of the per-store database for `local_id`.
    pub fn store_db_name(&self, local_id: &LocalID) -> String {
        format!("{}_{}", self.store_db_prefix, local_id)
    }

    /// Database name of the per-store fast database for `local_id`.
    pub fn fast_store_db_name(&self, local_id: &LocalID) -> String {
        format!("{}_{}", self.fast_store_db_prefix, local_id)
    }
}
