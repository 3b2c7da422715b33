//! Document types stored in the user database.
//!
//! Each type implements [`Document`], naming its collection and primary key.
//! Fields the engine does not interpret are kept in a flattened `extra` map
//! so upserts from server payloads never drop data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{constants, database::Document, identity::LocalID};

/// The singleton local user. Exactly one exists per user database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uuid: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl User {
    /// A fresh user with a random v4 uuid and empty names.
    pub fn generate() -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}

impl Document for User {
    const COLLECTION: &'static str = constants::USERS;

    fn primary_key(&self) -> &str {
        &self.uuid
    }
}

/// A remote backend the user can log in to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub uuid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Site {
    pub fn new(uuid: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            url: url.into(),
            name: None,
            extra: Map::new(),
        }
    }
}

impl Document for Site {
    const COLLECTION: &'static str = constants::SITES;

    fn primary_key(&self) -> &str {
        &self.uuid
    }
}

/// Login credentials of the user on one site.
///
/// `stores` lists the local IDs of the stores linked through this login, in
/// the order the server returned them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WpCredentials {
    pub uuid: String,
    #[serde(default)]
    pub stores: Vec<LocalID>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WpCredentials {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            stores: Vec::new(),
            access_token: None,
            refresh_token: None,
            extra: Map::new(),
        }
    }
}

impl Document for WpCredentials {
    const COLLECTION: &'static str = constants::WP_CREDENTIALS;

    fn primary_key(&self) -> &str {
        &self.uuid
    }
}

/// A store as returned by the server, before it has a local identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteStore {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteStore {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// Attach a computed local ID, producing the storable record.
    pub fn into_store(self, local_id: LocalID) -> Store {
        Store {
            local_id,
            id: self.id,
            name: self.name,
            extra: self.extra,
        }
    }
}

/// A locally stored store, keyed by its local ID.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "localID")]
    pub local_id: LocalID,
    /// Remote numeric id as known by the server.
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document for Store {
    const COLLECTION: &'static str = constants::STORES;

    fn primary_key(&self) -> &str {
        self.local_id.as_str()
    }
}

/// The persisted record naming the current site, credentials and store.
///
/// `store_id` holds a local ID, not the remote numeric id. Every field may be
/// absent: an all-`None` pointer means logged out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPointer {
    #[serde(rename = "siteID", default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(
        rename = "wpCredentialsID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub wp_credentials_id: Option<String>,
    #[serde(rename = "storeID", default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

impl SessionPointer {
    pub fn new(
        site_id: impl Into<String>,
        wp_credentials_id: impl Into<String>,
        store_id: impl Into<String>,
    ) -> Self {
        Self {
            site_id: Some(site_id.into()),
            wp_credentials_id: Some(wp_credentials_id.into()),
            store_id: Some(store_id.into()),
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.site_id.is_none() && self.wp_credentials_id.is_none() && self.store_id.is_none()
    }

    /// Copy of this pointer with only the store replaced.
    pub fn with_store(&self, store_id: impl Into<String>) -> Self {
        Self {
            store_id: Some(store_id.into()),
            ..self.clone()
        }
    }
}
