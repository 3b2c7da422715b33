//! In-memory document store
//!
//! This module provides an in-memory implementation of the DocumentBackend
//! trait, suitable for tests, native deployments that persist through
//! [`InMemory::save_to_file`], and any scenario where the embedding
//! application handles durability itself.

mod persistence;

use std::{any::Any, collections::BTreeMap, path::Path};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{
    Result,
    backend::{DocumentBackend, errors::BackendError},
};

/// Collection name -> (primary key -> document)
pub(crate) type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// State name -> key/value record
pub(crate) type States = BTreeMap<String, Map<String, Value>>;

/// A simple in-memory document store using ordered maps for storage.
///
/// Ordered maps keep `all()` output deterministic, which the merge logic and
/// the tests rely on for stable ordering.
///
/// It provides basic persistence via `save_to_file` and `load_from_file`,
/// serializing both maps to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) collections: RwLock<Collections>,
    pub(crate) states: RwLock<States>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Saves the entire store to a file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a store from a JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` store is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl DocumentBackend for InMemory {
    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn all(&self, collection: &str) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(BackendError::DocumentAlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            }
            .into());
        }
        docs.insert(id.to_string(), doc);
        Ok(())
    }

    async fn upsert(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn bulk_insert(
        &self,
        collection: &str,
        docs: Vec<(String, Value)>,
    ) -> Result<Vec<String>> {
        let mut collections = self.collections.write().await;
        let existing = collections.entry(collection.to_string()).or_default();
        let mut inserted = Vec::new();
        for (id, doc) in docs {
            if existing.contains_key(&id) {
                continue;
            }
            existing.insert(id.clone(), doc);
            inserted.push(id);
        }
        Ok(inserted)
    }

    async fn bulk_remove(&self, collection: &str, ids: &[String]) -> Result<Vec<String>> {
        let mut collections = self.collections.write().await;
        let Some(existing) = collections.get_mut(collection) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter(|id| existing.remove(id.as_str()).is_some())
            .cloned()
            .collect())
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| BackendError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let Some(object) = doc.as_object_mut() else {
            return Err(BackendError::InvalidDocument {
                collection: collection.to_string(),
                reason: format!("document {id} is not an object"),
            }
            .into());
        };
        for (key, value) in fields {
            object.insert(key, value);
        }
        Ok(doc.clone())
    }

    async fn get_state(&self, name: &str, key: &str) -> Result<Option<Value>> {
        let states = self.states.read().await;
        Ok(states.get(name).and_then(|state| state.get(key)).cloned())
    }

    async fn set_state(&self, name: &str, key: &str, value: Value) -> Result<()> {
        let mut states = self.states.write().await;
        states
            .entry(name.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_state(&self, name: &str, key: &str) -> Result<()> {
        let mut states = self.states.write().await;
        if let Some(state) = states.get_mut(name) {
            state.remove(key);
        }
        Ok(())
    }

    async fn all_state(&self, name: &str) -> Result<Map<String, Value>> {
        let states = self.states.read().await;
        Ok(states.get(name).cloned().unwrap_or_default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
