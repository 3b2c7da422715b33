use std::{marker::PhantomData, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::trace;

use crate::{
    Error, Result,
    backend::{BackendError, DocumentBackend},
};

/// A record type stored in a named collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Name of the collection holding this type.
    const COLLECTION: &'static str;

    /// The primary key of this record.
    fn primary_key(&self) -> &str;
}

/// A typed collection
///
/// `Collection` converts between `T` and the backend's JSON documents and is
/// the only path by-id lookups take. [`Collection::find_by_id`] is guarded:
/// an empty id is "not found" and never reaches the backend, since some
/// stores answer an empty primary key with an arbitrary document.
pub struct Collection<T: Document> {
    backend: Arc<dyn DocumentBackend>,
    phantom: PhantomData<T>,
}

impl<T: Document> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self::new(self.backend.clone())
    }
}

impl<T: Document> Collection<T> {
    pub(crate) fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            phantom: PhantomData,
        }
    }

    /// The collection name.
    pub fn name(&self) -> &'static str {
        T::COLLECTION
    }

    /// Looks up a record by primary key.
    ///
    /// Empty ids resolve to `Ok(None)` without touching the backend.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        if id.is_empty() {
            trace!(collection = T::COLLECTION, "Empty id lookup intercepted");
            return Ok(None);
        }
        match self.backend.find_one(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// [`find_by_id`](Self::find_by_id) for an optional id.
    pub async fn find_by_optional_id(&self, id: Option<&str>) -> Result<Option<T>> {
        match id {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Looks up several records, preserving `ids` order and skipping missing
    /// or empty ids.
    pub async fn find_many<I: AsRef<str>>(&self, ids: &[I]) -> Result<Vec<T>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(doc) = self.find_by_id(id.as_ref()).await? {
                found.push(doc);
            }
        }
        Ok(found)
    }

    /// Every record in the collection, ordered by primary key.
    pub async fn all(&self) -> Result<Vec<T>> {
        self.backend
            .all(T::COLLECTION)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    /// Inserts a new record, failing if the primary key is taken.
    pub async fn insert(&self, doc: &T) -> Result<()> {
        self.backend
            .insert(T::COLLECTION, doc.primary_key(), to_document(doc)?)
            .await
    }

    /// Inserts or replaces a record.
    pub async fn upsert(&self, doc: &T) -> Result<()> {
        self.backend
            .upsert(T::COLLECTION, doc.primary_key(), to_document(doc)?)
            .await
    }

    /// Inserts the records whose primary key is absent.
    ///
    /// # Returns
    /// The primary keys actually inserted.
    pub async fn bulk_insert(&self, docs: &[T]) -> Result<Vec<String>> {
        let docs = docs
            .iter()
            .map(|doc| -> Result<(String, Value)> {
                Ok((doc.primary_key().to_string(), to_document(doc)?))
            })
            .collect::<Result<Vec<_>>>()?;
        self.backend.bulk_insert(T::COLLECTION, docs).await
    }

    /// Removes records by primary key.
    ///
    /// # Returns
    /// The primary keys that existed and were removed.
    pub async fn bulk_remove(&self, ids: &[String]) -> Result<Vec<String>> {
        self.backend.bulk_remove(T::COLLECTION, ids).await
    }

    /// Overwrites top-level fields of an existing record.
    pub async fn patch(&self, id: &str, fields: Map<String, Value>) -> Result<T> {
        let doc = self.backend.patch(T::COLLECTION, id, fields).await?;
        from_document(doc)
    }
}

fn to_document<T: Serialize>(doc: &T) -> Result<Value> {
    serde_json::to_value(doc)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })
}

fn from_document<T: DeserializeOwned>(doc: Value) -> Result<T> {
    serde_json::from_value(doc)
        .map_err(|e| -> Error { BackendError::DeserializationFailed { source: e }.into() })
}
