//! Document store backends for tillpoint.
//!
//! The `DocumentBackend` trait is the storage collaborator the engine talks
//! to: named collections of JSON documents keyed by primary key, plus named
//! key/value state records. The engine never depends on how documents are
//! persisted, only on the contracts documented here.
//!
//! `DatabaseFactory` opens backends by database name. The user database, each
//! per-store database and each fast-store database are separate backends.

use std::{any::Any, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::Result;

pub mod database;
pub mod errors;
pub mod factory;

pub use errors::BackendError;
pub use factory::{InMemoryFactory, JsonFileFactory};

/// Storage trait behind a single local database.
///
/// All implementations must be `Send` and `Sync` to allow sharing across
/// tasks, and implement `Any` to allow downcasting (e.g. to persist an
/// [`database::InMemory`] on shutdown).
///
/// Primary keys are passed explicitly; the backend does not look inside
/// documents to find them.
#[async_trait]
pub trait DocumentBackend: Send + Sync + Any {
    /// Retrieves a document by primary key.
    ///
    /// # Returns
    /// `Ok(None)` when the collection has no such document.
    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Returns every document in a collection, ordered by primary key.
    async fn all(&self, collection: &str) -> Result<Vec<Value>>;

    /// Inserts a new document.
    ///
    /// # Errors
    /// `BackendError::DocumentAlreadyExists` if the primary key is taken.
    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<()>;

    /// Inserts or fully replaces a document.
    async fn upsert(&self, collection: &str, id: &str, doc: Value) -> Result<()>;

    /// Inserts every document whose primary key is not yet present.
    ///
    /// Existing documents are left untouched, none of their fields are
    /// overwritten.
    ///
    /// # Returns
    /// The primary keys that were actually inserted, in input order.
    async fn bulk_insert(
        &self,
        collection: &str,
        docs: Vec<(String, Value)>,
    ) -> Result<Vec<String>>;

    /// Removes the documents with the given primary keys.
    ///
    /// # Returns
    /// The primary keys that existed and were removed, in input order.
    async fn bulk_remove(&self, collection: &str, ids: &[String]) -> Result<Vec<String>>;

    /// Overwrites the given top-level fields of an existing document.
    ///
    /// # Errors
    /// `BackendError::DocumentNotFound` if there is no such document.
    ///
    /// # Returns
    /// The document after the patch.
    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value>;

    /// Reads one key of a named state record.
    async fn get_state(&self, name: &str, key: &str) -> Result<Option<Value>>;

    /// Writes one key of a named state record.
    async fn set_state(&self, name: &str, key: &str, value: Value) -> Result<()>;

    /// Deletes one key of a named state record. Missing keys are not an error.
    async fn remove_state(&self, name: &str, key: &str) -> Result<()>;

    /// Returns the whole named state record.
    async fn all_state(&self, name: &str) -> Result<Map<String, Value>>;

    /// Returns a reference to the backend as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Opens local databases by name.
///
/// Opening the same name twice must yield the same underlying storage, so
/// callers can treat `open` as idempotent.
#[async_trait]
pub trait DatabaseFactory: Send + Sync {
    /// Open (creating if needed) the database called `name`.
    async fn open(&self, name: &str) -> Result<Arc<dyn DocumentBackend>>;

    /// Persist every database opened so far. A no-op for volatile factories.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
