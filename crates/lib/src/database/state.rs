use std::sync::Arc;

use handle_trait::Handle;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::{
    Error, Result,
    backend::{BackendError, DocumentBackend},
};

struct StateInner {
    name: String,
    backend: Arc<dyn DocumentBackend>,
    /// Bumped after every successful write.
    revision: watch::Sender<u64>,
}

/// A reactive, persisted key/value record.
///
/// Values are stored through the database backend; subscribers are woken
/// with a new revision number after each write. Obtain one through
/// [`super::Database::add_state`].
#[derive(Clone, Handle)]
pub struct State {
    inner: Arc<StateInner>,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("name", &self.inner.name)
            .field("revision", &*self.inner.revision.borrow())
            .finish()
    }
}

impl State {
    pub(crate) fn new(name: &str, backend: Arc<dyn DocumentBackend>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(StateInner {
                name: name.to_string(),
                backend,
                revision,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Read and deserialize `key`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_value(key).await? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| -> Error {
                BackendError::DeserializationFailed { source: e }.into()
            }),
            None => Ok(None),
        }
    }

    /// Read `key` as raw JSON.
    pub async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        self.inner.backend.get_state(&self.inner.name, key).await
    }

    /// The whole record.
    pub async fn all(&self) -> Result<Map<String, Value>> {
        self.inner.backend.all_state(&self.inner.name).await
    }

    /// Serialize and write `key`, then notify subscribers.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;
        self.inner
            .backend
            .set_state(&self.inner.name, key, value)
            .await?;
        self.bump();
        Ok(())
    }

    /// Delete `key`, then notify subscribers.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.inner
            .backend
            .remove_state(&self.inner.name, key)
            .await?;
        self.bump();
        Ok(())
    }

    /// Subscribe to writes. The receiver yields a revision counter; read the
    /// keys you care about after each change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Current revision number.
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }
}
