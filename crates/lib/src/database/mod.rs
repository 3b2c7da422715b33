//! Typed access to a local database.
//!
//! A `Database` is a named handle over a [`DocumentBackend`]. It exposes the
//! typed collections the session engine works with and the reactive
//! [`State`] records used to persist app-scoped settings such as the session
//! pointer. The user database and every per-store database are `Database`s;
//! only the user database populates `users`, `sites`, `wp_credentials` and
//! `stores`.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use handle_trait::Handle;

use crate::{
    Result,
    backend::{DatabaseFactory, DocumentBackend},
    models::{Site, Store, User, WpCredentials},
};

mod collection;
mod state;

pub use collection::{Collection, Document};
pub use state::State;


struct DatabaseInner {
    name: String,
    backend: Arc<dyn DocumentBackend>,
    /// States handed out so far. Handles for the same name share one change
    /// channel, so a write through any handle wakes every subscriber.
    states: Mutex<HashMap<String, State>>,
}

/// Cheap-to-clone handle to a named local database.
#[derive(Clone, Handle)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.inner.name)
            .field("backend", &"<DocumentBackend>")
            .finish()
    }
}

impl Database {
    /// Wrap an already opened backend.
    pub fn new(name: impl Into<String>, backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                name: name.into(),
                backend,
                states: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Open `name` through a factory.
    pub async fn open(factory: &dyn DatabaseFactory, name: &str) -> Result<Self> {
        let backend = factory.open(name).await?;
        Ok(Self::new(name, backend))
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.inner.backend
    }

    /// Typed view over the collection `T` lives in.
    pub fn collection<T: Document>(&self) -> Collection<T> {
        Collection::new(self.inner.backend.clone())
    }

    pub fn users(&self) -> Collection<User> {
        self.collection()
    }

    pub fn sites(&self) -> Collection<Site> {
        self.collection()
    }

    pub fn wp_credentials(&self) -> Collection<WpCredentials> {
        self.collection()
    }

    pub fn stores(&self) -> Collection<Store> {
        self.collection()
    }

    /// Get the reactive state record called `name`, creating the handle on
    /// first use.
    pub fn add_state(&self, name: &str) -> State {
        let mut states = self.inner.states.lock().unwrap();
        states
            .entry(name.to_string())
            .or_insert_with(|| State::new(name, self.inner.backend.clone()))
            .clone()
    }

    /// True if both handles point at the same database.
    pub fn ptr_eq(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
