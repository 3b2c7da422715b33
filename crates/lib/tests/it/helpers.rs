use std::{
    any::Any,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tillpoint::{
    App, AppConfig, Platform, Result,
    backend::{BackendError, DatabaseFactory, DocumentBackend, InMemoryFactory, database::InMemory},
    database::Database,
    hydration::InitialProps,
    models::{RemoteStore, Site, User, WpCredentials},
    navigator::Navigator,
};
use url::Url;

// ==========================
// SAMPLE DATA
// ==========================

pub const SITE_ID: &str = "site-1";
pub const CREDENTIALS_ID: &str = "cred-1";
pub const LOGOUT_URL: &str = "https://shop.test/logout";

pub fn sample_site() -> Site {
    Site::new(SITE_ID, "https://shop.test")
}

pub fn sample_credentials() -> WpCredentials {
    WpCredentials::new(CREDENTIALS_ID)
}

pub fn sample_user() -> User {
    User {
        uuid: "user-1".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}

/// Remote stores named after their ids.
pub fn remote_stores(ids: &[i64]) -> Vec<RemoteStore> {
    ids.iter()
        .map(|id| RemoteStore::new(*id, format!("Store {id}")))
        .collect()
}

pub fn sample_props(store_ids: &[i64]) -> InitialProps {
    InitialProps {
        site: sample_site(),
        wp_credentials: sample_credentials(),
        stores: remote_stores(store_ids),
    }
}

// ==========================
// COUNTING BACKEND
// ==========================

/// Operation a [`CountingBackend`] can be told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    FindOne,
    BulkInsert,
    BulkRemove,
    Patch,
    SetState,
    RemoveState,
}

/// In-memory backend that records what reaches it and can inject failures.
#[derive(Default)]
pub struct CountingBackend {
    inner: InMemory,
    lookups: Mutex<Vec<String>>,
    inserted: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    fail_on: Mutex<Option<FailOn>>,
}

impl CountingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, op: FailOn) {
        *self.fail_on.lock().unwrap() = Some(op);
    }

    pub fn clear_failure(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    /// Every id passed to `find_one`.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    /// Primary keys bulk-inserted so far.
    pub fn inserted(&self) -> Vec<String> {
        self.inserted.lock().unwrap().clone()
    }

    /// Primary keys bulk-removed so far.
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn reset_counts(&self) {
        self.lookups.lock().unwrap().clear();
        self.inserted.lock().unwrap().clear();
        self.removed.lock().unwrap().clear();
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.inner.count(collection).await
    }

    fn check(&self, op: FailOn) -> Result<()> {
        if *self.fail_on.lock().unwrap() == Some(op) {
            return Err(BackendError::OperationFailed {
                operation: format!("{op:?}"),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for CountingBackend {
    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.lookups.lock().unwrap().push(id.to_string());
        self.check(FailOn::FindOne)?;
        self.inner.find_one(collection, id).await
    }

    async fn all(&self, collection: &str) -> Result<Vec<Value>> {
        self.inner.all(collection).await
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        self.inner.insert(collection, id, doc).await
    }

    async fn upsert(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        self.inner.upsert(collection, id, doc).await
    }

    async fn bulk_insert(
        &self,
        collection: &str,
        docs: Vec<(String, Value)>,
    ) -> Result<Vec<String>> {
        self.check(FailOn::BulkInsert)?;
        let inserted = self.inner.bulk_insert(collection, docs).await?;
        self.inserted.lock().unwrap().extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn bulk_remove(&self, collection: &str, ids: &[String]) -> Result<Vec<String>> {
        self.check(FailOn::BulkRemove)?;
        let removed = self.inner.bulk_remove(collection, ids).await?;
        self.removed.lock().unwrap().extend(removed.iter().cloned());
        Ok(removed)
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value> {
        self.check(FailOn::Patch)?;
        self.inner.patch(collection, id, fields).await
    }

    async fn get_state(&self, name: &str, key: &str) -> Result<Option<Value>> {
        self.inner.get_state(name, key).await
    }

    async fn set_state(&self, name: &str, key: &str, value: Value) -> Result<()> {
        self.check(FailOn::SetState)?;
        self.inner.set_state(name, key, value).await
    }

    async fn remove_state(&self, name: &str, key: &str) -> Result<()> {
        self.check(FailOn::RemoveState)?;
        self.inner.remove_state(name, key).await
    }

    async fn all_state(&self, name: &str) -> Result<Map<String, Value>> {
        self.inner.all_state(name).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A user database over a [`CountingBackend`], with the sample user, site
/// and credentials stored.
pub async fn seeded_user_db() -> (Database, Arc<CountingBackend>, User) {
    let backend = CountingBackend::new();
    let db = Database::new("tillpoint_users", backend.clone());
    let user = sample_user();
    db.users().insert(&user).await.unwrap();
    db.sites().upsert(&sample_site()).await.unwrap();
    db.wp_credentials()
        .upsert(&sample_credentials())
        .await
        .unwrap();
    (db, backend, user)
}

// ==========================
// FACTORIES
// ==========================

/// Factory that refuses to open anything.
pub struct FailingFactory;

#[async_trait]
impl DatabaseFactory for FailingFactory {
    async fn open(&self, name: &str) -> Result<Arc<dyn DocumentBackend>> {
        Err(BackendError::OperationFailed {
            operation: "open".to_string(),
            reason: format!("cannot open {name}"),
        }
        .into())
    }
}

// ==========================
// NAVIGATOR
// ==========================

/// Navigator over a mutable URL that records every change.
#[derive(Default)]
pub struct RecordingNavigator {
    url: Mutex<Option<Url>>,
    replaced: Mutex<Vec<Url>>,
    navigated: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    pub fn at(url: &str) -> Arc<Self> {
        let nav = Self::default();
        *nav.url.lock().unwrap() = Some(Url::parse(url).unwrap());
        Arc::new(nav)
    }

    pub fn replaced(&self) -> Vec<Url> {
        self.replaced.lock().unwrap().clone()
    }

    pub fn navigated(&self) -> Vec<Url> {
        self.navigated.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_url(&self) -> Option<Url> {
        self.url.lock().unwrap().clone()
    }

    fn replace_url(&self, url: Url) {
        *self.url.lock().unwrap() = Some(url.clone());
        self.replaced.lock().unwrap().push(url);
    }

    fn navigate(&self, url: Url) {
        self.navigated.lock().unwrap().push(url);
    }
}

// ==========================
// APPS
// ==========================

/// Native app over a fresh in-memory factory.
pub fn native_app() -> (App, Arc<InMemoryFactory>) {
    let factory = Arc::new(InMemoryFactory::new());
    (App::new(AppConfig::default(), factory.clone()), factory)
}

pub fn web_config() -> AppConfig {
    AppConfig::default()
        .with_platform(Platform::Web)
        .with_logout_url(Url::parse(LOGOUT_URL).unwrap())
}

/// Web app over `factory`, bootstrapped from `props` at `url`.
pub fn web_app(
    factory: Arc<InMemoryFactory>,
    props: InitialProps,
    url: &str,
) -> (App, Arc<RecordingNavigator>) {
    let navigator = RecordingNavigator::at(url);
    let app = App::builder(web_config(), factory)
        .navigator(navigator.clone())
        .initial_props(props)
        .build();
    (app, navigator)
}
