//! Database factories.
//!
//! Both factories cache opened databases by name, so `open` is idempotent and
//! every caller asking for `store_v2_<localID>` shares one backend.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{DatabaseFactory, DocumentBackend, database::InMemory};
use crate::Result;

/// Volatile factory: every database lives in memory for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryFactory {
    opened: Mutex<HashMap<String, Arc<InMemory>>>,
}

impl InMemoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the databases opened so far, sorted.
    pub async fn opened_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.opened.lock().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl DatabaseFactory for InMemoryFactory {
    async fn open(&self, name: &str) -> Result<Arc<dyn DocumentBackend>> {
        let mut opened = self.opened.lock().await;
        let db: Arc<dyn DocumentBackend> = opened
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(database = name, "Creating in-memory database");
                Arc::new(InMemory::new())
            })
            .clone();
        Ok(db)
    }
}

/// Factory that keeps databases in memory and persists each one to
/// `<dir>/<name>.json`.
///
/// Files are read on first open and written on [`DatabaseFactory::flush`].
#[derive(Debug)]
pub struct JsonFileFactory {
    dir: PathBuf,
    opened: Mutex<HashMap<String, Arc<InMemory>>>,
}

impl JsonFileFactory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            opened: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the database files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl DatabaseFactory for JsonFileFactory {
    async fn open(&self, name: &str) -> Result<Arc<dyn DocumentBackend>> {
        let mut opened = self.opened.lock().await;
        if let Some(db) = opened.get(name) {
            let db: Arc<dyn DocumentBackend> = db.clone();
            return Ok(db);
        }

        let path = self.path_for(name);
        let db = Arc::new(InMemory::load_from_file(&path).await?);
        debug!(database = name, path = %path.display(), "Opened database file");
        opened.insert(name.to_string(), db.clone());
        let db: Arc<dyn DocumentBackend> = db;
        Ok(db)
    }

    async fn flush(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| super::BackendError::FileIo { source: e })?;

        let opened = self.opened.lock().await;
        for (name, db) in opened.iter() {
            db.save_to_file(self.path_for(name)).await?;
        }
        info!(count = opened.len(), dir = %self.dir.display(), "Flushed databases");
        Ok(())
    }
}
