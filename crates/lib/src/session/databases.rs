use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tracing::info;

use crate::{
    Result, backend::DatabaseFactory, config::AppConfig, database::Database, identity::LocalID,
};

use super::SessionError;

/// The two databases belonging to one store.
#[derive(Clone, Debug)]
pub struct StoreDatabases {
    pub store_db: Database,
    pub fast_store_db: Database,
}

/// Lazily opened per-store databases, keyed by local ID.
///
/// Databases are opened the first time a store becomes current and reused
/// afterwards. Stores that are only linked never get one.
pub struct StoreDatabaseCache {
    factory: Arc<dyn DatabaseFactory>,
    config: AppConfig,
    opened: Mutex<HashMap<LocalID, StoreDatabases>>,
}

impl StoreDatabaseCache {
    pub fn new(factory: Arc<dyn DatabaseFactory>, config: AppConfig) -> Self {
        Self {
            factory,
            config,
            opened: Mutex::new(HashMap::new()),
        }
    }

    /// The databases of `local_id`, opening them on first use.
    pub async fn get_or_open(&self, local_id: &LocalID) -> Result<StoreDatabases> {
        let mut opened = self.opened.lock().await;
        if let Some(dbs) = opened.get(local_id) {
            return Ok(dbs.clone());
        }

        let dbs = self
            .open(local_id)
            .await
            .map_err(|e| SessionError::StoreDatabaseOpen {
                local_id: local_id.clone(),
                source: Box::new(e),
            })?;
        info!(store = %local_id, "Opened store databases");
        opened.insert(local_id.clone(), dbs.clone());
        Ok(dbs)
    }

    /// Local IDs whose databases have been opened, sorted.
    pub async fn opened(&self) -> Vec<LocalID> {
        let mut ids: Vec<LocalID> = self.opened.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn open(&self, local_id: &LocalID) -> Result<StoreDatabases> {
        let store_db =
            Database::open(self.factory.as_ref(), &self.config.store_db_name(local_id)).await?;
        let fast_store_db = Database::open(
            self.factory.as_ref(),
            &self.config.fast_store_db_name(local_id),
        )
        .await?;
        Ok(StoreDatabases {
            store_db,
            fast_store_db,
        })
    }
}
