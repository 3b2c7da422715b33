//! The current session, derived from the persisted session pointer.
//!
//! [`SessionResolver`] watches the app state record. Every time the pointer
//! changes it looks up the site, credentials and store it names, opens the
//! store's databases if a store resolved, and publishes one immutable
//! [`SessionSnapshot`]. Changes are handled one at a time by a single task,
//! so a snapshot is always fully resolved before the next change is read.
//!
//! Missing records are not errors: a logged-out or half-configured pointer
//! simply resolves to a snapshot with empty entries.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, instrument};

use crate::{
    Result,
    constants::{CURRENT, EXTRA_DATA},
    database::{Database, State},
    models::{SessionPointer, Site, Store, WpCredentials},
};

pub mod actions;
mod databases;
pub mod errors;

pub use actions::SessionActions;
pub use databases::{StoreDatabaseCache, StoreDatabases};
pub use errors::SessionError;

/// Everything known about the current session at one point in time.
#[derive(Clone, Debug, Default)]
pub struct SessionSnapshot {
    pub pointer: SessionPointer,
    pub site: Option<Site>,
    pub wp_credentials: Option<WpCredentials>,
    pub store: Option<Store>,
    pub store_db: Option<Database>,
    pub fast_store_db: Option<Database>,
    /// Auxiliary state inside the store database.
    pub extra_data: Option<State>,
}

impl SessionSnapshot {
    /// True when site, credentials and store all resolved.
    pub fn is_complete(&self) -> bool {
        self.site.is_some() && self.wp_credentials.is_some() && self.store.is_some()
    }
}

/// Resolve `pointer` against the user database.
///
/// Each entry is looked up independently through the guarded by-id
/// accessor, so empty ids resolve to nothing.
#[instrument(skip_all, fields(store = ?pointer.store_id))]
pub async fn resolve(
    user_db: &Database,
    databases: &StoreDatabaseCache,
    pointer: SessionPointer,
) -> Result<SessionSnapshot> {
    let site = user_db
        .sites()
        .find_by_optional_id(pointer.site_id.as_deref())
        .await?;
    let wp_credentials = user_db
        .wp_credentials()
        .find_by_optional_id(pointer.wp_credentials_id.as_deref())
        .await?;
    let store = user_db
        .stores()
        .find_by_optional_id(pointer.store_id.as_deref())
        .await?;

    let mut snapshot = SessionSnapshot {
        pointer,
        site,
        wp_credentials,
        store,
        ..Default::default()
    };

    if let Some(store) = &snapshot.store {
        let dbs = databases.get_or_open(&store.local_id).await?;
        snapshot.extra_data = Some(dbs.store_db.add_state(EXTRA_DATA));
        snapshot.store_db = Some(dbs.store_db);
        snapshot.fast_store_db = Some(dbs.fast_store_db);
    }

    debug!(
        site = snapshot.site.is_some(),
        credentials = snapshot.wp_credentials.is_some(),
        store = snapshot.store.is_some(),
        "Resolved session"
    );
    Ok(snapshot)
}

/// Keeps a [`SessionSnapshot`] in step with the session pointer.
pub struct SessionResolver {
    user_db: Database,
    app_state: State,
    databases: Arc<StoreDatabaseCache>,
}

impl SessionResolver {
    pub fn new(user_db: Database, app_state: State, databases: Arc<StoreDatabaseCache>) -> Self {
        Self {
            user_db,
            app_state,
            databases,
        }
    }

    /// Resolve the current pointer, then keep resolving in the background.
    ///
    /// The background task ends once every [`SessionHandle`] is dropped.
    pub async fn start(self) -> Result<SessionHandle> {
        // Subscribe before the first read so no write is missed.
        let changes = self.app_state.subscribe();
        let first = self.resolve_current().await?;
        let (tx, rx) = watch::channel(Arc::new(first));

        tokio::spawn(self.run(changes, tx));
        Ok(SessionHandle { rx })
    }

    async fn resolve_current(&self) -> Result<SessionSnapshot> {
        let pointer = self
            .app_state
            .get::<SessionPointer>(CURRENT)
            .await?
            .unwrap_or_default();
        resolve(&self.user_db, &self.databases, pointer).await
    }

    async fn run(
        self,
        mut changes: watch::Receiver<u64>,
        tx: watch::Sender<Arc<SessionSnapshot>>,
    ) {
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tx.closed() => break,
            }
            let revision = *changes.borrow_and_update();

            match self.resolve_current().await {
                Ok(snapshot) => {
                    tx.send_replace(Arc::new(snapshot));
                }
                Err(err) => {
                    error!(revision, error = %err, "Failed to resolve session");
                }
            }
        }
        debug!("Session resolver stopped");
    }
}

/// Read side of a running [`SessionResolver`].
#[derive(Clone, Debug)]
pub struct SessionHandle {
    rx: watch::Receiver<Arc<SessionSnapshot>>,
}

impl SessionHandle {
    /// The latest published snapshot.
    pub fn current(&self) -> Arc<SessionSnapshot> {
        self.rx.borrow().clone()
    }

    /// A receiver woken on every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.rx.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    ///
    /// Returns immediately if the current one already does.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<Arc<SessionSnapshot>> {
        let mut rx = self.rx.clone();
        let snapshot = rx
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| SessionError::ResolverStopped)?;
        Ok(snapshot.clone())
    }
}
