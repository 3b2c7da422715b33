//! Session mutators.
//!
//! Every action only writes the session pointer. The running
//! [`super::SessionResolver`] notices the write and publishes the new
//! snapshot; actions never touch derived state themselves.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    Result,
    config::AppConfig,
    constants::CURRENT,
    database::{Database, State},
    identity::LocalID,
    merge,
    models::{RemoteStore, SessionPointer, Site, Store, User, WpCredentials},
    navigator::Navigator,
};

/// Login, logout and store switching.
#[derive(Clone)]
pub struct SessionActions {
    user_db: Database,
    app_state: State,
    user: User,
    config: AppConfig,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for SessionActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionActions")
            .field("user_db", &self.user_db)
            .field("user", &self.user.uuid)
            .field("platform", &self.config.platform)
            .finish()
    }
}

impl SessionActions {
    pub fn new(
        user_db: Database,
        app_state: State,
        user: User,
        config: AppConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            user_db,
            app_state,
            user,
            config,
            navigator,
        }
    }

    /// The stored pointer, if any.
    pub async fn current_pointer(&self) -> Result<Option<SessionPointer>> {
        self.app_state.get(CURRENT).await
    }

    /// Make `site_id`, `credentials_id` and `store_id` current, replacing
    /// the whole pointer.
    #[instrument(skip(self))]
    pub async fn login(&self, site_id: &str, credentials_id: &str, store_id: &str) -> Result<()> {
        let pointer = SessionPointer::new(site_id, credentials_id, store_id);
        self.app_state.set(CURRENT, &pointer).await?;
        info!("Logged in");
        Ok(())
    }

    /// Make `store` current, keeping site and credentials.
    #[instrument(skip_all, fields(store = %store.local_id))]
    pub async fn switch_store(&self, store: &Store) -> Result<()> {
        let pointer = self
            .current_pointer()
            .await?
            .unwrap_or_default()
            .with_store(store.local_id.as_str());
        self.app_state.set(CURRENT, &pointer).await
    }

    /// Clear the pointer. Web deployments then leave for the logout URL.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.app_state.remove(CURRENT).await?;
        info!("Logged out");

        if self.config.platform.is_web() {
            match &self.config.logout_url {
                Some(url) => self.navigator.navigate(url.clone()),
                None => warn!("No logout URL configured"),
            }
        }
        Ok(())
    }

    /// Store a fresh login and reconcile its stores.
    ///
    /// The site and credentials are upserted. Stores already linked to the
    /// credentials stay linked until the merge decides otherwise.
    ///
    /// # Returns
    /// The local IDs now linked to the credentials, in remote order.
    #[instrument(skip_all, fields(site = %site.uuid, credentials = %credentials.uuid))]
    pub async fn link_credentials(
        &self,
        site: &Site,
        credentials: &WpCredentials,
        remote_stores: &[RemoteStore],
    ) -> Result<Vec<LocalID>> {
        self.user_db.sites().upsert(site).await?;

        let mut credentials = credentials.clone();
        if let Some(existing) = self
            .user_db
            .wp_credentials()
            .find_by_id(&credentials.uuid)
            .await?
        {
            credentials.stores = existing.stores;
        }
        self.user_db.wp_credentials().upsert(&credentials).await?;

        merge::merge_stores(
            &self.user_db,
            &credentials,
            remote_stores,
            &self.user,
            &site.uuid,
        )
        .await
    }
}
