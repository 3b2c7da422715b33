//! Web bootstrap from server-injected props.
//!
//! A web deployment receives the current site, credentials and remote store
//! list embedded in the page. This step stores them and picks the current
//! store, in order of preference:
//!
//! 1. the store named by the `store` query parameter,
//! 2. the store of the previous session pointer,
//! 3. the first store in the list.
//!
//! The query parameter is consumed once and stripped from the URL.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    Result,
    config::Platform,
    constants::CURRENT,
    identity::{LocalID, resolve_local_id},
    merge::compute_stores,
    models::{RemoteStore, SessionPointer, Site, Store, WpCredentials},
    navigator::{Navigator, take_store_param},
};

use super::{ContextKey, HydrationContext, HydrationStep};

/// The bootstrap payload a web page is served with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialProps {
    pub site: Site,
    pub wp_credentials: WpCredentials,
    #[serde(default)]
    pub stores: Vec<RemoteStore>,
}

pub struct InitialPropsReconciler {
    platform: Platform,
    props: Option<InitialProps>,
    navigator: Arc<dyn Navigator>,
}

impl InitialPropsReconciler {
    pub fn new(
        platform: Platform,
        props: Option<InitialProps>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            platform,
            props,
            navigator,
        }
    }
}

/// Pick the current store out of `stores`.
pub fn select_store<'a>(
    stores: &'a [Store],
    url_store: Option<&LocalID>,
    previous: Option<&str>,
) -> Option<&'a Store> {
    let by_id = |id: &str| stores.iter().find(|s| s.local_id == id);

    url_store
        .and_then(|id| by_id(id.as_str()))
        .or_else(|| previous.and_then(by_id))
        .or_else(|| stores.first())
}

#[async_trait]
impl HydrationStep for InitialPropsReconciler {
    fn name(&self) -> &str {
        "initial-props"
    }

    fn message(&self) -> &str {
        "Loading store"
    }

    fn progress_weight(&self) -> u32 {
        20
    }

    fn requires(&self) -> &[ContextKey] {
        &[ContextKey::UserDb, ContextKey::AppState, ContextKey::User]
    }

    fn should_execute(&self, _ctx: &HydrationContext) -> bool {
        self.platform.is_web() && self.props.is_some()
    }

    async fn execute(&self, ctx: &HydrationContext) -> Result<HydrationContext> {
        let Some(props) = &self.props else {
            return Ok(HydrationContext::default());
        };
        let db = ctx.require_user_db(self.name())?;
        let state = ctx.require_app_state(self.name())?;
        let user = ctx.require_user(self.name())?;
        let site = &props.site;
        let credentials = &props.wp_credentials;

        db.sites().upsert(site).await?;
        db.wp_credentials().upsert(credentials).await?;

        let old = state
            .get::<SessionPointer>(CURRENT)
            .await?
            .unwrap_or_default();

        let url_store = take_store_param(self.navigator.as_ref())
            .map(|id| resolve_local_id(user, &site.uuid, &credentials.uuid, id));

        let stores = compute_stores(&props.stores, user, &site.uuid, &credentials.uuid);
        let selected = select_store(&stores, url_store.as_ref(), old.store_id.as_deref());

        let pointer = SessionPointer {
            site_id: Some(site.uuid.clone()),
            wp_credentials_id: Some(credentials.uuid.clone()),
            store_id: selected.map(|s| s.local_id.to_string()),
        };
        if pointer != old {
            info!(store = ?pointer.store_id, "Updating session pointer from initial props");
            state.set(CURRENT, &pointer).await?;
        } else {
            debug!("Session pointer unchanged");
        }

        db.stores().bulk_insert(&stores).await?;
        let mut fields = Map::new();
        fields.insert(
            "stores".to_string(),
            Value::Array(
                stores
                    .iter()
                    .map(|s| Value::String(s.local_id.to_string()))
                    .collect(),
            ),
        );
        let credentials = db.wp_credentials().patch(&credentials.uuid, fields).await?;

        Ok(HydrationContext {
            site: Some(site.clone()),
            wp_credentials: Some(credentials),
            stores: Some(stores),
            old_pointer: Some(old),
            session_pointer: Some(pointer),
            ..Default::default()
        })
    }
}
