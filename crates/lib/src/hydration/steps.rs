//! The stock bootstrap steps.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    Result,
    backend::DatabaseFactory,
    config::AppConfig,
    constants::{APP_STATE, CURRENT},
    database::Database,
    models::{SessionPointer, User},
    navigator::Navigator,
};

use super::{
    ContextKey, HydrationContext, HydrationError, HydrationStep, InitialProps,
    InitialPropsReconciler,
};

/// The pipeline a deployment runs at startup:
/// `init-user-database` (20), `initial-props` (20, web only) and
/// `load-session` (60).
pub fn default_steps(
    config: &AppConfig,
    factory: Arc<dyn DatabaseFactory>,
    navigator: Arc<dyn Navigator>,
    props: Option<InitialProps>,
) -> Vec<Arc<dyn HydrationStep>> {
    vec![
        Arc::new(InitUserDatabase::new(factory, &config.user_db_name)),
        Arc::new(InitialPropsReconciler::new(config.platform, props, navigator)),
        Arc::new(LoadSession),
    ]
}

/// Opens the user database, its app state and the singleton user.
pub struct InitUserDatabase {
    factory: Arc<dyn DatabaseFactory>,
    name: String,
}

impl InitUserDatabase {
    pub fn new(factory: Arc<dyn DatabaseFactory>, name: impl Into<String>) -> Self {
        Self {
            factory,
            name: name.into(),
        }
    }

    async fn open(&self) -> Result<(Database, User)> {
        let db = Database::open(self.factory.as_ref(), &self.name).await?;
        let user = match db.users().all().await?.into_iter().next() {
            Some(user) => user,
            None => {
                let user = User::generate();
                db.users().insert(&user).await?;
                info!(user = %user.uuid, "Created local user");
                user
            }
        };
        Ok((db, user))
    }
}

#[async_trait]
impl HydrationStep for InitUserDatabase {
    fn name(&self) -> &str {
        "init-user-database"
    }

    fn message(&self) -> &str {
        "Initializing user database"
    }

    fn progress_weight(&self) -> u32 {
        20
    }

    async fn execute(&self, _ctx: &HydrationContext) -> Result<HydrationContext> {
        let (db, user) = self
            .open()
            .await
            .map_err(|e| HydrationError::DatabaseInit {
                name: self.name.clone(),
                source: Box::new(e),
            })?;
        let app_state = db.add_state(APP_STATE);

        Ok(HydrationContext {
            user_db: Some(db),
            app_state: Some(app_state),
            user: Some(user),
            ..Default::default()
        })
    }
}

/// Reads the persisted session pointer.
pub struct LoadSession;

#[async_trait]
impl HydrationStep for LoadSession {
    fn name(&self) -> &str {
        "load-session"
    }

    fn message(&self) -> &str {
        "Loading session"
    }

    fn progress_weight(&self) -> u32 {
        60
    }

    fn requires(&self) -> &[ContextKey] {
        &[ContextKey::AppState]
    }

    async fn execute(&self, ctx: &HydrationContext) -> Result<HydrationContext> {
        let state = ctx.require_app_state(self.name())?;
        let pointer = state
            .get::<SessionPointer>(CURRENT)
            .await?
            .unwrap_or_default();

        Ok(HydrationContext {
            old_pointer: ctx
                .old_pointer
                .is_none()
                .then(|| pointer.clone()),
            session_pointer: Some(pointer),
            ..Default::default()
        })
    }
}
