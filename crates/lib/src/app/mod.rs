//! The application-lifetime container.
//!
//! `App` owns everything that must exist exactly once per process: the
//! hydration run, the store database cache and the session resolver. It is
//! a cheap-to-clone handle, so UI mount points can each hold one and still
//! share a single bootstrap.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use handle_trait::Handle;
use tokio::{sync::watch, task::AbortHandle};
use tracing::{debug, info};

use crate::{
    Error, Result,
    backend::DatabaseFactory,
    config::AppConfig,
    hydration::{
        HydrationContext, HydrationEngine, HydrationError, HydrationProgress, HydrationStep,
        InitialProps, default_steps,
    },
    navigator::{Navigator, NoopNavigator},
    session::{SessionActions, SessionHandle, SessionResolver, StoreDatabaseCache},
};


/// Outcome of a hydration run, shared by every caller.
pub type HydrationResult = std::result::Result<Arc<HydrationContext>, Arc<Error>>;

type SharedHydration = Shared<BoxFuture<'static, HydrationResult>>;

/// A started run: its shared outcome and the task computing it.
#[derive(Clone)]
struct HydrationRun {
    id: u64,
    outcome: SharedHydration,
    task: AbortHandle,
}

struct AppInner {
    config: AppConfig,
    factory: Arc<dyn DatabaseFactory>,
    navigator: Arc<dyn Navigator>,
    steps: Vec<Arc<dyn HydrationStep>>,
    progress: Arc<watch::Sender<HydrationProgress>>,
    /// The cached run. Created on first request, cleared only by `reset`.
    hydration: Mutex<Option<HydrationRun>>,
    next_run: AtomicU64,
    session: tokio::sync::Mutex<Option<SessionHandle>>,
    store_dbs: Arc<StoreDatabaseCache>,
}

impl std::fmt::Debug for AppInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppInner")
            .field("config", &self.config)
            .field("factory", &"<DatabaseFactory>")
            .field("steps", &format!("<{} steps>", self.steps.len()))
            .field("progress", &*self.progress.borrow())
            .finish()
    }
}

/// Handle to the running application.
///
/// ## Example
///
/// ```
/// # use tillpoint::{App, AppConfig, backend::InMemoryFactory};
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() -> tillpoint::Result<()> {
/// let app = App::new(AppConfig::default(), Arc::new(InMemoryFactory::new()));
///
/// let ctx = app.context().await?;
/// assert!(ctx.user.is_some());
///
/// let session = app.session().await?;
/// assert!(session.current().store.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Handle)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    /// An app with the stock pipeline and no URL bar.
    pub fn new(config: AppConfig, factory: Arc<dyn DatabaseFactory>) -> Self {
        Self::builder(config, factory).build()
    }

    pub fn builder(config: AppConfig, factory: Arc<dyn DatabaseFactory>) -> AppBuilder {
        AppBuilder {
            config,
            factory,
            navigator: Arc::new(NoopNavigator),
            props: None,
            steps: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn factory(&self) -> &Arc<dyn DatabaseFactory> {
        &self.inner.factory
    }

    /// Run the bootstrap pipeline, or join the run already started.
    ///
    /// The first call spawns the run; every later or concurrent call awaits
    /// the same shared future. A failed run stays failed until [`reset`].
    ///
    /// [`reset`]: Self::reset
    pub async fn hydrate(&self) -> HydrationResult {
        let run = {
            let mut slot = self.inner.hydration.lock().unwrap();
            slot.get_or_insert_with(|| self.start_hydration())
                .outcome
                .clone()
        };
        run.await
    }

    fn start_hydration(&self) -> HydrationRun {
        let id = self.inner.next_run.fetch_add(1, Ordering::Relaxed);
        info!(run = id, steps = self.inner.steps.len(), "Starting hydration");
        let engine =
            HydrationEngine::with_progress(self.inner.steps.clone(), self.inner.progress.clone());
        let task = tokio::spawn(async move { engine.run().await });
        let abort = task.abort_handle();

        let outcome = async move {
            match task.await {
                Ok(Ok(ctx)) => Ok(Arc::new(ctx)),
                Ok(Err(err)) => Err(Arc::new(err)),
                Err(join) => Err(Arc::new(
                    HydrationError::Aborted {
                        reason: join.to_string(),
                    }
                    .into(),
                )),
            }
        }
        .boxed()
        .shared();

        HydrationRun {
            id,
            outcome,
            task: abort,
        }
    }

    /// Progress of the current or next hydration run.
    pub fn hydration_progress(&self) -> watch::Receiver<HydrationProgress> {
        self.inner.progress.subscribe()
    }

    /// Forget the cached run and session so the next [`hydrate`] starts
    /// over.
    ///
    /// A run still in flight is cancelled, and `reset` returns only once its
    /// task has stopped, so it can no longer publish progress or write to
    /// the user database next to the new run. Callers still waiting on it
    /// get [`HydrationError::Aborted`].
    ///
    /// [`hydrate`]: Self::hydrate
    pub async fn reset(&self) {
        let run = self.inner.hydration.lock().unwrap().clone();
        if let Some(run) = run {
            run.task.abort();
            // The outcome resolves after the task's future is dropped.
            let _ = run.outcome.await;

            let mut slot = self.inner.hydration.lock().unwrap();
            if slot.as_ref().is_some_and(|current| current.id == run.id) {
                slot.take();
            }
        }
        self.inner.session.lock().await.take();
        self.inner.progress.send_replace(HydrationProgress::default());
        debug!("Hydration reset");
    }

    /// [`hydrate`](Self::hydrate), with the shared error wrapped.
    pub async fn context(&self) -> Result<Arc<HydrationContext>> {
        self.hydrate()
            .await
            .map_err(|source| HydrationError::Failed { source }.into())
    }

    /// The session handle, starting the resolver on first use.
    pub async fn session(&self) -> Result<SessionHandle> {
        let mut session = self.inner.session.lock().await;
        if let Some(handle) = session.as_ref() {
            return Ok(handle.clone());
        }

        let ctx = self.context().await?;
        let user_db = ctx.require_user_db("session")?.clone();
        let app_state = ctx.require_app_state("session")?.clone();
        let handle = SessionResolver::new(user_db, app_state, self.inner.store_dbs.clone())
            .start()
            .await?;
        *session = Some(handle.clone());
        Ok(handle)
    }

    /// Session mutators bound to the hydrated user database.
    pub async fn actions(&self) -> Result<SessionActions> {
        let ctx = self.context().await?;
        Ok(SessionActions::new(
            ctx.require_user_db("actions")?.clone(),
            ctx.require_app_state("actions")?.clone(),
            ctx.require_user("actions")?.clone(),
            self.inner.config.clone(),
            self.inner.navigator.clone(),
        ))
    }

    /// Per-store databases opened so far.
    pub fn store_databases(&self) -> &Arc<StoreDatabaseCache> {
        &self.inner.store_dbs
    }

    /// Persist every opened database.
    pub async fn flush(&self) -> Result<()> {
        self.inner.factory.flush().await
    }
}

/// Configures an [`App`] before it starts.
pub struct AppBuilder {
    config: AppConfig,
    factory: Arc<dyn DatabaseFactory>,
    navigator: Arc<dyn Navigator>,
    props: Option<InitialProps>,
    steps: Option<Vec<Arc<dyn HydrationStep>>>,
}

impl AppBuilder {
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Server-injected bootstrap payload for web deployments.
    pub fn initial_props(mut self, props: InitialProps) -> Self {
        self.props = Some(props);
        self
    }

    /// Replace the stock pipeline.
    pub fn steps(mut self, steps: Vec<Arc<dyn HydrationStep>>) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn build(self) -> App {
        let steps = match self.steps {
            Some(steps) => steps,
            None => default_steps(
                &self.config,
                self.factory.clone(),
                self.navigator.clone(),
                self.props,
            ),
        };
        let (progress, _) = watch::channel(HydrationProgress::default());
        let store_dbs = Arc::new(StoreDatabaseCache::new(
            self.factory.clone(),
            self.config.clone(),
        ));

        App {
            inner: Arc::new(AppInner {
                config: self.config,
                factory: self.factory,
                navigator: self.navigator,
                steps,
                progress: Arc::new(progress),
                hydration: Mutex::new(None),
                next_run: AtomicU64::new(0),
                session: tokio::sync::Mutex::new(None),
                store_dbs,
            }),
        }
    }
}
