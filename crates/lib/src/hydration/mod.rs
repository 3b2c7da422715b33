//! The bootstrap pipeline.
//!
//! A [`HydrationEngine`] runs an ordered list of [`HydrationStep`]s once.
//! Steps run strictly one after another, each seeing the context produced
//! by the steps before it. A step whose [`should_execute`] is false is
//! skipped and contributes no progress, so a run with skipped steps ends
//! below 100. The first failing step ends the run.
//!
//! Running the pipeline only once per process is the job of [`crate::App`],
//! which caches the run's shared future.
//!
//! [`should_execute`]: HydrationStep::should_execute

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span, instrument};

use crate::Result;

pub mod context;
pub mod errors;
pub mod initial_props;
pub mod steps;

pub use context::{ContextKey, HydrationContext};
pub use errors::HydrationError;
pub use initial_props::{InitialProps, InitialPropsReconciler};
pub use steps::{InitUserDatabase, LoadSession, default_steps};

/// Message published once every step has run.
pub const COMPLETED_MESSAGE: &str = "Ready";

/// One stage of the bootstrap pipeline.
#[async_trait]
pub trait HydrationStep: Send + Sync {
    /// Stable identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Human readable status shown while the step runs.
    fn message(&self) -> &str;

    /// Progress added once the step completes.
    fn progress_weight(&self) -> u32;

    /// Context entries that must exist before the step runs.
    fn requires(&self) -> &[ContextKey] {
        &[]
    }

    /// Whether to run the step at all.
    fn should_execute(&self, _ctx: &HydrationContext) -> bool {
        true
    }

    /// Run the step. The returned partial context is merged into the
    /// running one.
    async fn execute(&self, ctx: &HydrationContext) -> Result<HydrationContext>;
}

/// Lifecycle of a pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HydrationState {
    #[default]
    NotStarted,
    Running {
        step_index: usize,
    },
    Completed,
    Failed {
        step_index: usize,
    },
}

impl HydrationState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            HydrationState::Completed | HydrationState::Failed { .. }
        )
    }
}

/// Snapshot published on the progress channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HydrationProgress {
    pub state: HydrationState,
    /// Sum of the weights of the steps completed so far.
    pub progress: u32,
    /// Message of the step most recently started, or
    /// [`COMPLETED_MESSAGE`] once the run completes.
    pub message: String,
}

/// Runs a fixed list of steps in order.
pub struct HydrationEngine {
    steps: Vec<Arc<dyn HydrationStep>>,
    progress: Arc<watch::Sender<HydrationProgress>>,
}

impl HydrationEngine {
    pub fn new(steps: Vec<Arc<dyn HydrationStep>>) -> Self {
        let (progress, _) = watch::channel(HydrationProgress::default());
        Self::with_progress(steps, Arc::new(progress))
    }

    /// Publish progress on an existing channel.
    pub fn with_progress(
        steps: Vec<Arc<dyn HydrationStep>>,
        progress: Arc<watch::Sender<HydrationProgress>>,
    ) -> Self {
        Self { steps, progress }
    }

    pub fn subscribe(&self) -> watch::Receiver<HydrationProgress> {
        self.progress.subscribe()
    }

    /// Run every step and return the accumulated context.
    #[instrument(skip_all, fields(steps = self.steps.len()))]
    pub async fn run(&self) -> Result<HydrationContext> {
        let mut ctx = HydrationContext::default();
        let mut progress = 0;

        for (step_index, step) in self.steps.iter().enumerate() {
            if !step.should_execute(&ctx) {
                debug!(step = step.name(), "Skipping hydration step");
                continue;
            }

            self.publish(
                HydrationState::Running { step_index },
                progress,
                step.message(),
            );

            if let Some(key) = ctx.first_missing(step.requires()) {
                error!(step = step.name(), %key, "Hydration step is missing context");
                self.publish(HydrationState::Failed { step_index }, progress, step.message());
                return Err(HydrationError::ContextMissing {
                    step: step.name().to_string(),
                    key,
                }
                .into());
            }

            let span = info_span!("hydration_step", step = step.name());
            match step.execute(&ctx).instrument(span).await {
                Ok(update) => ctx.merge(update),
                Err(err) => {
                    error!(step = step.name(), error = %err, "Hydration step failed");
                    self.publish(HydrationState::Failed { step_index }, progress, step.message());
                    return Err(err);
                }
            }

            progress += step.progress_weight();
            info!(step = step.name(), progress, "Hydration step completed");
            self.publish(
                HydrationState::Running { step_index },
                progress,
                step.message(),
            );
        }

        self.publish(HydrationState::Completed, progress, COMPLETED_MESSAGE);
        info!(progress, "Hydration completed");
        Ok(ctx)
    }

    fn publish(&self, state: HydrationState, progress: u32, message: &str) {
        self.progress.send_replace(HydrationProgress {
            state,
            progress,
            message: message.to_string(),
        });
    }
}
