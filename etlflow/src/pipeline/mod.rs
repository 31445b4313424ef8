//! Pipeline composition and execution.
//!
//! This module provides:
//! - The [`Pipeline`] and its builder
//! - The per-stage hook registry
//! - Memoized start/step/stop resolution
//! - The window loop that drives the transform stage

mod builder;
mod iteration;
mod options;
mod registry;
mod resolver;

pub use builder::PipelineBuilder;
pub use iteration::{IntoBound, IntoStep, IterationControls, Window, Windows};
pub use options::RunOptions;
pub use registry::{StageHook, StageRegistry};
pub use resolver::{ControlHook, MemoizedResolver, ResolverState};

use crate::core::{BoundaryValue, IterationControl, ResultSet, Stage, Step, Value};
use crate::errors::{ConfigurationError, EtlResult};
use crate::events::EventSink;
use crate::observability::Instrumentation;
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// One batch job: four ordered stages plus optional windowed iteration of
/// the transform stage.
///
/// A pipeline is configured, run, and discarded. Resolved iteration bounds
/// are cached for the life of the instance, so running it again reuses
/// them; build a new pipeline to get fresh bounds.
///
/// ```rust,ignore
/// let mut etl = Pipeline::builder()
///     .description("copy source rows by id")
///     .store(store)
///     .build();
///
/// etl.ensure_destination(|etl| {
///     etl.query("CREATE TABLE IF NOT EXISTS dest (id INT, amount INT)")?;
///     Ok(())
/// })
/// .start(|etl| etl.query("SELECT COALESCE(MAX(id), 0) AS s FROM dest").map(|r| r.scalar("s")))
/// .step(|_| Ok(1))
/// .stop(|etl| etl.query("SELECT MAX(id) AS s FROM source").map(|r| r.scalar("s")))
/// .etl(|etl, window| {
///     let w = window.expect("iterating");
///     etl.query(&format!(
///         "REPLACE INTO dest SELECT id, amount FROM source WHERE id >= {} AND id < {}",
///         w.lower(),
///         w.upper()
///     ))?;
///     Ok(())
/// });
///
/// etl.run()?;
/// ```
pub struct Pipeline {
    store: Option<Arc<dyn Store>>,
    instrumentation: Instrumentation,
    stages: StageRegistry,
    controls: IterationControls,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id())
            .field("description", &self.description())
            .field("has_store", &self.store.is_some())
            .field("stages", &self.stages)
            .field("controls", &self.controls)
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Creates a pipeline with the default store and a logging sink.
    #[must_use]
    pub fn new() -> Self {
        PipelineBuilder::new().build()
    }

    /// Starts building a pipeline.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub(crate) fn from_parts(store: Option<Arc<dyn Store>>, instrumentation: Instrumentation) -> Self {
        Self {
            store,
            instrumentation,
            stages: StageRegistry::new(),
            controls: IterationControls::new(),
        }
    }

    /// Applies a configuration closure and returns the pipeline.
    #[must_use]
    pub fn configure(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }

    /// Identity token of this instance, carried by every event.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.instrumentation.emitter().id
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.instrumentation.emitter().description.as_deref()
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.instrumentation.set_description(Some(description.into()));
    }

    /// The store queries execute against.
    #[must_use]
    pub fn store(&self) -> Option<&Arc<dyn Store>> {
        self.store.as_ref()
    }

    /// Replaces the store.
    pub fn set_store(&mut self, store: Arc<dyn Store>) {
        self.store = Some(store);
    }

    /// The event sink, if any.
    #[must_use]
    pub fn logger(&self) -> Option<&Arc<dyn EventSink>> {
        self.instrumentation.sink()
    }

    /// Replaces the event sink. `None` disables instrumentation events.
    pub fn set_logger(&mut self, sink: Option<Arc<dyn EventSink>>) {
        self.instrumentation.set_sink(sink);
    }

    /// The stage hooks.
    #[must_use]
    pub fn stages(&self) -> &StageRegistry {
        &self.stages
    }

    // ---- stage registration ----

    /// Registers the hook for any stage.
    pub fn register<F>(&mut self, stage: Stage, hook: F) -> &mut Self
    where
        F: Fn(&Self, Option<&Window>) -> EtlResult<()> + Send + Sync + 'static,
    {
        self.stages.set(stage, Arc::new(hook));
        self
    }

    /// Registers the `ensure_destination` hook.
    pub fn ensure_destination<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self) -> EtlResult<()> + Send + Sync + 'static,
    {
        self.register(Stage::EnsureDestination, move |p, _| hook(p))
    }

    /// Registers the `before_etl` hook.
    pub fn before_etl<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self) -> EtlResult<()> + Send + Sync + 'static,
    {
        self.register(Stage::BeforeEtl, move |p, _| hook(p))
    }

    /// Registers the transform hook.
    ///
    /// The window is `Some` once per window while iterating and `None` when
    /// the transform runs a single time.
    pub fn etl<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self, Option<&Window>) -> EtlResult<()> + Send + Sync + 'static,
    {
        self.register(Stage::Etl, hook)
    }

    /// Registers the `after_etl` hook.
    pub fn after_etl<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self) -> EtlResult<()> + Send + Sync + 'static,
    {
        self.register(Stage::AfterEtl, move |p, _| hook(p))
    }

    // ---- iteration controls ----

    /// Registers the producer of the first window's lower bound.
    pub fn start<F, V>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self) -> EtlResult<V> + Send + Sync + 'static,
        V: IntoBound,
    {
        self.controls.set_start(hook);
        self
    }

    /// Registers the producer of the window size.
    pub fn step<F, V>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self) -> EtlResult<V> + Send + Sync + 'static,
        V: IntoStep,
    {
        self.controls.set_step(hook);
        self
    }

    /// Registers the producer of the last value a window may start at.
    pub fn stop<F, V>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Self) -> EtlResult<V> + Send + Sync + 'static,
        V: IntoBound,
    {
        self.controls.set_stop(hook);
        self
    }

    /// True iff start, step and stop all have hooks.
    #[must_use]
    pub fn is_iterating(&self) -> bool {
        self.controls.is_active()
    }

    /// State of one iteration control.
    #[must_use]
    pub fn control_state(&self, control: IterationControl) -> ResolverState {
        self.controls.state(control)
    }

    /// Resolves start, running its hook at most once per pipeline.
    pub fn resolve_start(&self) -> EtlResult<Option<BoundaryValue>> {
        self.controls.start(self)
    }

    /// Resolves step, running its hook at most once per pipeline.
    pub fn resolve_step(&self) -> EtlResult<Option<Step>> {
        self.controls.step(self)
    }

    /// Resolves stop, running its hook at most once per pipeline.
    pub fn resolve_stop(&self) -> EtlResult<Option<BoundaryValue>> {
        self.controls.stop(self)
    }

    // ---- execution ----

    /// Runs every stage in order.
    pub fn run(&self) -> EtlResult<()> {
        self.run_with(&RunOptions::default())
    }

    /// Runs every stage not excluded by `options`, in order.
    ///
    /// Stops at the first error; later stages do not run and nothing is
    /// rolled back.
    pub fn run_with(&self, options: &RunOptions) -> EtlResult<()> {
        for stage in options.stages() {
            self.invoke(stage)?;
        }
        Ok(())
    }

    /// Invokes one stage's hook. An unregistered stage is a no-op.
    ///
    /// The transform stage iterates over windows when all three iteration
    /// controls are registered.
    pub fn invoke(&self, stage: Stage) -> EtlResult<()> {
        let Some(hook) = self.stages.get(stage) else {
            tracing::trace!(stage = %stage, "no hook registered");
            return Ok(());
        };

        if stage.is_transform() && self.is_iterating() {
            return self.iterate(hook);
        }
        hook(self, None)
    }

    fn iterate(&self, hook: &StageHook) -> EtlResult<()> {
        let Some(windows) = self.controls.windows(self)? else {
            return hook(self, None);
        };

        if let (Some(start), Some(step), Some(stop)) = (
            self.controls.start(self)?,
            self.controls.step(self)?,
            self.controls.stop(self)?,
        ) {
            self.debug(&format!("iterating from {start} to {stop} by {step}"));
        }

        for window in windows {
            hook(self, Some(&window?))?;
        }
        Ok(())
    }

    /// Executes a payload through the store, timed and logged.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is no store, and the
    /// store's own error verbatim when execution fails.
    pub fn query(&self, payload: &str) -> EtlResult<ResultSet> {
        let store = self.require_store()?;
        Ok(self
            .instrumentation
            .time_and_log(payload, || store.execute(payload))?)
    }

    /// Executes a payload with bound parameters, timed and logged.
    pub fn query_with_params(&self, payload: &str, params: &[Value]) -> EtlResult<ResultSet> {
        let store = self.require_store()?;
        Ok(self
            .instrumentation
            .time_and_log(payload, || store.execute_with_params(payload, params))?)
    }

    /// Records a generic message at info level.
    pub fn info(&self, message: &str) {
        self.instrumentation.info(message);
    }

    /// Records a generic message at debug level.
    pub fn debug(&self, message: &str) {
        self.instrumentation.debug(message);
    }

    fn require_store(&self) -> Result<&Arc<dyn Store>, ConfigurationError> {
        self.store.as_ref().ok_or_else(ConfigurationError::no_store)
    }
}
