//! Pipeline builder.

use super::Pipeline;
use crate::core::EmitterInfo;
use crate::events::{EventSink, LoggingEventSink};
use crate::observability::{Instrumentation, InstrumentationConfig};
use crate::store::{self, Store};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Default)]
enum LoggerChoice {
    #[default]
    Default,
    Sink(Arc<dyn EventSink>),
    Disabled,
}

/// Builder for [`Pipeline`].
///
/// A pipeline with no explicit store takes the process-wide default store
/// at build time; later changes to the default do not affect it.
#[derive(Clone, Default)]
pub struct PipelineBuilder {
    description: Option<String>,
    store: Option<Arc<dyn Store>>,
    logger: LoggerChoice,
    instrumentation: InstrumentationConfig,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("description", &self.description)
            .field("has_store", &self.store.is_some())
            .field("instrumentation", &self.instrumentation)
            .finish_non_exhaustive()
    }
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a free-text description used to correlate log events.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the store, overriding the process-wide default.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn logger(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.logger = LoggerChoice::Sink(sink);
        self
    }

    /// Builds without any event sink.
    #[must_use]
    pub fn without_logger(mut self) -> Self {
        self.logger = LoggerChoice::Disabled;
        self
    }

    /// Sets the levels used for instrumentation events.
    #[must_use]
    pub fn instrumentation(mut self, config: InstrumentationConfig) -> Self {
        self.instrumentation = config;
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        let sink: Option<Arc<dyn EventSink>> = match self.logger {
            LoggerChoice::Default => Some(Arc::new(LoggingEventSink::new())),
            LoggerChoice::Sink(sink) => Some(sink),
            LoggerChoice::Disabled => None,
        };
        let store = self.store.or_else(store::default_store);
        let instrumentation = Instrumentation::new(
            EmitterInfo::new(self.description, Uuid::new_v4()),
            sink,
            self.instrumentation,
        );

        Pipeline::from_parts(store, instrumentation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;

    #[test]
    fn test_builder_defaults() {
        let pipeline = PipelineBuilder::new().build();
        assert_eq!(pipeline.description(), None);
        assert!(pipeline.logger().is_some());
    }

    #[test]
    fn test_builder_description_and_logger() {
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = PipelineBuilder::new()
            .description("daily totals")
            .logger(sink)
            .build();
        assert_eq!(pipeline.description(), Some("daily totals"));
        assert!(pipeline.logger().is_some());
    }

    #[test]
    fn test_builder_without_logger() {
        let pipeline = PipelineBuilder::new().without_logger().build();
        assert!(pipeline.logger().is_none());
    }

    #[test]
    fn test_each_pipeline_has_its_own_id() {
        let a = PipelineBuilder::new().build();
        let b = PipelineBuilder::new().build();
        assert_ne!(a.id(), b.id());
    }
}
