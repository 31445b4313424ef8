//! Timing and logging around every operation a pipeline executes.

use crate::core::{EmitterInfo, EtlEvent};
use crate::events::EventSink;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Level;

/// Serializable log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace.
    Trace,
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Levels at which instrumentation records its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Level for `query_start` events.
    #[serde(default = "default_start_level")]
    pub start_level: LogLevel,
    /// Level for `query_complete` events.
    #[serde(default = "default_complete_level")]
    pub complete_level: LogLevel,
}

fn default_start_level() -> LogLevel {
    LogLevel::Debug
}

fn default_complete_level() -> LogLevel {
    LogLevel::Info
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            start_level: default_start_level(),
            complete_level: default_complete_level(),
        }
    }
}

impl InstrumentationConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start level.
    #[must_use]
    pub fn with_start_level(mut self, level: LogLevel) -> Self {
        self.start_level = level;
        self
    }

    /// Sets the complete level.
    #[must_use]
    pub fn with_complete_level(mut self, level: LogLevel) -> Self {
        self.complete_level = level;
        self
    }
}

/// Simple wall-clock timer.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
}

impl SpanTimer {
    /// Starts a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the elapsed time.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

/// Wraps operations with start/complete events.
///
/// Payloads are never inspected or changed, and results pass through
/// untouched. A failed operation records no completion event; its error
/// is returned as-is.
#[derive(Clone)]
pub struct Instrumentation {
    emitter: EmitterInfo,
    sink: Option<Arc<dyn EventSink>>,
    config: InstrumentationConfig,
}

impl std::fmt::Debug for Instrumentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrumentation")
            .field("emitter", &self.emitter)
            .field("has_sink", &self.sink.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Instrumentation {
    /// Creates instrumentation for one emitter.
    #[must_use]
    pub fn new(
        emitter: EmitterInfo,
        sink: Option<Arc<dyn EventSink>>,
        config: InstrumentationConfig,
    ) -> Self {
        Self {
            emitter,
            sink,
            config,
        }
    }

    /// The emitter identity attached to every event.
    #[must_use]
    pub fn emitter(&self) -> &EmitterInfo {
        &self.emitter
    }

    /// Returns the sink, if any.
    #[must_use]
    pub fn sink(&self) -> Option<&Arc<dyn EventSink>> {
        self.sink.as_ref()
    }

    /// Replaces the sink.
    pub fn set_sink(&mut self, sink: Option<Arc<dyn EventSink>>) {
        self.sink = sink;
    }

    /// Updates the description carried by future events.
    pub fn set_description(&mut self, description: Option<String>) {
        self.emitter.description = description;
    }

    /// Runs `op`, recording a start event before and a completion event
    /// with the elapsed time after.
    pub fn time_and_log<T, E>(
        &self,
        payload: &str,
        op: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let timer = SpanTimer::start();
        self.record(
            self.config.start_level,
            || EtlEvent::query_start(self.emitter.clone(), payload),
        );

        let result = op()?;

        self.record(self.config.complete_level, || {
            EtlEvent::query_complete(self.emitter.clone(), payload, timer.elapsed())
        });
        Ok(result)
    }

    /// Records a generic message at info level.
    pub fn info(&self, message: &str) {
        self.record(LogLevel::Info, || EtlEvent::generic(self.emitter.clone(), message));
    }

    /// Records a generic message at debug level.
    pub fn debug(&self, message: &str) {
        self.record(LogLevel::Debug, || EtlEvent::generic(self.emitter.clone(), message));
    }

    fn record(&self, level: LogLevel, build: impl FnOnce() -> EtlEvent) {
        if let Some(sink) = &self.sink {
            sink.record(level.into(), &build());
        }
    }
}
