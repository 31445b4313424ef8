//! Event sinks for pipeline instrumentation.
//!
//! A pipeline records its `query_start`, `query_complete` and generic
//! events to an [`EventSink`]. A pipeline without a sink still executes
//! everything; instrumentation becomes a pass-through.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
