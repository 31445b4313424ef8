//! Event sink trait and implementations.

use crate::core::EtlEvent;
use parking_lot::RwLock;
use tracing::Level;

/// Trait for sinks that receive pipeline events.
///
/// Recording must not fail; sinks swallow their own problems.
pub trait EventSink: Send + Sync {
    /// Records an event at the given level.
    fn record(&self, level: Level, event: &EtlEvent);
}

/// A no-op event sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn record(&self, _level: Level, _event: &EtlEvent) {}
}

/// An event sink that logs events using the tracing framework.
///
/// This is the sink a pipeline gets when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    /// Creates a logging sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LoggingEventSink {
    fn record(&self, level: Level, event: &EtlEvent) {
        let line = event.format_line();
        let kind = event.kind.to_string();
        let emitter_id = event.emitter.id.to_string();

        match level {
            Level::ERROR => tracing::error!(event_type = %kind, emitter = %emitter_id, "{line}"),
            Level::WARN => tracing::warn!(event_type = %kind, emitter = %emitter_id, "{line}"),
            Level::INFO => tracing::info!(event_type = %kind, emitter = %emitter_id, "{line}"),
            Level::DEBUG => tracing::debug!(event_type = %kind, emitter = %emitter_id, "{line}"),
            _ => tracing::trace!(event_type = %kind, emitter = %emitter_id, "{line}"),
        }
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<(Level, EtlEvent)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events with their levels.
    #[must_use]
    pub fn events(&self) -> Vec<(Level, EtlEvent)> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns the payloads of collected `query_start` events, in order.
    #[must_use]
    pub fn started_payloads(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter(|(_, e)| e.kind == crate::core::EventKind::QueryStart)
            .filter_map(|(_, e)| e.payload.clone())
            .collect()
    }
}

impl EventSink for CollectingEventSink {
    fn record(&self, level: Level, event: &EtlEvent) {
        self.events.write().push((level, event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EmitterInfo, EventKind};
    use std::time::Duration;
    use uuid::Uuid;

    fn emitter() -> EmitterInfo {
        EmitterInfo::new(Some("test".to_string()), Uuid::new_v4())
    }

    #[test]
    fn test_noop_sink() {
        NoOpEventSink.record(Level::INFO, &EtlEvent::generic(emitter(), "ignored"));
    }

    #[test]
    fn test_logging_sink_every_level() {
        let sink = LoggingEventSink::new();
        let event = EtlEvent::query_start(emitter(), "SELECT 1");
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            sink.record(level, &event);
        }
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.record(Level::DEBUG, &EtlEvent::query_start(emitter(), "SELECT 1"));
        sink.record(
            Level::INFO,
            &EtlEvent::query_complete(emitter(), "SELECT 1", Duration::from_millis(2)),
        );

        assert_eq!(sink.len(), 2);
        let events = sink.events();
        assert_eq!(events[0].0, Level::DEBUG);
        assert_eq!(events[1].1.kind, EventKind::QueryComplete);
        assert_eq!(sink.started_payloads(), vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn test_collecting_sink_clear() {
        let sink = CollectingEventSink::new();
        sink.record(Level::INFO, &EtlEvent::generic(emitter(), "x"));
        assert_eq!(sink.len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
