//! Structured events recorded by a pipeline.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Placeholder used when a pipeline has no description.
pub const NO_DESCRIPTION: &str = "no description given";

/// What an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// An operation is about to be executed.
    QueryStart,
    /// An operation finished executing.
    QueryComplete,
    /// A free-form message from a hook or the engine.
    Generic,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryStart => write!(f, "query_start"),
            Self::QueryComplete => write!(f, "query_complete"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Identity of the pipeline that emitted an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterInfo {
    /// The pipeline's description.
    pub description: Option<String>,
    /// Token unique to the pipeline instance.
    pub id: Uuid,
}

impl EmitterInfo {
    /// Creates emitter info.
    #[must_use]
    pub fn new(description: Option<String>, id: Uuid) -> Self {
        Self { description, id }
    }

    /// The description, or a placeholder when there is none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }
}

/// An event recorded to an [`EventSink`](crate::events::EventSink).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlEvent {
    /// The event kind.
    pub kind: EventKind,

    /// The pipeline that emitted the event.
    pub emitter: EmitterInfo,

    /// When the event occurred (RFC 3339).
    pub timestamp: String,

    /// The operation payload, for query events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// Elapsed wall-clock seconds, for completion events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_secs: Option<f64>,

    /// Message text, for generic events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Extra structured fields.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, serde_json::Value>,
}

impl EtlEvent {
    fn new(kind: EventKind, emitter: EmitterInfo) -> Self {
        Self {
            kind,
            emitter,
            timestamp: Utc::now().to_rfc3339(),
            payload: None,
            runtime_secs: None,
            message: None,
            data: HashMap::new(),
        }
    }

    /// Creates a "query_start" event.
    #[must_use]
    pub fn query_start(emitter: EmitterInfo, payload: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::QueryStart, emitter);
        event.payload = Some(payload.into());
        event
    }

    /// Creates a "query_complete" event.
    #[must_use]
    pub fn query_complete(emitter: EmitterInfo, payload: impl Into<String>, elapsed: Duration) -> Self {
        let mut event = Self::new(EventKind::QueryComplete, emitter);
        event.payload = Some(payload.into());
        event.runtime_secs = Some(elapsed.as_secs_f64());
        event
    }

    /// Creates a generic message event.
    #[must_use]
    pub fn generic(emitter: EmitterInfo, message: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::Generic, emitter);
        event.message = Some(message.into());
        event
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// `<kind> for "<description>" (object <id>)`.
    #[must_use]
    pub fn lead_in(&self) -> String {
        format!(
            "{} for \"{}\" (object {})",
            self.kind,
            self.emitter.display_name(),
            self.emitter.id
        )
    }

    /// Human-readable single record: the lead-in followed by the payload,
    /// the runtime, or the message depending on the kind.
    #[must_use]
    pub fn format_line(&self) -> String {
        let lead_in = self.lead_in();
        match self.kind {
            EventKind::QueryStart => {
                format!("{lead_in}\n{}", self.payload.as_deref().unwrap_or_default())
            }
            EventKind::QueryComplete => {
                format!("{lead_in} runtime: {}s", self.runtime_secs.unwrap_or_default())
            }
            EventKind::Generic => {
                format!("{lead_in}: {}", self.message.as_deref().unwrap_or_default())
            }
        }
    }

    /// Converts the event to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }
}
