//! Error types for the etlflow engine.
//!
//! Every failure propagates fail-fast: nothing in the engine catches and
//! suppresses an error raised by a hook or by the store. The only recovered
//! condition is an unregistered hook, which is a legitimate no-op.

use crate::core::IterationControl;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Code for a watermark column with no recognisable default floor.
pub const NO_FLOOR: &str = "ETL-CONFIG-NO-FLOOR";
/// Code for boundary values of incompatible kinds.
pub const BOUND_MISMATCH: &str = "ETL-CONFIG-BOUND-MISMATCH";
/// Code for a query issued by a pipeline that has no store.
pub const NO_STORE: &str = "ETL-CONFIG-NO-STORE";
/// Code for a stage name that is not one of the four stages.
pub const UNKNOWN_STAGE: &str = "ETL-CONFIG-UNKNOWN-STAGE";

/// Convenience alias used throughout the crate.
pub type EtlResult<T> = Result<T, EtlError>;

/// The main error type for etlflow operations.
#[derive(Debug, Error)]
pub enum EtlError {
    /// The pipeline or one of its helpers was configured incorrectly.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// The store failed while executing a payload.
    #[error("Execution error: {0}")]
    Execution(#[from] StoreError),

    /// A user hook raised an error of its own.
    #[error("Hook error: {0}")]
    Hook(#[from] anyhow::Error),

    /// An iteration control produced a value that cannot serve as a bound.
    #[error("Iteration control '{control}' produced an unusable value: {reason}")]
    UnusableBound {
        /// The control whose hook produced the value.
        control: IterationControl,
        /// Why the value was rejected.
        reason: String,
    },
}

impl EtlError {
    /// Wraps an arbitrary message as a hook error.
    pub fn hook(message: impl std::fmt::Display) -> Self {
        Self::Hook(anyhow::anyhow!("{message}"))
    }

    /// Returns the configuration error, if this is one.
    #[must_use]
    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match self {
            Self::Configuration(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the error came from the store.
    #[must_use]
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

/// Metadata about a configuration error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "ETL-CONFIG-NO-FLOOR").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code));
        map.insert("summary".to_string(), serde_json::json!(self.summary));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        if !self.context.is_empty() {
            map.insert("context".to_string(), serde_json::json!(self.context));
        }

        map
    }
}

/// Error raised when a pipeline or helper is misconfigured.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Configuration error: {message}")]
pub struct ConfigurationError {
    /// The error message.
    pub message: String,
    /// Structured diagnostics.
    pub info: ErrorInfo,
}

impl ConfigurationError {
    /// Creates a configuration error with the given code.
    #[must_use]
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            info: ErrorInfo::new(code, message.clone()),
            message,
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.info = self.info.with_fix_hint(hint);
        self
    }

    /// Adds a context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info = self.info.with_context_entry(key, value);
        self
    }

    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.info.code
    }

    /// No default floor can be derived for a watermark column.
    #[must_use]
    pub fn no_floor(column: &str) -> Self {
        Self::new(NO_FLOOR, format!("could not determine a default for {column}"))
            .with_fix_hint("Pass an explicit default floor for this column.")
            .with_context_entry("column", column)
    }

    /// Two boundary values cannot be combined.
    #[must_use]
    pub fn bound_mismatch(operation: &str, left: &str, right: &str) -> Self {
        Self::new(
            BOUND_MISMATCH,
            format!("cannot {operation} a {left} bound with a {right}"),
        )
        .with_fix_hint("Make start, step and stop produce values of compatible kinds.")
        .with_context_entry("operation", operation)
    }

    /// A query was issued with no store attached.
    #[must_use]
    pub fn no_store() -> Self {
        Self::new(NO_STORE, "pipeline has no store to execute queries against")
            .with_fix_hint("Pass a store to the pipeline builder or set a default store.")
    }

    /// A stage name could not be parsed.
    #[must_use]
    pub fn unknown_stage(name: &str) -> Self {
        Self::new(UNKNOWN_STAGE, format!("unknown stage '{name}'"))
            .with_fix_hint("Use one of: ensure_destination, before_etl, etl, after_etl.")
            .with_context_entry("stage", name)
    }
}
