//! The data-store collaborator.
//!
//! The engine never interprets payloads. A [`Store`] executes them and
//! returns rows; its errors propagate verbatim through the pipeline.
//!
//! A process-wide default store may be set once and is picked up by every
//! pipeline built afterwards that does not name its own store.

use crate::core::{ResultSet, Value};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a store while executing a payload.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    /// What went wrong.
    pub message: String,
    /// The store-specific cause, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl StoreError {
    /// Creates a store error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a store error wrapping a driver error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The store does not implement parameter binding.
    #[must_use]
    pub fn binding_unsupported() -> Self {
        Self::new("store does not support parameter binding")
    }
}

/// Executes payloads against a data store.
///
/// Implementations own connection lifecycle, dialect and transactions.
/// The engine calls them from a single thread, one operation at a time.
#[cfg_attr(test, mockall::automock)]
pub trait Store: Send + Sync {
    /// Executes a textual payload and returns its rows.
    fn execute(&self, payload: &str) -> Result<ResultSet, StoreError>;

    /// Executes a payload with bound parameters.
    ///
    /// Stores that cannot bind parameters keep the default, which fails.
    fn execute_with_params(&self, payload: &str, params: &[Value]) -> Result<ResultSet, StoreError> {
        let _ = (payload, params);
        Err(StoreError::binding_unsupported())
    }
}

static DEFAULT_STORE: RwLock<Option<Arc<dyn Store>>> = RwLock::new(None);

/// Sets the process-wide default store.
pub fn set_default_store(store: Arc<dyn Store>) {
    *DEFAULT_STORE.write() = Some(store);
}

/// Clears the process-wide default store.
pub fn clear_default_store() {
    *DEFAULT_STORE.write() = None;
}

/// Gets the process-wide default store, if one is set.
pub fn default_store() -> Option<Arc<dyn Store>> {
    DEFAULT_STORE.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoStore;

    impl Store for EchoStore {
        fn execute(&self, payload: &str) -> Result<ResultSet, StoreError> {
            Ok(ResultSet::scalar_row("payload", payload))
        }
    }

    #[test]
    fn test_params_unsupported_by_default() {
        let err = EchoStore.execute_with_params("SELECT ?", &[Value::Integer(1)]).unwrap_err();
        assert_eq!(err.message, "store does not support parameter binding");
    }

    #[test]
    fn test_store_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        let err = StoreError::with_source("connection lost", io);
        assert_eq!(err.to_string(), "connection lost");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_mock_store_is_object_safe() {
        let mut mock = MockStore::new();
        mock.expect_execute()
            .returning(|_| Ok(ResultSet::scalar_row("n", 1_i64)));
        let store: Arc<dyn Store> = Arc::new(mock);
        assert_eq!(store.execute("SELECT 1").unwrap().scalar("n"), Value::Integer(1));
    }
}
