//! In-memory store doubles.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::core::{ResultSet, Value};
use crate::store::{Store, StoreError};

type Responder = Arc<dyn Fn(&str) -> Result<ResultSet, StoreError> + Send + Sync>;

/// A store that records every payload and answers through a responder.
///
/// By default every payload succeeds with an empty result set.
#[derive(Clone)]
pub struct RecordingStore {
    responder: Responder,
    fail_on: Option<String>,
    payloads: Arc<Mutex<Vec<String>>>,
    params: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl std::fmt::Debug for RecordingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingStore")
            .field("fail_on", &self.fail_on)
            .field("payloads", &self.payloads.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStore {
    /// Creates a store that answers every payload with no rows.
    #[must_use]
    pub fn new() -> Self {
        Self::with_responder(|_| Ok(ResultSet::empty()))
    }

    /// Creates a store that answers through `responder`.
    #[must_use]
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<ResultSet, StoreError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            fail_on: None,
            payloads: Arc::new(Mutex::new(Vec::new())),
            params: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails any payload containing `fragment`. The payload is still recorded.
    #[must_use]
    pub fn fail_on(mut self, fragment: impl Into<String>) -> Self {
        self.fail_on = Some(fragment.into());
        self
    }

    /// Payloads executed so far, in order.
    #[must_use]
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().clone()
    }

    /// Parameters bound to each `execute_with_params` call, in order.
    #[must_use]
    pub fn bound_params(&self) -> Vec<Vec<Value>> {
        self.params.lock().clone()
    }

    /// Number of payloads containing `fragment`.
    #[must_use]
    pub fn count_containing(&self, fragment: &str) -> usize {
        self.payloads
            .lock()
            .iter()
            .filter(|payload| payload.contains(fragment))
            .count()
    }

    /// Forgets recorded payloads.
    pub fn reset(&self) {
        self.payloads.lock().clear();
        self.params.lock().clear();
    }

    fn answer(&self, payload: &str) -> Result<ResultSet, StoreError> {
        self.payloads.lock().push(payload.to_string());
        if let Some(fragment) = &self.fail_on {
            if payload.contains(fragment.as_str()) {
                return Err(StoreError::new(format!("simulated failure on `{fragment}`")));
            }
        }
        (self.responder)(payload)
    }
}

impl Store for RecordingStore {
    fn execute(&self, payload: &str) -> Result<ResultSet, StoreError> {
        self.answer(payload)
    }

    fn execute_with_params(&self, payload: &str, params: &[Value]) -> Result<ResultSet, StoreError> {
        self.params.lock().push(params.to_vec());
        self.answer(payload)
    }
}
