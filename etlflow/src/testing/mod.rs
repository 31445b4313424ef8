//! Testing utilities for etlflow pipelines.
//!
//! This module provides:
//! - A recording in-memory store
//! - Assertions over the payloads it saw

mod assertions;
mod mocks;

pub use assertions::{assert_executed, assert_executed_in_order, assert_not_executed};
pub use mocks::RecordingStore;
