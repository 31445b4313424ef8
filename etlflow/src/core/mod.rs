//! Core domain model types for etlflow.
//!
//! This module contains the fundamental types used throughout the engine:
//! - Stage and iteration control enums
//! - Boundary values and steps with type-aware arithmetic and rendering
//! - Scalar values and result sets exchanged with the store
//! - Structured events emitted by the instrumentation

pub mod boundary;
mod event;
mod stage;
mod value;

pub use boundary::{BoundaryValue, Step};
pub use event::{EmitterInfo, EtlEvent, EventKind};
pub use stage::{IterationControl, Stage};
pub use value::{ResultSet, Row, Value};
