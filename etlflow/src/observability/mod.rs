//! Observability utilities.
//!
//! - [`Instrumentation`] times every operation a pipeline executes and
//!   records start/complete events to its sink
//! - [`logging`] installs a `tracing-subscriber` for binaries and tests

mod instrument;
pub mod logging;

pub use instrument::{Instrumentation, InstrumentationConfig, LogLevel, SpanTimer};
