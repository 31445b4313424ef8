//! # Etlflow
//!
//! A small engine for batch extract-transform-load jobs.
//!
//! An etlflow [`Pipeline`](pipeline::Pipeline) runs four fixed stages in
//! order:
//!
//! - **`ensure_destination`**: create or verify the destination
//! - **`before_etl`**: preparatory work
//! - **`etl`**: the transform, optionally once per window
//! - **`after_etl`**: cleanup or finalisation
//!
//! When `start`, `step` and `stop` are all registered, the transform runs
//! once per half-open window `[lower, upper)` from `start` while
//! `stop >= lower`. Each control is computed at most once per pipeline.
//! Every query goes through a [`Store`](store::Store) and is timed and
//! logged to an [`EventSink`](events::EventSink).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use etlflow::prelude::*;
//!
//! let mut etl = Pipeline::builder()
//!     .description("daily totals")
//!     .store(store)
//!     .build();
//!
//! etl.start(|etl| etl.max_for(&MaxFor::new("daily_totals", "the_date")))
//!     .step(|_| Ok(Step::days(1)))
//!     .stop(|_| Ok(chrono::Utc::now().date_naive()))
//!     .etl(|etl, window| {
//!         let w = window.expect("iterating");
//!         etl.query(&format!(
//!             "REPLACE INTO daily_totals SELECT DATE(created_at), SUM(amount) FROM orders \
//!              WHERE created_at >= '{}' AND created_at < '{}' GROUP BY 1",
//!             w.lower(),
//!             w.upper()
//!         ))?;
//!         Ok(())
//!     });
//!
//! etl.run()?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod core;
pub mod errors;
pub mod events;
pub mod helpers;
pub mod observability;
pub mod pipeline;
pub mod store;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        BoundaryValue, EtlEvent, EventKind, IterationControl, ResultSet, Row, Stage, Step, Value,
    };
    pub use crate::errors::{ConfigurationError, EtlError, EtlResult};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::helpers::MaxFor;
    pub use crate::observability::InstrumentationConfig;
    pub use crate::pipeline::{Pipeline, PipelineBuilder, RunOptions, Window};
    pub use crate::store::{Store, StoreError};
}
