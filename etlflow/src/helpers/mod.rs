//! Convenience helpers for hooks.

mod watermark;

pub use watermark::{default_floor_for, looks_like_date, MaxFor, RESULT_COLUMN};
