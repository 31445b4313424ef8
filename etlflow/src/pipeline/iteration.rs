//! Windowed iteration of the transform stage.
//!
//! Iteration is active only when start, step and stop all have hooks. The
//! loop then walks `[current, current + step)` windows while
//! `stop >= current`. The comparison is inclusive, so the last window
//! starts at or before `stop` and its upper bound may lie past `stop`.
//!
//! Bounds advance by a fixed step whether or not any rows fall inside a
//! window, so sparse domains are covered without stalling. A step that
//! does not move `current` towards `stop` never terminates; the loop has
//! no guard against that.

use super::resolver::{ControlHook, MemoizedResolver, ResolverState};
use super::Pipeline;
use crate::core::{BoundaryValue, IterationControl, Step, Value};
use crate::errors::{EtlError, EtlResult};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::sync::Arc;

/// Values a start or stop hook may return.
pub trait IntoBound {
    /// Converts into a boundary value, or explains why it cannot.
    fn into_bound(self) -> Result<BoundaryValue, String>;
}

impl IntoBound for BoundaryValue {
    fn into_bound(self) -> Result<BoundaryValue, String> {
        Ok(self)
    }
}

impl IntoBound for i64 {
    fn into_bound(self) -> Result<BoundaryValue, String> {
        Ok(BoundaryValue::Integer(self))
    }
}

impl IntoBound for i32 {
    fn into_bound(self) -> Result<BoundaryValue, String> {
        Ok(BoundaryValue::Integer(i64::from(self)))
    }
}

impl IntoBound for NaiveDate {
    fn into_bound(self) -> Result<BoundaryValue, String> {
        Ok(BoundaryValue::Date(self))
    }
}

impl IntoBound for NaiveDateTime {
    fn into_bound(self) -> Result<BoundaryValue, String> {
        Ok(BoundaryValue::DateTime(self))
    }
}

impl IntoBound for Value {
    fn into_bound(self) -> Result<BoundaryValue, String> {
        self.to_boundary()
            .ok_or_else(|| format!("{self} cannot be used as a bound"))
    }
}

/// Values a step hook may return.
pub trait IntoStep {
    /// Converts into a step, or explains why it cannot.
    fn into_step(self) -> Result<Step, String>;
}

impl IntoStep for Step {
    fn into_step(self) -> Result<Step, String> {
        Ok(self)
    }
}

impl IntoStep for i64 {
    fn into_step(self) -> Result<Step, String> {
        Ok(Step::Integer(self))
    }
}

impl IntoStep for i32 {
    fn into_step(self) -> Result<Step, String> {
        Ok(Step::Integer(i64::from(self)))
    }
}

impl IntoStep for TimeDelta {
    fn into_step(self) -> Result<Step, String> {
        Ok(Step::Duration(self))
    }
}

impl IntoStep for Value {
    fn into_step(self) -> Result<Step, String> {
        self.as_i64()
            .map(Step::Integer)
            .ok_or_else(|| format!("{self} cannot be used as a step"))
    }
}

/// One `[lower, upper)` window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    index: usize,
    lower: BoundaryValue,
    upper: BoundaryValue,
    lower_literal: String,
    upper_literal: String,
}

impl Window {
    /// Creates a window, rendering both bounds.
    #[must_use]
    pub fn new(index: usize, lower: BoundaryValue, upper: BoundaryValue) -> Self {
        Self {
            index,
            lower_literal: lower.render(),
            upper_literal: upper.render(),
            lower,
            upper,
        }
    }

    /// Zero-based position of the window in the run.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Rendered lower bound, for splicing into a textual payload.
    ///
    /// The literal is type-correct but not escaped; payloads built from it
    /// are trusted input.
    #[must_use]
    pub fn lower(&self) -> &str {
        &self.lower_literal
    }

    /// Rendered upper bound.
    #[must_use]
    pub fn upper(&self) -> &str {
        &self.upper_literal
    }

    /// Typed lower bound.
    #[must_use]
    pub fn lower_value(&self) -> &BoundaryValue {
        &self.lower
    }

    /// Typed upper bound.
    #[must_use]
    pub fn upper_value(&self) -> &BoundaryValue {
        &self.upper
    }

    /// `[lower, upper]` as store values, for
    /// [`Pipeline::query_with_params`].
    #[must_use]
    pub fn params(&self) -> [Value; 2] {
        [self.lower.to_value(), self.upper.to_value()]
    }
}

/// Iterator over the windows between resolved bounds.
///
/// Yields an error and stops if the bounds or step are of incompatible
/// kinds.
#[derive(Debug, Clone)]
pub struct Windows {
    current: BoundaryValue,
    step: Step,
    stop: BoundaryValue,
    index: usize,
    finished: bool,
}

impl Windows {
    /// Creates the iterator.
    #[must_use]
    pub fn new(start: BoundaryValue, step: Step, stop: BoundaryValue) -> Self {
        Self {
            current: start,
            step,
            stop,
            index: 0,
            finished: false,
        }
    }

    fn fail(&mut self, err: EtlError) -> Option<EtlResult<Window>> {
        self.finished = true;
        Some(Err(err))
    }
}

impl Iterator for Windows {
    type Item = EtlResult<Window>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.stop.is_at_or_after(&self.current) {
            Ok(true) => {}
            Ok(false) => {
                self.finished = true;
                return None;
            }
            Err(err) => return self.fail(err),
        }

        let next = match self.current.advance(&self.step) {
            Ok(next) => next,
            Err(err) => return self.fail(err),
        };

        let lower = std::mem::replace(&mut self.current, next.clone());
        let window = Window::new(self.index, lower, next);
        self.index += 1;
        Some(Ok(window))
    }
}

/// The start, step and stop resolvers of a pipeline.
#[derive(Debug)]
pub struct IterationControls {
    start: MemoizedResolver<BoundaryValue>,
    step: MemoizedResolver<Step>,
    stop: MemoizedResolver<BoundaryValue>,
}

impl Default for IterationControls {
    fn default() -> Self {
        Self {
            start: MemoizedResolver::new(IterationControl::Start),
            step: MemoizedResolver::new(IterationControl::Step),
            stop: MemoizedResolver::new(IterationControl::Stop),
        }
    }
}

impl IterationControls {
    /// Creates unregistered controls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff start, step and stop all have hooks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.start.has_hook() && self.step.has_hook() && self.stop.has_hook()
    }

    /// State of one control.
    #[must_use]
    pub fn state(&self, control: IterationControl) -> ResolverState {
        match control {
            IterationControl::Start => self.start.state(),
            IterationControl::Step => self.step.state(),
            IterationControl::Stop => self.stop.state(),
        }
    }

    /// Registers the start hook.
    pub fn set_start<F, V>(&mut self, hook: F)
    where
        F: Fn(&Pipeline) -> EtlResult<V> + Send + Sync + 'static,
        V: IntoBound,
    {
        self.start.set_hook(bound_hook(IterationControl::Start, hook));
    }

    /// Registers the stop hook.
    pub fn set_stop<F, V>(&mut self, hook: F)
    where
        F: Fn(&Pipeline) -> EtlResult<V> + Send + Sync + 'static,
        V: IntoBound,
    {
        self.stop.set_hook(bound_hook(IterationControl::Stop, hook));
    }

    /// Registers the step hook.
    pub fn set_step<F, V>(&mut self, hook: F)
    where
        F: Fn(&Pipeline) -> EtlResult<V> + Send + Sync + 'static,
        V: IntoStep,
    {
        self.step.set_hook(Arc::new(move |pipeline: &Pipeline| {
            hook(pipeline)?.into_step().map_err(|reason| EtlError::UnusableBound {
                control: IterationControl::Step,
                reason,
            })
        }));
    }

    /// Resolves start, running its hook at most once.
    pub fn start(&self, pipeline: &Pipeline) -> EtlResult<Option<BoundaryValue>> {
        self.start.resolve(pipeline)
    }

    /// Resolves step, running its hook at most once.
    pub fn step(&self, pipeline: &Pipeline) -> EtlResult<Option<Step>> {
        self.step.resolve(pipeline)
    }

    /// Resolves stop, running its hook at most once.
    pub fn stop(&self, pipeline: &Pipeline) -> EtlResult<Option<BoundaryValue>> {
        self.stop.resolve(pipeline)
    }

    /// Resolves all three controls, in start, step, stop order.
    ///
    /// Returns `None` if any of them has neither a hook nor a cached value.
    pub fn windows(&self, pipeline: &Pipeline) -> EtlResult<Option<Windows>> {
        let Some(start) = self.start(pipeline)? else {
            return Ok(None);
        };
        let Some(step) = self.step(pipeline)? else {
            return Ok(None);
        };
        let Some(stop) = self.stop(pipeline)? else {
            return Ok(None);
        };
        Ok(Some(Windows::new(start, step, stop)))
    }
}

fn bound_hook<F, V>(control: IterationControl, hook: F) -> ControlHook<BoundaryValue>
where
    F: Fn(&Pipeline) -> EtlResult<V> + Send + Sync + 'static,
    V: IntoBound,
{
    Arc::new(move |pipeline: &Pipeline| {
        hook(pipeline)?
            .into_bound()
            .map_err(|reason| EtlError::UnusableBound { control, reason })
    })
}
