//! Lazily computed, memoized iteration controls.
//!
//! Start and stop hooks are usually queries against the destination. They
//! must run at most once per pipeline: re-running `start` mid-iteration
//! would observe the rows the iteration itself just wrote.

use super::Pipeline;
use crate::core::IterationControl;
use crate::errors::EtlResult;
use parking_lot::Mutex;
use std::sync::Arc;

/// A producer for one iteration control.
pub type ControlHook<T> = Arc<dyn Fn(&Pipeline) -> EtlResult<T> + Send + Sync>;

/// Observable state of a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// No hook and no value.
    Unregistered,
    /// A hook is registered but has not run yet.
    Pending,
    /// A value has been computed and cached.
    Resolved,
}

/// Cache slot. Kept apart from the hook so a resolved zero or empty value
/// is never mistaken for "not computed yet".
#[derive(Debug, Clone)]
enum Resolution<T> {
    Unresolved,
    Resolved(T),
}

/// Computes a control's value at most once and caches it.
pub struct MemoizedResolver<T> {
    control: IterationControl,
    hook: Option<ControlHook<T>>,
    cache: Mutex<Resolution<T>>,
}

impl<T> std::fmt::Debug for MemoizedResolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizedResolver")
            .field("control", &self.control)
            .field("state", &self.state())
            .finish()
    }
}

impl<T> MemoizedResolver<T> {
    /// Creates an unregistered resolver.
    #[must_use]
    pub fn new(control: IterationControl) -> Self {
        Self {
            control,
            hook: None,
            cache: Mutex::new(Resolution::Unresolved),
        }
    }

    /// The control this resolver computes.
    #[must_use]
    pub fn control(&self) -> IterationControl {
        self.control
    }

    /// Registers the producer.
    ///
    /// An already cached value stays cached.
    pub fn set_hook(&mut self, hook: ControlHook<T>) {
        self.hook = Some(hook);
    }

    /// Returns true if a producer is registered.
    #[must_use]
    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ResolverState {
        match (&*self.cache.lock(), self.hook.is_some()) {
            (Resolution::Resolved(_), _) => ResolverState::Resolved,
            (Resolution::Unresolved, true) => ResolverState::Pending,
            (Resolution::Unresolved, false) => ResolverState::Unregistered,
        }
    }
}

impl<T: Clone> MemoizedResolver<T> {
    /// Returns the cached value, or runs the hook once and caches its result.
    ///
    /// Returns `Ok(None)` when no hook is registered and nothing is cached.
    /// A failing hook caches nothing.
    pub fn resolve(&self, pipeline: &Pipeline) -> EtlResult<Option<T>> {
        if let Resolution::Resolved(value) = &*self.cache.lock() {
            return Ok(Some(value.clone()));
        }

        let Some(hook) = &self.hook else {
            return Ok(None);
        };

        // The lock is not held while the hook runs; hooks call back into
        // the pipeline.
        let value = hook(pipeline)?;
        *self.cache.lock() = Resolution::Resolved(value.clone());
        Ok(Some(value))
    }

    /// Returns the cached value without computing anything.
    #[must_use]
    pub fn cached(&self) -> Option<T> {
        match &*self.cache.lock() {
            Resolution::Resolved(value) => Some(value.clone()),
            Resolution::Unresolved => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BoundaryValue;
    use crate::errors::EtlError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pipeline() -> Pipeline {
        Pipeline::builder().without_logger().build()
    }

    fn counting_hook(counter: &Arc<AtomicUsize>, value: i64) -> ControlHook<BoundaryValue> {
        let counter = Arc::clone(counter);
        Arc::new(move |_: &Pipeline| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(BoundaryValue::Integer(value))
        })
    }

    #[test]
    fn test_unregistered_resolves_to_none() {
        let resolver: MemoizedResolver<BoundaryValue> = MemoizedResolver::new(IterationControl::Start);
        assert_eq!(resolver.state(), ResolverState::Unregistered);
        assert_eq!(resolver.resolve(&pipeline()).unwrap(), None);
    }

    #[test]
    fn test_hook_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut resolver = MemoizedResolver::new(IterationControl::Stop);
        resolver.set_hook(counting_hook(&counter, 6));
        assert_eq!(resolver.state(), ResolverState::Pending);

        let p = pipeline();
        for _ in 0..5 {
            assert_eq!(resolver.resolve(&p).unwrap(), Some(BoundaryValue::Integer(6)));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.state(), ResolverState::Resolved);
    }

    #[test]
    fn test_zero_is_cached_not_recomputed() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut resolver = MemoizedResolver::new(IterationControl::Start);
        resolver.set_hook(counting_hook(&counter, 0));

        let p = pipeline();
        resolver.resolve(&p).unwrap();
        resolver.resolve(&p).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached(), Some(BoundaryValue::Integer(0)));
    }

    #[test]
    fn test_failing_hook_caches_nothing() {
        let mut resolver: MemoizedResolver<BoundaryValue> = MemoizedResolver::new(IterationControl::Start);
        resolver.set_hook(Arc::new(|_: &Pipeline| Err(EtlError::hook("no destination"))));

        assert!(resolver.resolve(&pipeline()).is_err());
        assert_eq!(resolver.state(), ResolverState::Pending);
        assert!(resolver.cached().is_none());
    }

    #[test]
    fn test_new_hook_keeps_cached_value() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut resolver = MemoizedResolver::new(IterationControl::Start);
        resolver.set_hook(counting_hook(&counter, 1));
        let p = pipeline();
        resolver.resolve(&p).unwrap();

        resolver.set_hook(counting_hook(&counter, 99));
        assert_eq!(resolver.resolve(&p).unwrap(), Some(BoundaryValue::Integer(1)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
