//! Per-stage hook storage.

use super::{Pipeline, Window};
use crate::core::Stage;
use crate::errors::EtlResult;
use std::sync::Arc;

/// A stage body.
///
/// Receives the pipeline and, for the transform stage while iterating,
/// the current window. Every other invocation passes `None`.
pub type StageHook = Arc<dyn Fn(&Pipeline, Option<&Window>) -> EtlResult<()> + Send + Sync>;

/// Holds at most one hook per stage.
#[derive(Clone, Default)]
pub struct StageRegistry {
    hooks: [Option<StageHook>; 4],
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}

impl StageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a hook, replacing any previous one for the stage.
    pub fn set(&mut self, stage: Stage, hook: StageHook) {
        self.hooks[stage.index()] = Some(hook);
    }

    /// Removes the hook for a stage, returning it.
    pub fn remove(&mut self, stage: Stage) -> Option<StageHook> {
        self.hooks[stage.index()].take()
    }

    /// Returns the hook for a stage.
    #[must_use]
    pub fn get(&self, stage: Stage) -> Option<&StageHook> {
        self.hooks[stage.index()].as_ref()
    }

    /// Returns true if a hook is registered for the stage.
    #[must_use]
    pub fn is_registered(&self, stage: Stage) -> bool {
        self.get(stage).is_some()
    }

    /// Stages with a hook, in execution order.
    #[must_use]
    pub fn registered(&self) -> Vec<Stage> {
        Stage::ORDERED
            .into_iter()
            .filter(|stage| self.is_registered(*stage))
            .collect()
    }
}
