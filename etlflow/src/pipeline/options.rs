//! Options for a single pipeline run.

use crate::core::Stage;
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which stages a run skips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Stages never invoked during the run, even when registered.
    #[serde(default)]
    pub exclude: BTreeSet<Stage>,
}

impl RunOptions {
    /// Options that run every stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stage to skip.
    #[must_use]
    pub fn except(mut self, stage: Stage) -> Self {
        self.exclude.insert(stage);
        self
    }

    /// Parses stage names to skip, e.g. `["ensure_destination"]`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a name that is not a stage.
    pub fn from_stage_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ConfigurationError> {
        let exclude = names
            .iter()
            .map(|name| name.as_ref().parse::<Stage>())
            .collect::<Result<_, _>>()?;
        Ok(Self { exclude })
    }

    /// Returns true if the stage is skipped.
    #[must_use]
    pub fn is_excluded(&self, stage: Stage) -> bool {
        self.exclude.contains(&stage)
    }

    /// Stages to invoke, in execution order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ORDERED
            .into_iter()
            .filter(move |stage| !self.is_excluded(*stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UNKNOWN_STAGE;

    #[test]
    fn test_default_runs_everything() {
        let stages: Vec<_> = RunOptions::new().stages().collect();
        assert_eq!(stages, Stage::ORDERED.to_vec());
    }

    #[test]
    fn test_except_keeps_order() {
        let stages: Vec<_> = RunOptions::new()
            .except(Stage::BeforeEtl)
            .except(Stage::EnsureDestination)
            .stages()
            .collect();
        assert_eq!(stages, vec![Stage::Etl, Stage::AfterEtl]);
    }

    #[test]
    fn test_from_stage_names() {
        let options = RunOptions::from_stage_names(&["ensure_destination", "after_etl"]).unwrap();
        assert!(options.is_excluded(Stage::EnsureDestination));
        assert!(options.is_excluded(Stage::AfterEtl));
        assert!(!options.is_excluded(Stage::Etl));

        let err = RunOptions::from_stage_names(&["extract"]).unwrap_err();
        assert_eq!(err.code(), UNKNOWN_STAGE);
    }

    #[test]
    fn test_deserialize() {
        let options: RunOptions = serde_json::from_str(r#"{"exclude": ["before_etl"]}"#).unwrap();
        assert_eq!(options, RunOptions::new().except(Stage::BeforeEtl));

        let options: RunOptions = serde_json::from_str("{}").unwrap();
        assert!(options.exclude.is_empty());
    }
}
