//! Stage and iteration control enums.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four fixed lifecycle phases of a pipeline run.
///
/// The declaration order is the execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Creates the destination relation if it does not exist yet.
    EnsureDestination,
    /// Work performed once before the transform.
    BeforeEtl,
    /// The transform stage; the only one eligible for windowed iteration.
    Etl,
    /// Work performed once after the transform.
    AfterEtl,
}

impl Stage {
    /// All stages in execution order.
    pub const ORDERED: [Self; 4] = [
        Self::EnsureDestination,
        Self::BeforeEtl,
        Self::Etl,
        Self::AfterEtl,
    ];

    /// Returns the snake_case name of the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnsureDestination => "ensure_destination",
            Self::BeforeEtl => "before_etl",
            Self::Etl => "etl",
            Self::AfterEtl => "after_etl",
        }
    }

    /// Position of the stage in the execution order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns true for the transform stage.
    #[must_use]
    pub const fn is_transform(self) -> bool {
        matches!(self, Self::Etl)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDERED
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ConfigurationError::unknown_stage(s))
    }
}

/// One of the three lazily resolved iteration controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationControl {
    /// Lower bound of the first window.
    Start,
    /// Distance between consecutive window bounds.
    Step,
    /// Last value a window may start at.
    Stop,
}

impl IterationControl {
    /// All controls.
    pub const ALL: [Self; 3] = [Self::Start, Self::Step, Self::Stop];

    /// Returns the snake_case name of the control.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Step => "step",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for IterationControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UNKNOWN_STAGE;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::EnsureDestination.to_string(), "ensure_destination");
        assert_eq!(Stage::BeforeEtl.to_string(), "before_etl");
        assert_eq!(Stage::Etl.to_string(), "etl");
        assert_eq!(Stage::AfterEtl.to_string(), "after_etl");
    }

    #[test]
    fn test_stage_order_matches_index() {
        for (i, stage) in Stage::ORDERED.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
        assert!(Stage::EnsureDestination < Stage::AfterEtl);
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!("before_etl".parse::<Stage>().unwrap(), Stage::BeforeEtl);
        let err = "load".parse::<Stage>().unwrap_err();
        assert_eq!(err.code(), UNKNOWN_STAGE);
    }

    #[test]
    fn test_stage_serialize() {
        let json = serde_json::to_string(&Stage::EnsureDestination).unwrap();
        assert_eq!(json, r#""ensure_destination""#);

        let stage: Stage = serde_json::from_str(r#""after_etl""#).unwrap();
        assert_eq!(stage, Stage::AfterEtl);
    }

    #[test]
    fn test_only_etl_is_transform() {
        let transforms: Vec<_> = Stage::ORDERED.into_iter().filter(|s| s.is_transform()).collect();
        assert_eq!(transforms, vec![Stage::Etl]);
    }

    #[test]
    fn test_iteration_control_display() {
        assert_eq!(IterationControl::Start.to_string(), "start");
        assert_eq!(IterationControl::Step.to_string(), "step");
        assert_eq!(IterationControl::Stop.to_string(), "stop");
    }
}
