//! Depth of a node in the story hierarchy.

use std::fmt;

use serde::Serialize;

/// One of the five levels of the sequencing hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// The root: an ordered list of chapters.
    Scene,
    /// An ordered list of acts.
    Chapter,
    /// An ordered list of cuts.
    Act,
    /// Grouped events around a timed wait.
    Cut,
    /// A single story action.
    CutEvent,
}

impl Level {
    /// Lower-case name used in log fields and error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Chapter => "chapter",
            Self::Act => "act",
            Self::Cut => "cut",
            Self::CutEvent => "cut event",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
