//! Scoring engines.
//!
//! Four independent engines score every candidate 0–10: the AI/ML ensemble,
//! Research, Esoteric, and Jarvis. The first, second, and fourth run
//! upstream and arrive as plain numbers on the candidate record; only the
//! esoteric engine is computed in-process (see [`esoteric`]).

pub mod esoteric;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four scoring engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Ai,
    Research,
    Esoteric,
    Jarvis,
}

impl EngineKind {
    /// All engines, in composition order.
    pub const ALL: &'static [EngineKind] = &[
        EngineKind::Ai,
        EngineKind::Research,
        EngineKind::Esoteric,
        EngineKind::Jarvis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Ai => "ai",
            EngineKind::Research => "research",
            EngineKind::Esoteric => "esoteric",
            EngineKind::Jarvis => "jarvis",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
