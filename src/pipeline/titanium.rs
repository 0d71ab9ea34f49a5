//! Titanium classifier.
//!
//! A pure function over the four **raw** engine scores: the high-confidence
//! flag is set iff at least `min_engines` of them clear the threshold. The
//! input type is `EngineScores` only — the classifier structurally cannot
//! see the composed or context-adjusted final score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engines::EngineKind;
use crate::types::EngineScores;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TitaniumConfig {
    /// Score an engine must reach to count.
    pub threshold: f64,
    /// Engines required for the flag (out of 4).
    pub min_engines: usize,
}

impl Default for TitaniumConfig {
    fn default() -> Self {
        Self {
            threshold: 8.0,
            min_engines: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classification result plus diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitaniumReport {
    pub triggered: bool,
    /// Number of engines at or above the threshold.
    pub qualifying: usize,
    /// Names of the qualifying engines.
    pub engines: Vec<String>,
    pub reason: String,
    pub threshold: f64,
    /// The raw engine score map the decision was made from.
    pub scores: BTreeMap<String, f64>,
}

/// Classify one candidate from its pre-composition engine scores.
pub fn classify(scores: &EngineScores, cfg: &TitaniumConfig) -> TitaniumReport {
    let engines: Vec<String> = EngineKind::ALL
        .iter()
        .filter(|e| scores.get(**e) >= cfg.threshold)
        .map(|e| e.name().to_string())
        .collect();
    let qualifying = engines.len();
    let triggered = qualifying >= cfg.min_engines;

    let reason = if triggered {
        format!(
            "{qualifying}/4 engines ≥ {:.1} (TITANIUM)",
            cfg.threshold
        )
    } else {
        format!(
            "Only {qualifying}/4 engines ≥ {:.1} (need {}+)",
            cfg.threshold, cfg.min_engines
        )
    };

    TitaniumReport {
        triggered,
        qualifying,
        engines,
        reason,
        threshold: cfg.threshold,
        scores: scores.as_map(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
