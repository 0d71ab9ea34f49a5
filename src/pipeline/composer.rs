//! Score composer.
//!
//! Combines the four engine scores, the context modifier, and the four
//! named boost signals into the base final score. Out-of-range engine
//! scores clamp instead of erroring; missing values were already defaulted
//! to 0 by normalization.

use tracing::debug;

use crate::engines::EngineKind;
use crate::types::{BoostSet, EngineScores};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-engine composition weights. Must sum to 1.0 (validated at pipeline
/// construction).
#[derive(Debug, Clone)]
pub struct EngineWeights {
    pub ai: f64,
    pub research: f64,
    pub esoteric: f64,
    pub jarvis: f64,
}

impl Default for EngineWeights {
    fn default() -> Self {
        Self {
            ai: 0.25,
            research: 0.35,
            esoteric: 0.15,
            jarvis: 0.25,
        }
    }
}

impl EngineWeights {
    pub fn get(&self, engine: EngineKind) -> f64 {
        match engine {
            EngineKind::Ai => self.ai,
            EngineKind::Research => self.research,
            EngineKind::Esoteric => self.esoteric,
            EngineKind::Jarvis => self.jarvis,
        }
    }

    pub fn sum(&self) -> f64 {
        self.ai + self.research + self.esoteric + self.jarvis
    }
}

/// Composer configuration.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub weights: EngineWeights,
    /// Cap on the *sum* of the four boost values.
    pub boost_cap: f64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            weights: EngineWeights::default(),
            boost_cap: 1.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Result of composing one candidate's scores.
#[derive(Debug, Clone)]
pub struct ComposedScore {
    /// Weighted engine base, before modifier and boosts.
    pub base: f64,
    /// Raw boost sum.
    pub boost_total: f64,
    /// Boost sum after the cap.
    pub boost_applied: f64,
    /// base + context modifier + capped boosts. May exceed [0,10]; the
    /// ensemble adjuster applies the final clamp.
    pub final_score: f64,
    /// Present when the boost cap clipped the sum.
    pub reason: Option<String>,
}

/// Compose the base final score for one candidate.
pub fn compose(
    scores: &EngineScores,
    context_modifier: f64,
    boosts: &BoostSet,
    cfg: &ComposerConfig,
) -> ComposedScore {
    let base: f64 = EngineKind::ALL
        .iter()
        .map(|e| scores.get(*e).clamp(0.0, 10.0) * cfg.weights.get(*e))
        .sum();

    let boost_total = boosts.sum();
    let boost_applied = boost_total.min(cfg.boost_cap);
    let reason = if boost_applied < boost_total {
        Some(format!(
            "Boost sum {boost_total:.2} capped at {:.2}",
            cfg.boost_cap
        ))
    } else {
        None
    };

    let final_score = base + context_modifier + boost_applied;

    debug!(
        base = format!("{base:.3}"),
        context_modifier,
        boost_total = format!("{boost_total:.2}"),
        boost_applied = format!("{boost_applied:.2}"),
        final_score = format!("{final_score:.3}"),
        "Score composed"
    );

    ComposedScore {
        base,
        boost_total,
        boost_applied,
        final_score,
        reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(ai: f64, research: f64, esoteric: f64, jarvis: f64) -> EngineScores {
        EngineScores {
            ai,
            research,
            esoteric,
            jarvis,
        }
    }

    #[test]
    fn test_weighted_base() {
        let composed = compose(
            &scores(8.0, 6.0, 4.0, 10.0),
            0.0,
            &BoostSet::default(),
            &ComposerConfig::default(),
        );
        // 8×0.25 + 6×0.35 + 4×0.15 + 10×0.25 = 2.0 + 2.1 + 0.6 + 2.5
        assert!((composed.base - 7.2).abs() < 1e-10);
        assert!((composed.final_score - 7.2).abs() < 1e-10);
        assert!(composed.reason.is_none());
    }

    #[test]
    fn test_missing_scores_treated_as_zero() {
        // Normalization maps missing engine scores to 0; the composer just
        // weights them — no error path exists.
        let composed = compose(
            &scores(0.0, 8.0, 0.0, 0.0),
            0.0,
            &BoostSet::default(),
            &ComposerConfig::default(),
        );
        assert!((composed.base - 2.8).abs() < 1e-10);
    }

    #[test]
    fn test_out_of_range_scores_clamp() {
        let composed = compose(
            &scores(14.0, -3.0, 5.0, 5.0),
            0.0,
            &BoostSet::default(),
            &ComposerConfig::default(),
        );
        // 10×0.25 + 0×0.35 + 5×0.15 + 5×0.25 = 2.5 + 0 + 0.75 + 1.25
        assert!((composed.base - 4.5).abs() < 1e-10);
    }

    #[test]
    fn test_boost_sum_capped() {
        let boosts = BoostSet {
            confluence: 0.8,
            cross_model: 0.5,
            simulation: 0.4,
            consensus: 0.3,
        };
        let composed = compose(
            &scores(5.0, 5.0, 5.0, 5.0),
            0.0,
            &boosts,
            &ComposerConfig::default(),
        );
        assert!((composed.boost_total - 2.0).abs() < 1e-10);
        assert!((composed.boost_applied - 1.5).abs() < 1e-10);
        assert!((composed.final_score - 6.5).abs() < 1e-10);
        assert!(composed.reason.unwrap().contains("capped"));
    }

    #[test]
    fn test_boosts_below_cap_pass_through() {
        let boosts = BoostSet {
            confluence: 0.5,
            cross_model: 0.3,
            ..Default::default()
        };
        let composed = compose(
            &scores(5.0, 5.0, 5.0, 5.0),
            0.0,
            &boosts,
            &ComposerConfig::default(),
        );
        assert!((composed.boost_applied - 0.8).abs() < 1e-10);
        assert!(composed.reason.is_none());
    }

    #[test]
    fn test_negative_boost_sum_not_clipped() {
        // The cap is an upper bound only; a net-negative boost set applies
        // as-is.
        let boosts = BoostSet {
            confluence: -0.4,
            ..Default::default()
        };
        let composed = compose(
            &scores(5.0, 5.0, 5.0, 5.0),
            0.0,
            &boosts,
            &ComposerConfig::default(),
        );
        assert!((composed.boost_applied - (-0.4)).abs() < 1e-10);
        assert!(composed.reason.is_none());
    }

    #[test]
    fn test_context_modifier_added() {
        let composed = compose(
            &scores(5.0, 5.0, 5.0, 5.0),
            -0.7,
            &BoostSet::default(),
            &ComposerConfig::default(),
        );
        assert!((composed.final_score - 4.3).abs() < 1e-10);
    }

    #[test]
    fn test_composed_score_can_exceed_ten() {
        // The clamp is the ensemble adjuster's job.
        let boosts = BoostSet {
            confluence: 1.5,
            ..Default::default()
        };
        let composed = compose(
            &scores(10.0, 10.0, 10.0, 10.0),
            0.5,
            &boosts,
            &ComposerConfig::default(),
        );
        assert!((composed.final_score - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((EngineWeights::default().sum() - 1.0).abs() < 1e-10);
    }
}
