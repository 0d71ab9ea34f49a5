//! Ensemble adjuster.
//!
//! Bounded post-hoc correction to the composed score from an externally
//! estimated hit probability. This is the last stage allowed to mutate the
//! final score; everything downstream only selects or rejects. The output
//! is always clamped to [0,10], which also repairs composed scores that
//! legally exceeded the range.

use tracing::debug;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EnsembleConfig {
    /// Probability above which the score is boosted.
    pub boost_above: f64,
    /// Probability below which the score is faded.
    pub fade_below: f64,
    /// Size of the correction in score points.
    pub step: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            boost_above: 0.60,
            fade_below: 0.40,
            step: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Adjustment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EnsembleAdjustment {
    /// Adjusted final score, clamped to [0,10].
    pub final_score: f64,
    /// Present only when the probability fell outside the neutral band.
    pub reason: Option<String>,
}

/// Apply the ensemble correction. A missing probability leaves the score
/// untouched (apart from the clamp).
pub fn adjust(
    final_score: f64,
    probability: Option<f64>,
    cfg: &EnsembleConfig,
) -> EnsembleAdjustment {
    let (adjusted, reason) = match probability {
        Some(p) if p > cfg.boost_above => (
            final_score + cfg.step,
            Some(format!(
                "Ensemble hit probability {:.0}% > {:.0}% (+{:.1})",
                p * 100.0,
                cfg.boost_above * 100.0,
                cfg.step
            )),
        ),
        Some(p) if p < cfg.fade_below => (
            final_score - cfg.step,
            Some(format!(
                "Ensemble hit probability {:.0}% < {:.0}% (-{:.1})",
                p * 100.0,
                cfg.fade_below * 100.0,
                cfg.step
            )),
        ),
        _ => (final_score, None),
    };

    let clamped = adjusted.clamp(0.0, 10.0);
    if let Some(r) = &reason {
        debug!(
            before = format!("{final_score:.2}"),
            after = format!("{clamped:.2}"),
            reason = %r,
            "Ensemble adjustment"
        );
    }

    EnsembleAdjustment {
        final_score: clamped,
        reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
