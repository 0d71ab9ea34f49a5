//! Candidate intake.
//!
//! Normalizes raw upstream records and fills any missing esoteric engine
//! score from the slate context. This is the only place a candidate is
//! enriched; once a batch leaves intake, the pipeline treats it as
//! read-only data.

use tracing::debug;

use crate::engines::esoteric::{EsotericEngine, EsotericInputs};
use crate::types::{CandidatePick, RawCandidate, SlateContext};

/// Normalize a batch and compute esoteric scores for candidates that
/// arrived without one. Candidates that already carry an esoteric score
/// keep it untouched.
pub fn prepare(
    candidates: &[RawCandidate],
    ctx: &SlateContext,
    esoteric: &EsotericEngine,
) -> Vec<CandidatePick> {
    candidates
        .iter()
        .map(|raw| {
            let mut pick = CandidatePick::from_raw(raw);
            if raw.esoteric_score.is_none() {
                let inputs = EsotericInputs::for_pick(&pick, ctx);
                let breakdown = esoteric.score(&inputs);
                debug!(
                    pick_id = %pick.pick_id,
                    esoteric = format!("{:.2}", breakdown.total),
                    "Filled missing esoteric score"
                );
                pick.scores.esoteric = breakdown.total;
            }
            pick
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
