//! Esoteric signal engine.
//!
//! Produces the fourth engine score from hash-derived sub-signals:
//! numerology, fibonacci affinity, vortex digit reduction, astrological
//! energy, and a daily-edge step function. Entirely deterministic — the
//! "randomness" is a SHA-256 digest of the pick descriptor, and every
//! time-dependent input (day of year, energy readings, learning adjustment)
//! arrives as a parameter. Identical inputs produce bit-identical scores.

use serde::Serialize;
use tracing::debug;

use crate::identity;
use crate::types::{CandidatePick, MarketKind, SlateContext};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Sub-signal weights. Each sub-score lies in [0,10]; the weighted sum is
/// the engine score, so a sub-signal can never contribute more than
/// `weight × 10` points. Fibonacci + vortex together carry 0.30 of the
/// range, bounding their combined contribution to 3.0.
#[derive(Debug, Clone)]
pub struct EsotericConfig {
    pub numerology_weight: f64,
    pub fibonacci_weight: f64,
    pub vortex_weight: f64,
    pub astrology_weight: f64,
    pub daily_weight: f64,
    /// Multiplier applied to the numerology blend when the descriptor
    /// contains a master-number digit pair ("11", "22", "33").
    pub master_multiplier: f64,
}

impl Default for EsotericConfig {
    fn default() -> Self {
        Self {
            numerology_weight: 0.30,
            fibonacci_weight: 0.15,
            vortex_weight: 0.15,
            astrology_weight: 0.25,
            daily_weight: 0.15,
            master_multiplier: 1.3,
        }
    }
}

impl EsotericConfig {
    pub fn weight_sum(&self) -> f64 {
        self.numerology_weight
            + self.fibonacci_weight
            + self.vortex_weight
            + self.astrology_weight
            + self.daily_weight
    }
}

// ---------------------------------------------------------------------------
// Inputs & breakdown
// ---------------------------------------------------------------------------

/// Everything the engine needs, as plain data.
#[derive(Debug, Clone)]
pub struct EsotericInputs {
    /// Canonical descriptor: event + line + player (see [`identity`]).
    pub descriptor: String,
    /// Line-derived magnitude (spread, else prop line, else total/10).
    pub magnitude: f64,
    /// Astrological energy reading, 0–100.
    pub astro_energy: f64,
    /// Daily energy reading, 0–100.
    pub daily_energy: f64,
    /// Day of year (1–366), supplied by the caller.
    pub day_of_year: u32,
    /// External trap/learning adjustment, added to the weighted sum.
    pub adjustment: f64,
}

impl EsotericInputs {
    /// Build inputs for a normalized pick from slate-level context.
    pub fn for_pick(pick: &CandidatePick, ctx: &SlateContext) -> Self {
        Self {
            descriptor: identity::esoteric_descriptor(pick),
            magnitude: magnitude_for(pick),
            astro_energy: ctx.astro_energy,
            daily_energy: ctx.daily_energy,
            day_of_year: ctx.day_of_year,
            adjustment: ctx.esoteric_adjustment,
        }
    }
}

/// Magnitude priority: spread line, else prop line, else total/10, else 0.
/// Realized through the normalized market class; lines are taken absolute
/// (a -3.5 spread has magnitude 3.5).
pub fn magnitude_for(pick: &CandidatePick) -> f64 {
    match pick.market {
        MarketKind::Spread => pick.line.abs(),
        MarketKind::Prop => pick.line.abs(),
        MarketKind::Total => pick.line.abs() / 10.0,
        MarketKind::Moneyline => 0.0,
    }
}

/// Weighted contribution of each sub-signal, plus the clamped total.
#[derive(Debug, Clone, Serialize)]
pub struct EsotericBreakdown {
    pub numerology: f64,
    pub fibonacci: f64,
    pub vortex: f64,
    pub astrology: f64,
    pub daily_edge: f64,
    pub adjustment: f64,
    /// Final engine score, clamped to [0,10].
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Fibonacci terms tested for exact/near membership (sequence up to 144).
const FIBONACCI: [f64; 11] = [
    1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0, 55.0, 89.0, 144.0,
];

/// Early terms tested for a golden-ratio relationship.
const GOLDEN_TERMS: usize = 7; // 1..=21

const GOLDEN_RATIO: f64 = 1.618033988749895;

/// Golden-relationship window. Wider than the near-membership window on
/// purpose: `f × φ` sits next to the following Fibonacci term, so a
/// narrower window would be fully shadowed by the near check.
const GOLDEN_TOLERANCE: f64 = 0.45;

const MASTER_PAIRS: [&str; 3] = ["11", "22", "33"];

const TESLA_DIGITS: [u32; 3] = [3, 6, 9];
const VORTEX_CYCLE: [u32; 6] = [1, 2, 4, 8, 7, 5];

pub struct EsotericEngine {
    config: EsotericConfig,
}

impl EsotericEngine {
    pub fn new(config: EsotericConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EsotericConfig {
        &self.config
    }

    /// Score one candidate. Pure: no clock, no RNG, no shared state.
    pub fn score(&self, inputs: &EsotericInputs) -> EsotericBreakdown {
        let numerology =
            self.numerology(&inputs.descriptor, inputs.day_of_year) * self.config.numerology_weight;
        let fibonacci = fibonacci_affinity(inputs.magnitude) * self.config.fibonacci_weight;
        let vortex = vortex_affinity(inputs.magnitude) * self.config.vortex_weight;
        let astrology = astrology_score(inputs.astro_energy) * self.config.astrology_weight;
        let daily_edge = daily_edge_score(inputs.daily_energy) * self.config.daily_weight;

        let weighted = numerology + fibonacci + vortex + astrology + daily_edge;
        let total = (weighted + inputs.adjustment).clamp(0.0, 10.0);

        debug!(
            descriptor = %inputs.descriptor,
            magnitude = inputs.magnitude,
            numerology = format!("{numerology:.3}"),
            fibonacci = format!("{fibonacci:.3}"),
            vortex = format!("{vortex:.3}"),
            astrology = format!("{astrology:.3}"),
            daily_edge = format!("{daily_edge:.3}"),
            adjustment = inputs.adjustment,
            total = format!("{total:.3}"),
            "Esoteric score"
        );

        EsotericBreakdown {
            numerology,
            fibonacci,
            vortex,
            astrology,
            daily_edge,
            adjustment: inputs.adjustment,
            total,
        }
    }

    /// Numerology sub-score, 0–10.
    ///
    /// A day-of-year baseline (digital root / 9) blends 40/60 with a value
    /// derived from the descriptor digest: first 8 hex digits as a 32-bit
    /// integer, mod 9, plus 1, over 9. Master-number digit pairs in the
    /// descriptor multiply the blend by `master_multiplier`, capped at 1.0
    /// before scaling.
    fn numerology(&self, descriptor: &str, day_of_year: u32) -> f64 {
        let day_component = digital_root(day_of_year as u64) as f64 / 9.0;
        let hash_component =
            ((identity::hash_prefix_u32(descriptor) % 9) + 1) as f64 / 9.0;
        let mut blended = 0.4 * day_component + 0.6 * hash_component;
        if MASTER_PAIRS.iter().any(|p| descriptor.contains(p)) {
            blended = (blended * self.config.master_multiplier).min(1.0);
        }
        blended * 10.0
    }
}

/// Fibonacci affinity sub-score, 0–10: exact membership in the sequence up
/// to 144 scores full, near-membership (within 0.5) scores 0.6, a
/// golden-ratio relationship to an early term scores 0.4.
fn fibonacci_affinity(magnitude: f64) -> f64 {
    if magnitude <= 0.0 {
        return 0.0;
    }
    let level = if FIBONACCI.iter().any(|f| (magnitude - f).abs() < 1e-9) {
        1.0
    } else if FIBONACCI.iter().any(|f| (magnitude - f).abs() <= 0.5) {
        0.6
    } else if FIBONACCI[..GOLDEN_TERMS]
        .iter()
        .any(|f| (magnitude - f * GOLDEN_RATIO).abs() < GOLDEN_TOLERANCE)
    {
        0.4
    } else {
        0.0
    };
    level * 10.0
}

/// Vortex affinity sub-score, 0–10: the magnitude scaled by 10 and
/// digitally reduced; Tesla digits {3,6,9} score full, vortex-cycle digits
/// {1,2,4,8,7,5} score 0.6.
fn vortex_affinity(magnitude: f64) -> f64 {
    if magnitude <= 0.0 {
        return 0.0;
    }
    let digit = digital_root((magnitude * 10.0).round() as u64);
    let level = if TESLA_DIGITS.contains(&digit) {
        1.0
    } else if VORTEX_CYCLE.contains(&digit) {
        0.6
    } else {
        0.0
    };
    level * 10.0
}

/// Astrological sub-score: linear rescale of the 0–100 reading to 0–10.
fn astrology_score(energy: f64) -> f64 {
    energy.clamp(0.0, 100.0) / 10.0
}

/// Daily-edge step function: thresholds at 55/70/85 map to fixed points.
fn daily_edge_score(energy: f64) -> f64 {
    if energy >= 85.0 {
        10.0
    } else if energy >= 70.0 {
        7.5
    } else if energy >= 55.0 {
        5.0
    } else {
        0.0
    }
}

/// Repeated digit sum, reduced to a single digit. 0 stays 0.
pub fn digital_root(n: u64) -> u32 {
    if n == 0 {
        0
    } else {
        (1 + (n - 1) % 9) as u32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
