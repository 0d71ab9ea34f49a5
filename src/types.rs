//! Shared types for the SLATE pipeline.
//!
//! These types form the data model used across all modules. Upstream
//! candidate records arrive loosely shaped (`RawCandidate`, with several
//! fallback field names for the same attribute); one normalization step
//! resolves every fallback exactly once and produces the typed
//! `CandidatePick` the pipeline operates on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::engines::EngineKind;
use crate::identity;

// ---------------------------------------------------------------------------
// Market classification
// ---------------------------------------------------------------------------

/// Market classification used for diversity scoping and magnitude rules.
///
/// Any market label that is not a recognized game market (spread, total,
/// moneyline) is treated as a player-prop stat category; the original label
/// is retained on the pick for identity hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Spread,
    Total,
    Moneyline,
    Prop,
}

impl MarketKind {
    /// Classify a raw market/type label.
    pub fn classify(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "spread" | "spreads" | "ats" | "handicap" | "run_line" | "puck_line" => {
                MarketKind::Spread
            }
            "total" | "totals" | "over_under" | "ou" | "game_total" => MarketKind::Total,
            "moneyline" | "money_line" | "ml" | "h2h" => MarketKind::Moneyline,
            _ => MarketKind::Prop,
        }
    }

    /// Whether this is a player-prop market (per-game concentration caps
    /// apply to props only).
    pub fn is_prop(&self) -> bool {
        matches!(self, MarketKind::Prop)
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketKind::Spread => write!(f, "spread"),
            MarketKind::Total => write!(f, "total"),
            MarketKind::Moneyline => write!(f, "moneyline"),
            MarketKind::Prop => write!(f, "prop"),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine scores & boosts
// ---------------------------------------------------------------------------

/// The four raw engine scores attached to a candidate, each intended to lie
/// in [0,10] but not guaranteed by producers. Missing scores default to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineScores {
    pub ai: f64,
    pub research: f64,
    pub esoteric: f64,
    pub jarvis: f64,
}

impl EngineScores {
    pub fn get(&self, engine: EngineKind) -> f64 {
        match engine {
            EngineKind::Ai => self.ai,
            EngineKind::Research => self.research,
            EngineKind::Esoteric => self.esoteric,
            EngineKind::Jarvis => self.jarvis,
        }
    }

    /// Engine-name → score map with a stable iteration order.
    pub fn as_map(&self) -> BTreeMap<String, f64> {
        EngineKind::ALL
            .iter()
            .map(|e| (e.name().to_string(), self.get(*e)))
            .collect()
    }
}

impl fmt::Display for EngineScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ai={:.1} research={:.1} esoteric={:.1} jarvis={:.1}",
            self.ai, self.research, self.esoteric, self.jarvis,
        )
    }
}

/// The four named boost signals. Boosts are small signed adjustments; their
/// sum is capped by the composer before being added to the weighted base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoostSet {
    pub confluence: f64,
    pub cross_model: f64,
    pub simulation: f64,
    pub consensus: f64,
}

impl BoostSet {
    pub fn sum(&self) -> f64 {
        self.confluence + self.cross_model + self.simulation + self.consensus
    }
}

// ---------------------------------------------------------------------------
// Raw candidate (wire shape)
// ---------------------------------------------------------------------------

/// A candidate pick as produced upstream. Every identity attribute may be
/// spelled several ways (`event_id` / `game_id` / `matchup`, ...); the
/// fallback chains are resolved once by [`CandidatePick::from_raw`], never
/// ad hoc inside pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCandidate {
    pub sport: Option<String>,

    // Event identity: event_id → game_id → matchup
    pub event_id: Option<String>,
    pub game_id: Option<String>,
    pub matchup: Option<String>,

    // Market: market → prop_type → pick_type
    pub market: Option<String>,
    pub prop_type: Option<String>,
    pub pick_type: Option<String>,

    // Side: side → direction → pick_side
    pub side: Option<String>,
    pub direction: Option<String>,
    pub pick_side: Option<String>,

    pub line: Option<f64>,

    // Player: canonical id preferred, then name variants
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub player: Option<String>,

    /// Quoting sportsbook key.
    #[serde(alias = "sportsbook")]
    pub book: Option<String>,

    // Engine scores
    pub ai_score: Option<f64>,
    pub research_score: Option<f64>,
    pub esoteric_score: Option<f64>,
    pub jarvis_score: Option<f64>,

    pub context_modifier: Option<f64>,

    // Named boosts
    pub confluence_boost: Option<f64>,
    pub cross_model_boost: Option<f64>,
    pub simulation_boost: Option<f64>,
    pub consensus_boost: Option<f64>,

    /// Externally estimated hit probability in [0,1].
    pub ensemble_probability: Option<f64>,

    /// Human-readable reasons contributed by the upstream engines.
    pub reasons: Vec<String>,
}

/// Resolve a fallback chain: first present, non-empty value wins.
fn resolve(chain: &[&Option<String>]) -> String {
    chain
        .iter()
        .filter_map(|v| v.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

// ---------------------------------------------------------------------------
// Normalized candidate
// ---------------------------------------------------------------------------

/// The unit of work: a fully normalized candidate pick.
///
/// All identity fallbacks are resolved, missing scores/boosts are 0.0 and
/// missing identity fields are empty strings — defaults are substituted
/// *before* hashing or composing, so no stage downstream ever sees a
/// missing required field. `pick_id` is a pure function of identity (never
/// of score); see [`crate::identity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePick {
    pub sport: String,
    /// Resolved event key (event_id → game_id → matchup).
    pub event: String,
    /// Original market/type label (resolved market → prop_type → pick_type).
    pub market_label: String,
    pub market: MarketKind,
    /// Upper-cased side/direction.
    pub side: String,
    pub line: f64,
    /// Canonical player identifier, empty if none.
    pub player_id: String,
    /// Player display name, empty if none.
    pub player_name: String,
    pub book: String,
    pub scores: EngineScores,
    pub context_modifier: f64,
    pub boosts: BoostSet,
    pub ensemble_probability: Option<f64>,
    pub reasons: Vec<String>,
    /// Content hash of the identity attributes above (scores excluded).
    pub pick_id: String,
}

impl CandidatePick {
    /// Normalize a raw upstream record. This is the single place fallback
    /// chains are resolved and defaults substituted.
    pub fn from_raw(raw: &RawCandidate) -> Self {
        let market_label = resolve(&[&raw.market, &raw.prop_type, &raw.pick_type]);
        let mut pick = CandidatePick {
            sport: resolve(&[&raw.sport]),
            event: resolve(&[&raw.event_id, &raw.game_id, &raw.matchup]),
            market: MarketKind::classify(&market_label),
            market_label,
            side: resolve(&[&raw.side, &raw.direction, &raw.pick_side]).to_uppercase(),
            line: raw.line.unwrap_or(0.0),
            player_id: resolve(&[&raw.player_id]),
            player_name: resolve(&[&raw.player_name, &raw.player]),
            book: resolve(&[&raw.book]),
            scores: EngineScores {
                ai: raw.ai_score.unwrap_or(0.0),
                research: raw.research_score.unwrap_or(0.0),
                esoteric: raw.esoteric_score.unwrap_or(0.0),
                jarvis: raw.jarvis_score.unwrap_or(0.0),
            },
            context_modifier: raw.context_modifier.unwrap_or(0.0),
            boosts: BoostSet {
                confluence: raw.confluence_boost.unwrap_or(0.0),
                cross_model: raw.cross_model_boost.unwrap_or(0.0),
                simulation: raw.simulation_boost.unwrap_or(0.0),
                consensus: raw.consensus_boost.unwrap_or(0.0),
            },
            ensemble_probability: raw.ensemble_probability,
            reasons: raw.reasons.clone(),
            pick_id: String::new(),
        };
        pick.pick_id = identity::pick_id(&pick);
        pick
    }

    /// Whether this candidate carries any player identity.
    pub fn has_player(&self) -> bool {
        !self.player_id.is_empty() || !self.player_name.is_empty()
    }

    /// Helper to build a test pick with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        CandidatePick::from_raw(&RawCandidate {
            sport: Some("nba".into()),
            event_id: Some("401584920".into()),
            market: Some("player_points".into()),
            side: Some("over".into()),
            line: Some(27.5),
            player_name: Some("Jayson Tatum".into()),
            book: Some("draftkings".into()),
            ai_score: Some(7.2),
            research_score: Some(8.1),
            esoteric_score: Some(6.4),
            jarvis_score: Some(7.8),
            context_modifier: Some(0.2),
            confluence_boost: Some(0.3),
            ensemble_probability: Some(0.55),
            ..Default::default()
        })
    }
}

impl fmt::Display for CandidatePick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {} {:.1}{} @ {} ({})",
            self.sport,
            self.event,
            self.market_label,
            self.side,
            self.line,
            if self.player_name.is_empty() {
                String::new()
            } else {
                format!(" {}", self.player_name)
            },
            if self.book.is_empty() { "?" } else { &self.book },
            self.pick_id,
        )
    }
}

// ---------------------------------------------------------------------------
// Tier labels
// ---------------------------------------------------------------------------

/// Closed set of output tiers.
///
/// `Titanium` is only reachable when the titanium flag is set AND the final
/// score clears the configured floor; `Rejected` is reserved for candidates
/// blocked upstream by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Titanium,
    Gold,
    Standard,
    Rejected,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Titanium => write!(f, "TITANIUM"),
            Tier::Gold => write!(f, "GOLD"),
            Tier::Standard => write!(f, "STANDARD"),
            Tier::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "titanium" => Ok(Tier::Titanium),
            "gold" => Ok(Tier::Gold),
            "standard" => Ok(Tier::Standard),
            "rejected" => Ok(Tier::Rejected),
            _ => Err(anyhow::anyhow!("Unknown tier: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Slate context & scoring request
// ---------------------------------------------------------------------------

/// Per-slate context for the esoteric engine. Supplied by the caller — the
/// engine never reads the clock itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SlateContext {
    /// Day of year (1–366).
    pub day_of_year: u32,
    /// Astrological energy reading, 0–100.
    pub astro_energy: f64,
    /// Daily energy reading, 0–100.
    pub daily_energy: f64,
    /// External trap/learning adjustment added to the esoteric total.
    pub esoteric_adjustment: f64,
}

impl Default for SlateContext {
    fn default() -> Self {
        Self {
            day_of_year: 1,
            astro_energy: 50.0,
            daily_energy: 50.0,
            esoteric_adjustment: 0.0,
        }
    }
}

impl SlateContext {
    /// Neutral context pinned to today's date. Only call at the process
    /// boundary; the pipeline itself receives the result as plain data.
    pub fn for_today() -> Self {
        use chrono::Datelike;
        Self {
            day_of_year: chrono::Utc::now().ordinal(),
            ..Default::default()
        }
    }
}

/// One scoring request: a slate of raw candidates plus context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRequest {
    pub sport: Option<String>,
    pub context: Option<SlateContext>,
    pub candidates: Vec<RawCandidate>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SLATE.
#[derive(Debug, thiserror::Error)]
pub enum SlateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Intake error: {0}")]
    Intake(String),

    #[error("Sink error: {0}")]
    Sink(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
