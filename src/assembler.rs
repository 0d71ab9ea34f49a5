//! Response assembly.
//!
//! Shapes a pipeline report for the wire. The response always carries both
//! pick collections (props and game markets, possibly empty) and a metadata
//! block, regardless of sport or slate emptiness, and never emits a null
//! numeric field — the pipeline substituted defaults long before this
//! point.

use serde::{Deserialize, Serialize};

use crate::pipeline::dedup::DedupGroup;
use crate::pipeline::diversity::DiversitySummary;
use crate::pipeline::titanium::TitaniumReport;
use crate::pipeline::{ScoredPick, SlateReport};
use crate::types::{MarketKind, Tier};

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// One surviving pick, flattened for consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickPayload {
    pub pick_id: String,
    pub sport: String,
    pub event: String,
    pub market: String,
    pub market_kind: MarketKind,
    pub side: String,
    pub line: f64,
    pub player: String,
    pub book: String,
    pub final_score: f64,
    pub titanium_triggered: bool,
    pub titanium: TitaniumReport,
    pub tier: Tier,
    pub reasons: Vec<String>,
}

impl PickPayload {
    fn from_scored(pick: &ScoredPick) -> Self {
        Self {
            pick_id: pick.pick.pick_id.clone(),
            sport: pick.pick.sport.clone(),
            event: pick.pick.event.clone(),
            market: pick.pick.market_label.clone(),
            market_kind: pick.pick.market,
            side: pick.pick.side.clone(),
            line: pick.pick.line,
            player: pick.pick.player_name.clone(),
            book: pick.pick.book.clone(),
            final_score: pick.final_score,
            titanium_triggered: pick.titanium.triggered,
            titanium: pick.titanium.clone(),
            tier: pick.tier,
            reasons: pick.reasons.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlateMetadata {
    pub request_id: String,
    pub sport: String,
    pub generated_at: String,
    pub candidates_in: usize,
    pub picks_out: usize,
    pub dedup_dropped: usize,
    pub diversity_dropped: usize,
    pub titanium_count: usize,
}

/// The assembled response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlateResponse {
    pub metadata: SlateMetadata,
    /// Player-prop picks, best first. Always present, possibly empty.
    pub prop_picks: Vec<PickPayload>,
    /// Game-market picks (spread/total/moneyline), best first. Always
    /// present, possibly empty.
    pub game_picks: Vec<PickPayload>,
    pub dedup_groups: Vec<DedupGroup>,
    pub diversity: DiversitySummary,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build the outward response from a pipeline report.
///
/// `sport` falls back to the first surviving pick's sport when the request
/// did not name one. Request id and timestamp come from this boundary, not
/// from inside the deterministic pipeline.
pub fn assemble(sport: Option<&str>, report: &SlateReport) -> SlateResponse {
    let sport = sport
        .map(str::to_string)
        .filter(|s| !s.is_empty())
        .or_else(|| report.picks.first().map(|p| p.pick.sport.clone()))
        .unwrap_or_default();

    let (prop_picks, game_picks): (Vec<_>, Vec<_>) = report
        .picks
        .iter()
        .map(PickPayload::from_scored)
        .partition(|p| p.market_kind.is_prop());

    let titanium_count = report
        .picks
        .iter()
        .filter(|p| p.tier == Tier::Titanium)
        .count();

    SlateResponse {
        metadata: SlateMetadata {
            request_id: uuid::Uuid::new_v4().to_string(),
            sport,
            generated_at: chrono::Utc::now().to_rfc3339(),
            candidates_in: report.candidates_in,
            picks_out: report.picks.len(),
            dedup_dropped: report.dedup_dropped,
            diversity_dropped: report.diversity.dropped(),
            titanium_count,
        },
        prop_picks,
        game_picks,
        dedup_groups: report.dedup_groups.clone(),
        diversity: report.diversity.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
