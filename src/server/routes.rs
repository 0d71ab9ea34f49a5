//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ServerState>`; the
//! pipeline and engine inside are immutable, so concurrent requests need no
//! locking — each request owns its own candidate batch.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::assembler::{self, SlateResponse};
use crate::engines::esoteric::EsotericEngine;
use crate::intake;
use crate::pipeline::SlatePipeline;
use crate::types::{ScoreRequest, SlateContext};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct ServerState {
    pub pipeline: SlatePipeline,
    pub esoteric: EsotericEngine,
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Read-only echo of the active pipeline tunables.
#[derive(Debug, Clone, Serialize)]
pub struct LimitsResponse {
    pub weight_ai: f64,
    pub weight_research: f64,
    pub weight_esoteric: f64,
    pub weight_jarvis: f64,
    pub boost_cap: f64,
    pub titanium_threshold: f64,
    pub titanium_min_engines: usize,
    pub ensemble_boost_above: f64,
    pub ensemble_fade_below: f64,
    pub ensemble_step: f64,
    pub preferred_books: Vec<String>,
    pub max_per_player: usize,
    pub max_props_per_game: usize,
    pub titanium_floor: f64,
    pub gold_floor: f64,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /api/score
pub async fn score_slate(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Json<SlateResponse> {
    let ctx = req.context.unwrap_or_else(SlateContext::for_today);
    info!(
        sport = req.sport.as_deref().unwrap_or("?"),
        candidates = req.candidates.len(),
        day_of_year = ctx.day_of_year,
        "Scoring request received"
    );

    let picks = intake::prepare(&req.candidates, &ctx, &state.esoteric);
    let report = state.pipeline.run(&picks);
    Json(assembler::assemble(req.sport.as_deref(), &report))
}

/// GET /api/limits
pub async fn get_limits(State(state): State<AppState>) -> Json<LimitsResponse> {
    let cfg = state.pipeline.config();
    Json(LimitsResponse {
        weight_ai: cfg.composer.weights.ai,
        weight_research: cfg.composer.weights.research,
        weight_esoteric: cfg.composer.weights.esoteric,
        weight_jarvis: cfg.composer.weights.jarvis,
        boost_cap: cfg.composer.boost_cap,
        titanium_threshold: cfg.titanium.threshold,
        titanium_min_engines: cfg.titanium.min_engines,
        ensemble_boost_above: cfg.ensemble.boost_above,
        ensemble_fade_below: cfg.ensemble.fade_below,
        ensemble_step: cfg.ensemble.step,
        preferred_books: cfg.dedup.preferred_books.clone(),
        max_per_player: cfg.diversity.max_per_player,
        max_props_per_game: cfg.diversity.max_props_per_game,
        titanium_floor: cfg.tiers.titanium_floor,
        gold_floor: cfg.tiers.gold_floor,
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
