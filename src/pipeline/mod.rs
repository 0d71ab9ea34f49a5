//! Pick scoring & selection pipeline.
//!
//! One pure, synchronous batch transform per scoring request:
//! compose + titanium-classify (both off the same raw engine scores) →
//! ensemble adjust → dedupe → global sort → diversity filter → tier
//! assignment. The pipeline holds only immutable configuration, so a single
//! instance is safely shared read-only across concurrent requests; each
//! request owns its candidate batch end-to-end.

pub mod composer;
pub mod titanium;
pub mod ensemble;
pub mod dedup;
pub mod diversity;

use serde::Serialize;
use std::cmp::Ordering;
use tracing::info;

use crate::types::{CandidatePick, SlateError, Tier};
use composer::ComposerConfig;
use dedup::{DedupConfig, DedupGroup};
use diversity::{DiversityConfig, DiversitySummary};
use ensemble::EnsembleConfig;
use titanium::{TitaniumConfig, TitaniumReport};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tier floors. Titanium additionally requires the titanium flag.
#[derive(Debug, Clone)]
pub struct TierConfig {
    pub titanium_floor: f64,
    pub gold_floor: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            titanium_floor: 8.0,
            gold_floor: 7.0,
        }
    }
}

/// Full pipeline configuration, injected at construction and never mutated
/// during scoring.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub composer: ComposerConfig,
    pub titanium: TitaniumConfig,
    pub ensemble: EnsembleConfig,
    pub dedup: DedupConfig,
    pub diversity: DiversityConfig,
    pub tiers: TierConfig,
}

impl PipelineConfig {
    /// Validate the configuration. Fatal problems surface here, at
    /// construction time, never mid-batch.
    fn validate(&self) -> Result<(), SlateError> {
        let weight_sum = self.composer.weights.sum();
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(SlateError::Config(format!(
                "engine weights must sum to 1.0, got {weight_sum}"
            )));
        }
        if self.composer.boost_cap < 0.0 {
            return Err(SlateError::Config("boost cap must be >= 0".into()));
        }
        if self.titanium.min_engines == 0 || self.titanium.min_engines > 4 {
            return Err(SlateError::Config(format!(
                "titanium quorum must be 1..=4, got {}",
                self.titanium.min_engines
            )));
        }
        if !(0.0..=1.0).contains(&self.ensemble.boost_above)
            || !(0.0..=1.0).contains(&self.ensemble.fade_below)
            || self.ensemble.fade_below >= self.ensemble.boost_above
        {
            return Err(SlateError::Config(format!(
                "ensemble bands must satisfy 0 <= fade_below < boost_above <= 1, got {} / {}",
                self.ensemble.fade_below, self.ensemble.boost_above
            )));
        }
        if self.ensemble.step < 0.0 {
            return Err(SlateError::Config("ensemble step must be >= 0".into()));
        }
        if self.dedup.preferred_books.is_empty() {
            return Err(SlateError::Config(
                "preferred book ordering must not be empty".into(),
            ));
        }
        if self.diversity.max_per_player == 0 || self.diversity.max_props_per_game == 0 {
            return Err(SlateError::Config(
                "diversity caps must be >= 1".into(),
            ));
        }
        if self.tiers.gold_floor > self.tiers.titanium_floor {
            return Err(SlateError::Config(format!(
                "gold floor {} must not exceed titanium floor {}",
                self.tiers.gold_floor, self.tiers.titanium_floor
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A candidate after scoring: composed + adjusted final score, titanium
/// diagnostics, tier label, and the reasons accumulated across stages.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPick {
    pub pick: CandidatePick,
    /// Final score in [0,10] (guaranteed after the ensemble adjuster).
    pub final_score: f64,
    pub titanium: TitaniumReport,
    pub tier: Tier,
    pub reasons: Vec<String>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct SlateReport {
    /// Surviving picks, sorted by final score descending.
    pub picks: Vec<ScoredPick>,
    /// Candidates that entered the pipeline.
    pub candidates_in: usize,
    pub dedup_dropped: usize,
    pub dedup_groups: Vec<DedupGroup>,
    pub diversity: DiversitySummary,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SlatePipeline {
    cfg: PipelineConfig,
}

impl SlatePipeline {
    /// Build a pipeline, failing fast on invalid configuration.
    pub fn new(cfg: PipelineConfig) -> Result<Self, SlateError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Run the full transform over one normalized candidate batch.
    pub fn run(&self, candidates: &[CandidatePick]) -> SlateReport {
        let scored: Vec<ScoredPick> = candidates.iter().map(|c| self.score_pick(c)).collect();
        info!(candidates = scored.len(), "Slate scored");

        let deduped = dedup::dedupe(scored, &self.cfg.dedup);

        let mut survivors = deduped.kept;
        survivors.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(Ordering::Equal)
        });

        let diverse = diversity::filter(survivors, &self.cfg.diversity);

        info!(
            candidates_in = candidates.len(),
            picks_out = diverse.kept.len(),
            dedup_dropped = deduped.dropped,
            diversity_dropped = diverse.summary.dropped(),
            "Pipeline complete"
        );

        SlateReport {
            picks: diverse.kept,
            candidates_in: candidates.len(),
            dedup_dropped: deduped.dropped,
            dedup_groups: deduped.groups,
            diversity: diverse.summary,
        }
    }

    /// Score one candidate: composition and titanium classification both
    /// read the raw engine scores; the titanium flag never sees the
    /// composed value.
    fn score_pick(&self, candidate: &CandidatePick) -> ScoredPick {
        let titanium = titanium::classify(&candidate.scores, &self.cfg.titanium);
        let composed = composer::compose(
            &candidate.scores,
            candidate.context_modifier,
            &candidate.boosts,
            &self.cfg.composer,
        );
        let adjusted = ensemble::adjust(
            composed.final_score,
            candidate.ensemble_probability,
            &self.cfg.ensemble,
        );

        let mut reasons = candidate.reasons.clone();
        if titanium.triggered {
            reasons.push(titanium.reason.clone());
        }
        if let Some(r) = composed.reason {
            reasons.push(r);
        }
        if let Some(r) = adjusted.reason {
            reasons.push(r);
        }

        let tier = self.tier_for(titanium.triggered, adjusted.final_score);

        ScoredPick {
            pick: candidate.clone(),
            final_score: adjusted.final_score,
            titanium,
            tier,
            reasons,
        }
    }

    fn tier_for(&self, titanium_triggered: bool, final_score: f64) -> Tier {
        if titanium_triggered && final_score >= self.cfg.tiers.titanium_floor {
            Tier::Titanium
        } else if final_score >= self.cfg.tiers.gold_floor {
            Tier::Gold
        } else {
            Tier::Standard
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawCandidate;

    fn make_pipeline() -> SlatePipeline {
        SlatePipeline::new(PipelineConfig::default()).unwrap()
    }

    fn candidate(event: &str, player: &str, book: &str, research: f64) -> CandidatePick {
        CandidatePick::from_raw(&RawCandidate {
            sport: Some("nba".into()),
            event_id: Some(event.into()),
            market: Some("player_points".into()),
            side: Some("over".into()),
            line: Some(27.5),
            player_name: if player.is_empty() {
                None
            } else {
                Some(player.into())
            },
            book: Some(book.into()),
            ai_score: Some(7.0),
            research_score: Some(research),
            esoteric_score: Some(6.0),
            jarvis_score: Some(7.0),
            ..Default::default()
        })
    }

    // ---- construction ------------------------------------------------------

    #[test]
    fn test_default_config_is_valid() {
        assert!(SlatePipeline::new(PipelineConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_weights_fail_fast() {
        let mut cfg = PipelineConfig::default();
        cfg.composer.weights.research = 0.50; // sum = 1.15
        let err = SlatePipeline::new(cfg).unwrap_err();
        assert!(format!("{err}").contains("weights"));
    }

    #[test]
    fn test_empty_book_list_fails_fast() {
        let mut cfg = PipelineConfig::default();
        cfg.dedup.preferred_books.clear();
        assert!(SlatePipeline::new(cfg).is_err());
    }

    #[test]
    fn test_zero_caps_fail_fast() {
        let mut cfg = PipelineConfig::default();
        cfg.diversity.max_per_player = 0;
        assert!(SlatePipeline::new(cfg).is_err());
    }

    #[test]
    fn test_inverted_ensemble_bands_fail_fast() {
        let mut cfg = PipelineConfig::default();
        cfg.ensemble.fade_below = 0.70;
        assert!(SlatePipeline::new(cfg).is_err());
    }

    #[test]
    fn test_bad_quorum_fails_fast() {
        let mut cfg = PipelineConfig::default();
        cfg.titanium.min_engines = 5;
        assert!(SlatePipeline::new(cfg).is_err());
    }

    // ---- scoring -----------------------------------------------------------

    #[test]
    fn test_final_score_in_range_for_hostile_inputs() {
        let pipeline = make_pipeline();
        let mut c = candidate("E-1", "A B", "draftkings", 8.0);
        c.scores.ai = 42.0;
        c.scores.jarvis = -7.0;
        c.context_modifier = 3.0;
        c.boosts.confluence = 9.0;
        c.ensemble_probability = Some(0.99);
        let report = pipeline.run(&[c]);
        let score = report.picks[0].final_score;
        assert!((0.0..=10.0).contains(&score));
    }

    #[test]
    fn test_titanium_independent_of_composition() {
        let pipeline = make_pipeline();
        let mut c = candidate("E-1", "A B", "draftkings", 8.2);
        c.scores = crate::types::EngineScores {
            ai: 8.5,
            research: 8.2,
            esoteric: 8.1,
            jarvis: 7.0,
        };
        // A heavy negative context modifier drags the final score down but
        // must not touch the titanium flag.
        c.context_modifier = -5.0;
        let report = pipeline.run(&[c]);
        let pick = &report.picks[0];
        assert!(pick.titanium.triggered);
        assert_eq!(pick.titanium.qualifying, 3);
        assert!(pick.final_score < pipeline.config().tiers.titanium_floor);
        // Below the floor, the tier falls back even though the flag is set.
        assert_ne!(pick.tier, Tier::Titanium);
    }

    #[test]
    fn test_tier_assignment() {
        let pipeline = make_pipeline();
        assert_eq!(pipeline.tier_for(true, 9.0), Tier::Titanium);
        assert_eq!(pipeline.tier_for(true, 7.9), Tier::Gold);
        assert_eq!(pipeline.tier_for(false, 9.0), Tier::Gold);
        assert_eq!(pipeline.tier_for(false, 7.0), Tier::Gold);
        assert_eq!(pipeline.tier_for(false, 6.9), Tier::Standard);
    }

    #[test]
    fn test_reasons_accumulate_across_stages() {
        let pipeline = make_pipeline();
        let mut c = candidate("E-1", "A B", "draftkings", 8.0);
        c.reasons = vec!["Sharp money on the over".into()];
        c.boosts.confluence = 2.0; // clipped at 1.5
        c.ensemble_probability = Some(0.70);
        let report = pipeline.run(&[c]);
        let reasons = &report.picks[0].reasons;
        assert!(reasons.iter().any(|r| r.contains("Sharp money")));
        assert!(reasons.iter().any(|r| r.contains("capped")));
        assert!(reasons.iter().any(|r| r.contains("Ensemble")));
    }

    // ---- full run ----------------------------------------------------------

    #[test]
    fn test_run_dedupes_and_sorts() {
        let pipeline = make_pipeline();
        let candidates = vec![
            candidate("E-1", "Jayson Tatum", "draftkings", 6.5),
            candidate("E-1", "Jayson Tatum", "fanduel", 8.0), // same bet, better research
            candidate("E-2", "Jaylen Brown", "draftkings", 9.0),
        ];
        let report = pipeline.run(&candidates);
        assert_eq!(report.candidates_in, 3);
        assert_eq!(report.dedup_dropped, 1);
        assert_eq!(report.picks.len(), 2);
        // Sorted by final score descending.
        assert!(report.picks[0].final_score >= report.picks[1].final_score);
        assert_eq!(report.picks[0].pick.player_name, "Jaylen Brown");
        assert_eq!(report.picks[1].pick.book, "fanduel");
    }

    #[test]
    fn test_run_applies_diversity_after_sort() {
        let pipeline = make_pipeline();
        // Same player on two different bets; the higher-scored one must
        // survive regardless of input order.
        let candidates = vec![
            candidate("E-1", "Jayson Tatum", "draftkings", 5.0),
            {
                let mut c = candidate("E-2", "Jayson Tatum", "draftkings", 9.5);
                c.line = 29.5;
                c.pick_id = crate::identity::pick_id(&c);
                c
            },
        ];
        let report = pipeline.run(&candidates);
        assert_eq!(report.picks.len(), 1);
        assert_eq!(report.picks[0].pick.event, "E-2");
        assert_eq!(report.diversity.dropped_player_cap, 1);
    }

    #[test]
    fn test_run_is_stable_across_invocations() {
        let pipeline = make_pipeline();
        let candidates: Vec<CandidatePick> = (0..20)
            .map(|i| {
                candidate(
                    &format!("E-{}", i % 5),
                    &format!("Player {i}"),
                    if i % 2 == 0 { "draftkings" } else { "fanduel" },
                    5.0 + (i as f64) * 0.2,
                )
            })
            .collect();
        let a = pipeline.run(&candidates);
        let b = pipeline.run(&candidates);
        let ids_a: Vec<_> = a.picks.iter().map(|p| p.pick.pick_id.clone()).collect();
        let ids_b: Vec<_> = b.picks.iter().map(|p| p.pick.pick_id.clone()).collect();
        assert_eq!(ids_a, ids_b);
        for (x, y) in a.picks.iter().zip(&b.picks) {
            assert_eq!(x.final_score.to_bits(), y.final_score.to_bits());
        }
    }

    #[test]
    fn test_run_empty_batch() {
        let pipeline = make_pipeline();
        let report = pipeline.run(&[]);
        assert!(report.picks.is_empty());
        assert_eq!(report.candidates_in, 0);
        assert_eq!(report.dedup_dropped, 0);
    }
}
