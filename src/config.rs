//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section and field carries a default matching the component defaults, so
//! a partial (or absent) file is fine. The loaded values are mapped onto
//! the component configuration structs once, at startup; nothing reads
//! shared mutable state during scoring.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::engines::esoteric::EsotericConfig;
use crate::pipeline::composer::{ComposerConfig, EngineWeights};
use crate::pipeline::dedup::DedupConfig;
use crate::pipeline::diversity::DiversityConfig;
use crate::pipeline::ensemble::EnsembleConfig;
use crate::pipeline::titanium::TitaniumConfig;
use crate::pipeline::{PipelineConfig, TierConfig};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineSection,
    pub esoteric: EsotericSection,
    pub sink: SinkConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8090 }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SinkConfig {
    /// Directory for published slate responses. Unset disables the sink.
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineSection {
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
    /// Per-game concentration limit for player-prop picks. Historically
    /// documented as both 3 and 2; this single setting is authoritative.
    pub max_props_per_game: usize,
    pub titanium_floor: f64,
    pub gold_floor: f64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        let weights = EngineWeights::default();
        let composer = ComposerConfig::default();
        let titanium = TitaniumConfig::default();
        let ensemble = EnsembleConfig::default();
        let dedup = DedupConfig::default();
        let diversity = DiversityConfig::default();
        let tiers = TierConfig::default();
        Self {
            weight_ai: weights.ai,
            weight_research: weights.research,
            weight_esoteric: weights.esoteric,
            weight_jarvis: weights.jarvis,
            boost_cap: composer.boost_cap,
            titanium_threshold: titanium.threshold,
            titanium_min_engines: titanium.min_engines,
            ensemble_boost_above: ensemble.boost_above,
            ensemble_fade_below: ensemble.fade_below,
            ensemble_step: ensemble.step,
            preferred_books: dedup.preferred_books,
            max_per_player: diversity.max_per_player,
            max_props_per_game: diversity.max_props_per_game,
            titanium_floor: tiers.titanium_floor,
            gold_floor: tiers.gold_floor,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EsotericSection {
    pub numerology_weight: f64,
    pub fibonacci_weight: f64,
    pub vortex_weight: f64,
    pub astrology_weight: f64,
    pub daily_weight: f64,
    pub master_multiplier: f64,
}

impl Default for EsotericSection {
    fn default() -> Self {
        let cfg = EsotericConfig::default();
        Self {
            numerology_weight: cfg.numerology_weight,
            fibonacci_weight: cfg.fibonacci_weight,
            vortex_weight: cfg.vortex_weight,
            astrology_weight: cfg.astrology_weight,
            daily_weight: cfg.daily_weight,
            master_multiplier: cfg.master_multiplier,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load from a file when it exists, defaults otherwise.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Map the loaded values onto the pipeline configuration. Validation
    /// happens at pipeline construction, not here.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let p = &self.pipeline;
        PipelineConfig {
            composer: ComposerConfig {
                weights: EngineWeights {
                    ai: p.weight_ai,
                    research: p.weight_research,
                    esoteric: p.weight_esoteric,
                    jarvis: p.weight_jarvis,
                },
                boost_cap: p.boost_cap,
            },
            titanium: TitaniumConfig {
                threshold: p.titanium_threshold,
                min_engines: p.titanium_min_engines,
            },
            ensemble: EnsembleConfig {
                boost_above: p.ensemble_boost_above,
                fade_below: p.ensemble_fade_below,
                step: p.ensemble_step,
            },
            dedup: DedupConfig {
                preferred_books: p.preferred_books.clone(),
            },
            diversity: DiversityConfig {
                max_per_player: p.max_per_player,
                max_props_per_game: p.max_props_per_game,
                ..Default::default()
            },
            tiers: TierConfig {
                titanium_floor: p.titanium_floor,
                gold_floor: p.gold_floor,
            },
        }
    }

    pub fn esoteric_config(&self) -> EsotericConfig {
        let e = &self.esoteric;
        EsotericConfig {
            numerology_weight: e.numerology_weight,
            fibonacci_weight: e.fibonacci_weight,
            vortex_weight: e.vortex_weight,
            astrology_weight: e.astrology_weight,
            daily_weight: e.daily_weight,
            master_multiplier: e.master_multiplier,
        }
    }
}
