//! SLATE — Sports Pick Scoring & Selection Engine
//!
//! Entry point. Loads configuration, initialises structured logging, and
//! either serves the scoring API or scores a slate file in one shot.

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use slate::assembler;
use slate::config::AppConfig;
use slate::engines::esoteric::EsotericEngine;
use slate::intake;
use slate::pipeline::SlatePipeline;
use slate::server;
use slate::server::routes::ServerState;
use slate::sink::{JsonFileSink, ResultSink};
use slate::types::{ScoreRequest, SlateContext};

const BANNER: &str = r#"
  ____  _        _  _____ _____
 / ___|| |      / \|_   _| ____|
 \___ \| |     / _ \ | | |  _|
  ___) | |___ / ___ \| | | |___
 |____/|_____/_/   \_\_| |_____|

  Scoring & Lineup Assembly for Tiered Edges
  v0.1.0 — Pick Selection Service
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML (defaults when the file is absent)
    let cfg = AppConfig::load_or_default("config.toml")?;

    init_logging();

    // Fatal configuration problems surface here, before any request runs.
    let pipeline = SlatePipeline::new(cfg.pipeline_config())?;
    let esoteric = EsotericEngine::new(cfg.esoteric_config());

    let mode = std::env::args().nth(1).unwrap_or_else(|| "serve".into());
    match mode.as_str() {
        "serve" => {
            println!("{BANNER}");
            info!(port = cfg.server.port, "SLATE starting up");
            let state = Arc::new(ServerState { pipeline, esoteric });
            server::serve(state, cfg.server.port).await
        }
        "score" => {
            let path = std::env::args()
                .nth(2)
                .context("Usage: slate score <candidates.json>")?;
            score_file(&path, &cfg, &pipeline, &esoteric)
        }
        other => {
            bail!("Unknown mode '{other}'. Usage: slate [serve|score <candidates.json>]")
        }
    }
}

/// One-shot mode: score a slate file and print the assembled response.
fn score_file(
    path: &str,
    cfg: &AppConfig,
    pipeline: &SlatePipeline,
    esoteric: &EsotericEngine,
) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read slate file: {path}"))?;
    let req: ScoreRequest = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse slate file: {path}"))?;

    // The day-of-year input is supplied here, at the boundary; the engine
    // itself never reads the clock.
    let ctx = req.context.unwrap_or_else(SlateContext::for_today);

    info!(
        sport = req.sport.as_deref().unwrap_or("?"),
        candidates = req.candidates.len(),
        day_of_year = ctx.day_of_year,
        "Scoring slate file"
    );

    let picks = intake::prepare(&req.candidates, &ctx, esoteric);
    let report = pipeline.run(&picks);
    let response = assembler::assemble(req.sport.as_deref(), &report);

    if let Some(dir) = &cfg.sink.output_dir {
        let sink = JsonFileSink::new(dir);
        if let Err(e) = sink.publish(&response) {
            warn!(error = %e, "Failed to publish slate response");
        }
    }

    println!("{}", serde_json::to_string_pretty(&response)?);

    info!(
        picks_out = response.metadata.picks_out,
        titanium = response.metadata.titanium_count,
        dedup_dropped = response.metadata.dedup_dropped,
        diversity_dropped = response.metadata.diversity_dropped,
        "Slate scored"
    );
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("slate=info"));

    let json_logging = std::env::var("SLATE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
