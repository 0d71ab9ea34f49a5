//! HTTP serving surface — Axum server for scoring requests.
//!
//! CORS enabled for local development. The router is built separately from
//! the listener so tests can drive it with `tower::ServiceExt::oneshot`.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tracing::info;

use routes::AppState;

/// Serve the scoring API. Blocks until the listener fails.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Scoring API listening on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    axum::serve(listener, app)
        .await
        .context("Scoring API server error")?;
    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/score", post(routes::score_slate))
        .route("/api/limits", get(routes::get_limits))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::engines::esoteric::{EsotericConfig, EsotericEngine};
    use crate::pipeline::{PipelineConfig, SlatePipeline};
    use routes::ServerState;

    fn test_state() -> AppState {
        Arc::new(ServerState {
            pipeline: SlatePipeline::new(PipelineConfig::default()).unwrap(),
            esoteric: EsotericEngine::new(EsotericConfig::default()),
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_limits_endpoint() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/api/limits").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!((json["titanium_threshold"].as_f64().unwrap() - 8.0).abs() < 1e-10);
    }

    #[tokio::test]
    async fn test_score_endpoint_roundtrip() {
        let app = build_router(test_state());
        let payload = serde_json::json!({
            "sport": "nba",
            "context": { "day_of_year": 200, "astro_energy": 70.0, "daily_energy": 60.0 },
            "candidates": [
                {
                    "event_id": "E-1",
                    "market": "spread",
                    "side": "home",
                    "line": -3.5,
                    "book": "novig",
                    "ai_score": 8.1,
                    "research_score": 8.4,
                    "esoteric_score": 8.2,
                    "jarvis_score": 7.0
                }
            ]
        });
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/score")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["metadata"]["sport"], "nba");
        assert_eq!(json["game_picks"].as_array().unwrap().len(), 1);
        let pick = &json["game_picks"][0];
        assert_eq!(pick["titanium_triggered"], true);
        assert!(pick["final_score"].as_f64().unwrap() <= 10.0);
    }

    #[tokio::test]
    async fn test_score_endpoint_rejects_malformed_body() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/score")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
