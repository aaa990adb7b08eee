// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::detect::detect_handler;
use crate::config::ServerConfig;
use crate::pipeline::DetectionPipeline;
use crate::vision::ocr::{OcrEngineInfo, OcrEngineManager};

/// Room for the JSON envelope or multipart boundaries around an image
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Request body cap for a given decoded image cap
///
/// Base64 grows the payload by 4/3, so a JSON image at the decoded limit
/// still fits. Decoded sizes are checked again per request.
pub fn request_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes
        .saturating_add(max_upload_bytes.div_ceil(3))
        .saturating_add(BODY_LIMIT_SLACK)
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DetectionPipeline>,
    pub engines: Arc<OcrEngineManager>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        pipeline: DetectionPipeline,
        engines: OcrEngineManager,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            engines: Arc::new(engines),
            max_upload_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub engines: Vec<OcrEngineInfo>,
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = request_body_limit(state.max_upload_bytes);

    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Detection endpoint
        .route("/detect", post(detect_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port).parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("BHT detector listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        engines: state.engines.list_engines(),
    })
}
