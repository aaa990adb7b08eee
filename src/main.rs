// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use bht_detector::{
    api::{start_server, AppState},
    config::DetectorConfig,
    pipeline::DetectionPipeline,
    vision::ocr::OcrEngineManager,
};
use std::{env, path::PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting BHT Detector v{}...\n", env!("CARGO_PKG_VERSION"));

    let config_path = env::var("BHT_CONFIG").ok().map(PathBuf::from);
    let config = DetectorConfig::load(config_path.as_deref())?;
    tracing::info!("Scratch directory: {}", config.scratch_dir.display());

    // Load OCR engines (blocking: ONNX session setup, tesseract probe)
    println!("🔤 Loading OCR engines...");
    let ocr_config = config.ocr.clone();
    let manager = tokio::task::spawn_blocking(move || OcrEngineManager::load(&ocr_config))
        .await
        .context("OCR engine loading task failed")?;

    for engine in manager.list_engines() {
        let mark = if engine.available { "✅" } else { "⚠️" };
        println!("   {} {} ({:?})", mark, engine.name, engine.role);
    }

    let pipeline = DetectionPipeline::from_config(&config, manager.engines().clone());
    let state = AppState::new(pipeline, manager, config.server.max_upload_bytes);

    println!(
        "🌐 Listening on http://{}:{}\n",
        config.server.host, config.server.port
    );
    start_server(&config.server, state).await
}
