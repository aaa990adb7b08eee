// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::DetectorConfig;
use crate::detection::DetectionResult;
use crate::pipeline::DetectionPipeline;
use crate::vision::ocr::{OcrEngineManager, OcrEngines};

/// Arguments for the text command
#[derive(Args, Debug)]
pub struct TextArgs {
    /// Ingredient list or full label text
    pub text: String,

    /// Only scan from the ingredients heading onwards
    #[arg(long)]
    pub ingredients_only: bool,
}

/// Arguments for the image command
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Label photo (png, jpg, jpeg, gif, webp)
    pub path: PathBuf,

    /// Only scan from the ingredients heading onwards
    #[arg(long)]
    pub ingredients_only: bool,
}

pub fn run_text(args: TextArgs, config: &DetectorConfig) -> Result<()> {
    let pipeline = DetectionPipeline::from_config(config, OcrEngines::none());

    let mut result = pipeline.text_mode(&args.text);
    if args.ingredients_only {
        result = pipeline.ingredients_only(result);
    }

    print_result(&result)
}

pub async fn run_image(args: ImageArgs, config: &DetectorConfig) -> Result<()> {
    let bytes = tokio::fs::read(&args.path)
        .await
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let manager = load_engines(config).await?;
    let pipeline = DetectionPipeline::from_config(config, manager.engines().clone());

    let ingredients_only = args.ingredients_only;
    let result = tokio::task::spawn_blocking(move || {
        let result = pipeline.image_mode(&bytes);
        if ingredients_only {
            pipeline.ingredients_only(result)
        } else {
            result
        }
    })
    .await
    .context("Detection task failed")?;

    print_result(&result)
}

pub async fn list_engines(config: &DetectorConfig) -> Result<()> {
    let manager = load_engines(config).await?;

    println!("🔍 OCR engines:");
    for engine in manager.list_engines() {
        let mark = if engine.available { "✅" } else { "❌" };
        println!("  {} {:<10} ({:?})", mark, engine.name, engine.role);
    }
    Ok(())
}

/// Load engines off the async runtime; ONNX session setup blocks
async fn load_engines(config: &DetectorConfig) -> Result<OcrEngineManager> {
    let ocr_config = config.ocr.clone();
    let manager = tokio::task::spawn_blocking(move || OcrEngineManager::load(&ocr_config))
        .await
        .context("Engine loading task failed")?;
    info!("Engines: {:?}", manager.engines());
    Ok(manager)
}

fn print_result(result: &DetectionResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}
