// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image-mode detection tests
//!
//! These tests verify that DetectionPipeline::image_mode:
//! - Degrades instead of failing when no OCR engine is usable
//! - Walks the primary/fallback chain
//! - Hands engines a downscaled, normalized image
//! - Leaves nothing behind in the scratch directory

use anyhow::{anyhow, Result};
use bht_detector::{
    config::DetectorConfig,
    detection::{AnalysisStatus, Confidence, DetectionMethod},
    DetectionPipeline, OcrEngine, OcrEngines,
};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Engine returning a canned reply and recording what it was shown
struct StubEngine {
    name: &'static str,
    reply: Result<String, String>,
    seen: Mutex<Vec<(PathBuf, (u32, u32))>>,
}

impl StubEngine {
    fn replying(name: &'static str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(name: &'static str, error: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Err(error.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl OcrEngine for StubEngine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn recognize(&self, image_path: &Path) -> Result<String> {
        let dimensions = image::open(image_path)
            .map(|img| img.dimensions())
            .unwrap_or((0, 0));
        self.seen
            .lock()
            .unwrap()
            .push((image_path.to_path_buf(), dimensions));
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

fn pipeline(scratch: &Path, engines: OcrEngines) -> DetectionPipeline {
    let config = DetectorConfig {
        scratch_dir: scratch.to_path_buf(),
        ..DetectorConfig::default()
    };
    DetectionPipeline::from_config(&config, engines)
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([20, 20, 20])
        } else {
            Rgb([235, 235, 235])
        }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

fn scratch_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[cfg(test)]
mod image_mode_tests {
    use super::*;

    #[test]
    fn test_no_engines_yields_degraded_empty_result() {
        let scratch = tempfile::tempdir().unwrap();
        let result = pipeline(scratch.path(), OcrEngines::none())
            .image_mode(&encode(32, 32, ImageFormat::Png));

        assert_eq!(result.method, DetectionMethod::Image);
        assert!(!result.has_match);
        assert!(result.matches.is_empty());
        assert!(result.source_text.is_empty());
        assert_eq!(result.status, AnalysisStatus::Degraded);
        assert!(result.warning.is_some());
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[test]
    fn test_primary_engine_text_is_matched() {
        let scratch = tempfile::tempdir().unwrap();
        let primary = StubEngine::replying("paddleocr", "Ingredientes: farinha, BHT");
        let fallback = StubEngine::replying("tesseract", "unused");

        let result = pipeline(
            scratch.path(),
            OcrEngines::new(Some(primary.clone()), Some(fallback.clone())),
        )
        .image_mode(&encode(64, 32, ImageFormat::Jpeg));

        assert!(result.has_match);
        assert_eq!(result.source_text, "Ingredientes: farinha, BHT");
        assert_eq!(result.engine.as_deref(), Some("paddleocr"));
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[test]
    fn test_failing_primary_falls_back() {
        let scratch = tempfile::tempdir().unwrap();
        let primary = StubEngine::failing("paddleocr", "model crashed");
        let fallback = StubEngine::replying("tesseract", "Conservante: INS 320");

        let result = pipeline(
            scratch.path(),
            OcrEngines::new(Some(primary.clone()), Some(fallback.clone())),
        )
        .image_mode(&encode(64, 32, ImageFormat::Png));

        assert_eq!(result.status, AnalysisStatus::Complete);
        assert_eq!(result.engine.as_deref(), Some("tesseract"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        assert!(result.has_match);
        assert_eq!(result.matches[0].text, "INS 320");
    }

    #[test]
    fn test_every_engine_failing_is_degraded() {
        let scratch = tempfile::tempdir().unwrap();
        let engines = OcrEngines::new(
            Some(StubEngine::failing("paddleocr", "model crashed")),
            Some(StubEngine::failing("tesseract", "not installed")),
        );

        let result =
            pipeline(scratch.path(), engines).image_mode(&encode(16, 16, ImageFormat::Png));
        assert!(result.is_degraded());
        let warning = result.warning.unwrap();
        assert!(warning.contains("model crashed"));
        assert!(warning.contains("not installed"));
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[test]
    fn test_blank_ocr_output_is_complete_without_match() {
        let scratch = tempfile::tempdir().unwrap();
        let engines = OcrEngines::new(
            Some(StubEngine::replying("paddleocr", " ")),
            Some(StubEngine::replying("tesseract", "\n")),
        );

        let result =
            pipeline(scratch.path(), engines).image_mode(&encode(16, 16, ImageFormat::Png));
        assert!(!result.has_match);
        assert_eq!(result.status, AnalysisStatus::Complete);
        assert!(result.source_text.is_empty());
    }

    #[test]
    fn test_large_image_is_downscaled_before_ocr() {
        let scratch = tempfile::tempdir().unwrap();
        let engine = StubEngine::replying("paddleocr", "BHT");

        pipeline(scratch.path(), OcrEngines::primary_only(engine.clone()))
            .image_mode(&encode(2600, 400, ImageFormat::Png));

        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, dimensions) = &seen[0];
        assert_eq!(*dimensions, (2000, 307));
        assert!(path.starts_with(scratch.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
    }

    #[test]
    fn test_undecodable_upload_reaches_engine_as_original() {
        let scratch = tempfile::tempdir().unwrap();
        let engine = StubEngine::failing("tesseract", "cannot read image");

        let result = pipeline(scratch.path(), OcrEngines::fallback_only(engine.clone()))
            .image_mode(b"GIF89a but not really");

        assert!(result.is_degraded());
        let seen = engine.seen.lock().unwrap();
        let (path, dimensions) = &seen[0];
        assert_eq!(*dimensions, (0, 0));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("gif"));
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[test]
    fn test_scratch_dir_empty_after_many_requests() {
        let scratch = tempfile::tempdir().unwrap();
        let pipeline = pipeline(
            scratch.path(),
            OcrEngines::new(
                Some(StubEngine::failing("paddleocr", "flaky")),
                Some(StubEngine::replying("tesseract", "antiox. 320")),
            ),
        );

        for i in 0..5 {
            let bytes = if i % 2 == 0 {
                encode(24, 24, ImageFormat::Png)
            } else {
                b"garbage".to_vec()
            };
            pipeline.image_mode(&bytes);
        }
        let result = pipeline.image_mode(&encode(24, 24, ImageFormat::Jpeg));
        assert!(result.has_match);
        assert_eq!(scratch_entries(scratch.path()), 0);
    }
}
