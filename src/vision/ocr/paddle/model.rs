// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR primary engine: detection + recognition
//!
//! Expected files in the model directory:
//! - det_model.onnx (text detection)
//! - rec_model.onnx (text recognition, latin script)
//! - the character dictionary named in `OcrConfig::dictionary_file`

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use super::detection::{OcrDetectionModel, TextBox};
use super::recognition::OcrRecognitionModel;
use super::tensor::{detection_tensor, recognition_tensor, Letterbox};
use crate::vision::image_utils::load_image;
use crate::vision::ocr::engine::OcrEngine;

pub const PADDLE_ENGINE_NAME: &str = "paddleocr";

/// Crops below this recognition confidence are dropped
const MIN_TEXT_CONFIDENCE: f32 = 0.5;

/// Bounding box in source image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One recognized text line
#[derive(Debug, Clone)]
pub struct TextRegion {
    pub text: String,
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

/// Result of a full detection + recognition pass
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// All regions joined with single spaces, in reading order
    pub text: String,
    pub regions: Vec<TextRegion>,
    pub processing_time_ms: u64,
}

/// PaddleOCR pipeline running on CPU
#[derive(Debug, Clone)]
pub struct PaddleOcrModel {
    detection: OcrDetectionModel,
    recognition: OcrRecognitionModel,
}

impl PaddleOcrModel {
    pub fn new(detection: OcrDetectionModel, recognition: OcrRecognitionModel) -> Self {
        Self {
            detection,
            recognition,
        }
    }

    /// Load both models from `model_dir`
    pub fn load<P: AsRef<Path>>(model_dir: P, dictionary_file: &str) -> Result<Self> {
        let dir = model_dir.as_ref();
        if !dir.is_dir() {
            anyhow::bail!("OCR model directory not found: {}", dir.display());
        }

        let detection = OcrDetectionModel::load(dir.join("det_model.onnx"))?;
        let recognition =
            OcrRecognitionModel::load(dir.join("rec_model.onnx"), dir.join(dictionary_file))?;

        info!("✅ PaddleOCR models loaded from {} (CPU-only)", dir.display());
        Ok(Self::new(detection, recognition))
    }

    /// Detect and recognize every text line in `image`
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult> {
        let started = Instant::now();

        let (input, letterbox) = detection_tensor(image);
        let boxes = self.detection.detect(&input)?;

        let mut regions = Vec::with_capacity(boxes.len());
        for text_box in &boxes {
            let Some(bounding_box) = to_source_box(text_box, &letterbox) else {
                continue;
            };

            let crop = image.crop_imm(
                bounding_box.x,
                bounding_box.y,
                bounding_box.width,
                bounding_box.height,
            );
            let recognized = self.recognition.recognize(&recognition_tensor(&crop))?;

            if recognized.is_empty() || recognized.confidence < MIN_TEXT_CONFIDENCE {
                debug!(
                    "Dropping region {:?} ({:.2})",
                    recognized.text, recognized.confidence
                );
                continue;
            }

            regions.push(TextRegion {
                text: recognized.text,
                confidence: recognized.confidence,
                bounding_box,
            });
        }

        let text = regions
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(OcrResult {
            text,
            regions,
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}

impl OcrEngine for PaddleOcrModel {
    fn name(&self) -> &'static str {
        PADDLE_ENGINE_NAME
    }

    fn recognize(&self, image_path: &Path) -> Result<String> {
        let image = load_image(image_path)
            .with_context(|| format!("Failed to open {}", image_path.display()))?;
        let result = self.process(&image)?;
        info!(
            "PaddleOCR: {} regions, {}ms",
            result.regions.len(),
            result.processing_time_ms
        );
        Ok(result.text)
    }
}

/// Map a canvas-space box onto the source image; None when it collapses
fn to_source_box(text_box: &TextBox, letterbox: &Letterbox) -> Option<BoundingBox> {
    let (x0, y0) = letterbox.to_source(text_box.x, text_box.y);
    let (x1, y1) = letterbox.to_source(
        text_box.x + text_box.width,
        text_box.y + text_box.height,
    );

    let x = x0.floor() as u32;
    let y = y0.floor() as u32;
    let width = (x1.ceil() as u32).saturating_sub(x);
    let height = (y1.ceil() as u32).saturating_sub(y);

    if width < 2 || height < 2 {
        return None;
    }
    Some(BoundingBox {
        x,
        y,
        width,
        height,
    })
}
