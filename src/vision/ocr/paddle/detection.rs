// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Produces a text probability map; connected regions above the threshold
//! become text boxes in canvas coordinates.

use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array4, ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Pixel probability needed to count as text
const BINARY_THRESHOLD: f32 = 0.3;

/// Mean probability needed to keep a region
const BOX_THRESHOLD: f32 = 0.5;

/// Regions smaller than this many pixels are noise
const MIN_REGION_PIXELS: usize = 10;

/// Box growth around each region (DB models shrink text kernels)
const UNCLIP_RATIO: f32 = 1.5;

/// A detected text box in detection-canvas coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean text probability over the region
    pub confidence: f32,
}

impl TextBox {
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// PaddleOCR detection session (CPU only)
#[derive(Clone)]
pub struct OcrDetectionModel {
    /// ONNX Runtime sessions are not re-entrant
    session: Arc<Mutex<Session>>,
    input_name: String,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the detection model (det_model.onnx)
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load OCR detection model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Detection model input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }

    /// Run detection on a `[1, 3, H, W]` tensor
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_h, input_w) = (shape[2], shape[3]);

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("OCR detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let probabilities = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let boxes = boxes_from_probability_map(probabilities.view(), input_h, input_w)?;
        debug!("Detected {} text regions", boxes.len());
        Ok(boxes)
    }
}

/// Turn a `[1, 1, H, W]` or `[1, H, W]` probability map into text boxes
///
/// Boxes are scaled to the `input_h x input_w` canvas, grown by the unclip
/// ratio, and returned in reading order (top to bottom, left to right).
pub fn boxes_from_probability_map(
    map: ArrayViewD<f32>,
    input_h: usize,
    input_w: usize,
) -> Result<Vec<TextBox>> {
    let (height, width) = match map.shape() {
        [1, 1, h, w] => (*h, *w),
        [1, h, w] => (*h, *w),
        other => bail!("Unexpected probability map shape: {:?}", other),
    };
    let is_4d = map.ndim() == 4;
    let prob = |x: usize, y: usize| {
        if is_4d {
            map[IxDyn(&[0, 0, y, x])]
        } else {
            map[IxDyn(&[0, y, x])]
        }
    };

    let scale_x = input_w as f32 / width as f32;
    let scale_y = input_h as f32 / height as f32;

    let mut visited = vec![false; width * height];
    let mut boxes = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || prob(x, y) < BINARY_THRESHOLD {
                continue;
            }

            let region = flood_fill(&prob, &mut visited, (x, y), (width, height));
            if region.count < MIN_REGION_PIXELS {
                continue;
            }
            let confidence = region.sum / region.count as f32;
            if confidence < BOX_THRESHOLD {
                continue;
            }

            let w = (region.max_x - region.min_x + 1) as f32;
            let h = (region.max_y - region.min_y + 1) as f32;
            // Grow each side by (ratio - 1) * h / 2, the DB shrink margin
            let pad = (UNCLIP_RATIO - 1.0) * h / 2.0;

            let x0 = ((region.min_x as f32 - pad) * scale_x).max(0.0);
            let y0 = ((region.min_y as f32 - pad) * scale_y).max(0.0);
            let x1 = ((region.min_x as f32 + w + pad) * scale_x).min(input_w as f32);
            let y1 = ((region.min_y as f32 + h + pad) * scale_y).min(input_h as f32);

            boxes.push(TextBox {
                x: x0,
                y: y0,
                width: x1 - x0,
                height: y1 - y0,
                confidence,
            });
        }
    }

    sort_reading_order(&mut boxes);
    Ok(boxes)
}

/// Sort boxes into lines (overlapping vertical centers), then left to right
pub fn sort_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

    let mut line_start = 0;
    for i in 1..=boxes.len() {
        let new_line = i == boxes.len() || {
            let anchor = &boxes[line_start];
            (boxes[i].center_y() - anchor.center_y()).abs() > anchor.height / 2.0
        };
        if new_line {
            boxes[line_start..i].sort_by(|a, b| a.x.total_cmp(&b.x));
            line_start = i;
        }
    }
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    count: usize,
    sum: f32,
}

/// 4-connected flood fill over pixels above `BINARY_THRESHOLD`
fn flood_fill<F>(
    prob: &F,
    visited: &mut [bool],
    start: (usize, usize),
    (width, height): (usize, usize),
) -> Region
where
    F: Fn(usize, usize) -> f32,
{
    let mut region = Region {
        min_x: start.0,
        max_x: start.0,
        min_y: start.1,
        max_y: start.1,
        count: 0,
        sum: 0.0,
    };
    let mut stack = vec![start];

    while let Some((x, y)) = stack.pop() {
        let idx = y * width + x;
        if visited[idx] {
            continue;
        }
        let p = prob(x, y);
        if p < BINARY_THRESHOLD {
            continue;
        }

        visited[idx] = true;
        region.count += 1;
        region.sum += p;
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    region
}
