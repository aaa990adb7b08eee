// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Label photo normalization ahead of OCR
//!
//! Steps:
//! 1. Convert to RGB
//! 2. Boost contrast (blend away from the mean gray level)
//! 3. Boost sharpness (blend away from a 3x3 smoothed copy)
//! 4. Downscale so the largest side fits `max_dimension` (Lanczos3)
//! 5. Re-encode as high quality JPEG into a scratch file
//!
//! Any failure falls back to the original image; preprocessing never aborts
//! detection.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use super::image_utils::{load_image, ImageError};
use crate::config::PreprocessConfig;

/// PIL-style smoothing kernel (center weight 5), pre-normalized
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] ImageError),

    #[error("Failed to create scratch file: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Failed to encode normalized image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write normalized image: {0}")]
    Write(#[source] std::io::Error),
}

/// Image handed to the OCR engines
///
/// A normalized image lives in a scratch file that is deleted when this value
/// is dropped. The original variant only borrows the caller's path.
#[derive(Debug)]
pub enum PreparedImage {
    Normalized(NamedTempFile),
    Original(PathBuf),
}

impl PreparedImage {
    pub fn path(&self) -> &Path {
        match self {
            PreparedImage::Normalized(file) => file.path(),
            PreparedImage::Original(path) => path,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, PreparedImage::Normalized(_))
    }
}

/// Normalizes label photos for OCR
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
    scratch_dir: PathBuf,
}

impl ImagePreprocessor {
    pub fn new(config: PreprocessConfig, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Normalize `source`, falling back to the untouched original on failure
    pub fn prepare(&self, source: &Path) -> PreparedImage {
        match self.try_prepare(source) {
            Ok(file) => {
                debug!("Normalized image written to {}", file.path().display());
                PreparedImage::Normalized(file)
            }
            Err(e) => {
                warn!(
                    "Preprocessing failed for {}, using original: {}",
                    source.display(),
                    e
                );
                PreparedImage::Original(source.to_path_buf())
            }
        }
    }

    /// Normalize `source` into a new scratch JPEG
    pub fn try_prepare(&self, source: &Path) -> Result<NamedTempFile, PreprocessError> {
        let image = load_image(source)?;
        let normalized = self.normalize(image);

        let mut file = tempfile::Builder::new()
            .prefix("bht-prep-")
            .suffix(".jpg")
            .tempfile_in(&self.scratch_dir)
            .map_err(PreprocessError::Scratch)?;

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            JpegEncoder::new_with_quality(&mut writer, self.config.jpeg_quality)
                .encode_image(&normalized)?;
            writer.flush().map_err(PreprocessError::Write)?;
        }

        Ok(file)
    }

    /// Apply the in-memory normalization steps
    pub fn normalize(&self, image: DynamicImage) -> RgbImage {
        let rgb = match image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };

        let rgb = enhance_contrast(&rgb, self.config.contrast);
        let rgb = enhance_sharpness(&rgb, self.config.sharpness);

        match scaled_dimensions(rgb.width(), rgb.height(), self.config.max_dimension) {
            Some((width, height)) => {
                debug!(
                    "Downscaling {}x{} to {}x{}",
                    rgb.width(),
                    rgb.height(),
                    width,
                    height
                );
                imageops::resize(&rgb, width, height, FilterType::Lanczos3)
            }
            None => rgb,
        }
    }
}

/// Target size when the largest side exceeds `max_dimension`, else None
///
/// Both sides are scaled by `max_dimension / largest` and truncated; the
/// largest side lands exactly on `max_dimension`.
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let largest = width.max(height);
    if largest <= max_dimension || max_dimension == 0 {
        return None;
    }

    let ratio = max_dimension as f64 / largest as f64;
    let scale = |side: u32| {
        if side == largest {
            max_dimension
        } else {
            ((side as f64 * ratio) as u32).max(1)
        }
    };
    Some((scale(width), scale(height)))
}

/// Scale each channel's distance from the image's mean gray level
pub fn enhance_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixel_count = (image.width() as u64 * image.height() as u64).max(1);
    let luma_sum: u64 = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (r as u64 * 299 + g as u64 * 587 + b as u64 * 114) / 1000
        })
        .sum();
    let mean = (luma_sum as f32 / pixel_count as f32 + 0.5).floor();

    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        for c in pixel.0.iter_mut() {
            *c = blend(mean, *c as f32, factor);
        }
    }
    output
}

/// Scale each pixel's distance from a smoothed copy; borders are left as-is
pub fn enhance_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return image.clone();
    }

    let smoothed: RgbImage = imageops::filter3x3(image, &SMOOTH_KERNEL);
    let mut output = image.clone();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let original = image.get_pixel(x, y);
            let soft = smoothed.get_pixel(x, y);
            let mut sharpened = [0u8; 3];
            for c in 0..3 {
                sharpened[c] = blend(soft[c] as f32, original[c] as f32, factor);
            }
            output.put_pixel(x, y, Rgb(sharpened));
        }
    }
    output
}

/// `base + factor * (value - base)`, rounded and clamped to a byte
fn blend(base: f32, value: f32, factor: f32) -> u8 {
    (base + factor * (value - base)).round().clamp(0.0, 255.0) as u8
}
