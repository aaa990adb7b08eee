// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tensor preparation for the PaddleOCR ONNX models

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Square input size for the detection model
pub const DET_INPUT_SIZE: u32 = 960;

/// Recognition model input height (PP-OCR latin models use 48)
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Ingredient lines are long; allow wide recognition crops
pub const REC_MAX_WIDTH: u32 = 1280;

/// Mean values for detection normalization (ImageNet)
pub const DET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for detection normalization (ImageNet)
pub const DET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Gray used to pad the detection canvas
const PAD_GRAY: u8 = 128;

/// Detection input: letterboxed to `DET_INPUT_SIZE`, ImageNet-normalized, NCHW
pub fn detection_tensor(image: &DynamicImage) -> (Array4<f32>, Letterbox) {
    let letterbox = Letterbox::new(image.dimensions(), DET_INPUT_SIZE);
    let canvas = letterbox.apply(image);
    let size = DET_INPUT_SIZE as usize;

    let tensor = Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
        let value = canvas.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
        (value - DET_MEAN[c]) / DET_STD[c]
    });

    (tensor, letterbox)
}

/// Recognition input: height `REC_INPUT_HEIGHT`, width from aspect ratio,
/// scaled to [-1, 1], NCHW
pub fn recognition_tensor(crop: &DynamicImage) -> Array4<f32> {
    let (w, h) = crop.dimensions();
    let scale = REC_INPUT_HEIGHT as f32 / h.max(1) as f32;
    let width = ((w as f32 * scale).round() as u32).clamp(4, REC_MAX_WIDTH);

    let resized = crop
        .resize_exact(width, REC_INPUT_HEIGHT, FilterType::Lanczos3)
        .to_rgb8();

    Array4::from_shape_fn(
        (1, 3, REC_INPUT_HEIGHT as usize, width as usize),
        |(_, c, y, x)| resized.get_pixel(x as u32, y as u32)[c] as f32 / 127.5 - 1.0,
    )
}

/// Scale and padding applied when fitting an image into the square canvas
///
/// Keeps what is needed to map detection boxes back onto the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub target: u32,
}

impl Letterbox {
    pub fn new((width, height): (u32, u32), target: u32) -> Self {
        if width == 0 || height == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                source_width: width,
                source_height: height,
                target,
            };
        }

        let scale = (target as f32 / width as f32).min(target as f32 / height as f32);
        let (new_w, new_h) = Self::scaled((width, height), scale);

        Self {
            scale,
            offset_x: (target - new_w) / 2,
            offset_y: (target - new_h) / 2,
            source_width: width,
            source_height: height,
            target,
        }
    }

    fn scaled((width, height): (u32, u32), scale: f32) -> (u32, u32) {
        (
            ((width as f32 * scale).round() as u32).max(1),
            ((height as f32 * scale).round() as u32).max(1),
        )
    }

    /// Resize `image` into a gray square canvas, centered
    pub fn apply(&self, image: &DynamicImage) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.target, self.target, Rgb([PAD_GRAY; 3]));
        if self.source_width == 0 || self.source_height == 0 {
            return canvas;
        }

        let (new_w, new_h) = Self::scaled((self.source_width, self.source_height), self.scale);
        let resized = image
            .resize_exact(new_w, new_h, FilterType::Lanczos3)
            .to_rgb8();
        image::imageops::replace(
            &mut canvas,
            &resized,
            self.offset_x as i64,
            self.offset_y as i64,
        );
        canvas
    }

    /// Map a canvas coordinate back onto the source image, clamped to bounds
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        let sx = (x - self.offset_x as f32) / self.scale;
        let sy = (y - self.offset_y as f32) / self.scale;
        (
            sx.clamp(0.0, self.source_width as f32),
            sy.clamp(0.0, self.source_height as f32),
        )
    }
}
