// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image handling for label photos
//!
//! This module provides:
//! - Upload validation and image loading
//! - OCR-oriented normalization
//! - Text extraction via PaddleOCR with a Tesseract fallback
//!
//! Everything runs on CPU.

pub mod image_utils;
pub mod ocr;
pub mod preprocessing;

pub use image_utils::{detect_format, is_allowed_filename, load_image, ImageError};
pub use preprocessing::{ImagePreprocessor, PreparedImage, PreprocessError};
