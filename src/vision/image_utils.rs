// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image validation and loading helpers

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;
use thiserror::Error;

/// File extensions accepted for label photos
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Custom error types for image handling
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Check a client-supplied file name against [`ALLOWED_EXTENSIONS`]
///
/// The extension is whatever follows the last `.`, compared case-insensitively.
pub fn is_allowed_filename(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Decode a base64 image payload into raw bytes, enforcing `max_bytes`
pub fn decode_base64_payload(base64_str: &str, max_bytes: usize) -> Result<Vec<u8>, ImageError> {
    if base64_str.is_empty() {
        return Err(ImageError::EmptyData);
    }

    // Accept data URLs ("data:image/png;base64,....")
    let payload = match base64_str.split_once(";base64,") {
        Some((_, data)) => data,
        None => base64_str,
    };

    let bytes = STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }
    if bytes.len() > max_bytes {
        return Err(ImageError::TooLarge(bytes.len(), max_bytes));
    }
    Ok(bytes)
}

/// Detect image format from magic bytes
///
/// Only the formats accepted at the boundary are recognized.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// Get the file extension used for scratch copies of a format
pub fn format_to_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        _ => "img",
    }
}

/// Open and decode an image file, sniffing the format from its content
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, ImageError> {
    let reader = ImageReader::open(path.as_ref())?.with_guessed_format()?;
    reader
        .decode()
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))
}
