// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::image_utils::{
    decode_base64_payload, detect_format, is_allowed_filename, ImageError,
};

/// JSON body for POST /detect
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Ingredient list text
    #[serde(default)]
    pub text: Option<String>,

    /// Base64-encoded label photo (plain or data URL)
    #[serde(default)]
    pub image: Option<String>,
}

/// Validated input handed to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum DetectInput {
    Text(String),
    Image(Vec<u8>),
}

impl DetectRequest {
    /// Parse a JSON body; anything unparseable counts as no input
    pub fn from_json_bytes(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    /// Validate into pipeline input; an image takes precedence over text
    pub fn into_input(self, max_image_bytes: usize) -> Result<DetectInput, ApiError> {
        if let Some(image) = self.image.filter(|s| !s.trim().is_empty()) {
            let bytes = decode_base64_payload(&image, max_image_bytes)
                .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
            if detect_format(&bytes).is_err() {
                return Err(ApiError::UnsupportedFormat("image".to_string()));
            }
            return Ok(DetectInput::Image(bytes));
        }

        match self.text {
            Some(text) => Ok(DetectInput::Text(text)),
            None => Err(ApiError::EmptyInput),
        }
    }
}

/// Validate a multipart `image` upload by its client file name and size
pub fn upload_input(
    file_name: Option<&str>,
    bytes: Vec<u8>,
    max_image_bytes: usize,
) -> Result<DetectInput, ApiError> {
    let name = file_name.unwrap_or_default();
    if !is_allowed_filename(name) {
        return Err(ApiError::UnsupportedFormat(name.to_string()));
    }
    if bytes.is_empty() {
        return Err(ApiError::EmptyInput);
    }
    if bytes.len() > max_image_bytes {
        return Err(ApiError::InvalidRequest(
            ImageError::TooLarge(bytes.len(), max_image_bytes).to_string(),
        ));
    }
    Ok(DetectInput::Image(bytes))
}
