// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector configuration
//!
//! Values come from built-in defaults, an optional TOML file, and finally
//! `BHT_*` environment variables (which win).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// OCR engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory holding det_model.onnx, rec_model.onnx and the dictionary
    pub model_dir: Option<PathBuf>,
    /// Character dictionary file name inside `model_dir`
    pub dictionary_file: String,
    /// Tesseract executable (None disables the fallback engine)
    pub tesseract_binary: Option<String>,
    /// Tesseract language model, `+`-separated
    pub tesseract_languages: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: Some(PathBuf::from("./models/paddleocr-onnx")),
            dictionary_file: "ppocr_keys_latin.txt".to_string(),
            tesseract_binary: Some("tesseract".to_string()),
            tesseract_languages: "por+eng".to_string(),
        }
    }
}

/// Image normalization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub contrast: f32,
    pub sharpness: f32,
    /// Largest allowed width or height before downscaling
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            contrast: 1.5,
            sharpness: 1.2,
            max_dimension: 2000,
            jpeg_quality: 95,
        }
    }
}

/// HTTP boundary configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
    pub server: ServerConfig,
    /// Where per-request scratch images are written
    pub scratch_dir: PathBuf,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            preprocess: PreprocessConfig::default(),
            server: ServerConfig::default(),
            scratch_dir: env::temp_dir(),
        }
    }
}

impl DetectorConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `BHT_*` environment overrides; unparseable values are ignored
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = env::var("BHT_OCR_MODEL_DIR") {
            self.ocr.model_dir = non_empty(val).map(PathBuf::from);
        }
        if let Ok(val) = env::var("BHT_TESSERACT_BIN") {
            self.ocr.tesseract_binary = non_empty(val);
        }
        if let Ok(val) = env::var("BHT_TESSERACT_LANGS") {
            if !val.is_empty() {
                self.ocr.tesseract_languages = val;
            }
        }
        if let Ok(val) = env::var("BHT_SCRATCH_DIR") {
            if !val.is_empty() {
                self.scratch_dir = PathBuf::from(val);
            }
        }
        if let Ok(val) = env::var("BHT_HOST") {
            if !val.is_empty() {
                self.server.host = val;
            }
        }
        if let Ok(val) = env::var("BHT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = env::var("BHT_MAX_UPLOAD_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.server.max_upload_bytes = bytes;
            }
        }
        self
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }
}

/// Empty strings disable optional settings
fn non_empty(val: String) -> Option<String> {
    if val.trim().is_empty() {
        None
    } else {
        Some(val)
    }
}
