// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine manager: loads the configured engines once at startup

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::engine::{EngineRole, OcrEngine, OcrEngines};
use super::paddle::{PaddleOcrModel, PADDLE_ENGINE_NAME};
use super::tesseract::{TesseractEngine, TESSERACT_ENGINE_NAME};
use crate::config::OcrConfig;

/// Availability of one engine slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrEngineInfo {
    pub name: String,
    pub role: EngineRole,
    pub available: bool,
}

/// Owns the process-wide engine instances
///
/// Missing model files or binaries are handled gracefully: the slot is left
/// empty and detection degrades instead of failing at startup.
#[derive(Debug, Clone)]
pub struct OcrEngineManager {
    engines: OcrEngines,
}

impl OcrEngineManager {
    /// Load every engine named in `config`
    ///
    /// Model loading is blocking; call from `spawn_blocking` inside a runtime.
    pub fn load(config: &OcrConfig) -> Self {
        let primary = config.model_dir.as_ref().and_then(|dir| {
            match PaddleOcrModel::load(dir, &config.dictionary_file) {
                Ok(model) => Some(Arc::new(model) as Arc<dyn OcrEngine>),
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Failed to load PaddleOCR from {}: {:#}",
                        dir.display(),
                        e
                    );
                    None
                }
            }
        });

        let fallback = config.tesseract_binary.as_ref().and_then(|binary| {
            match TesseractEngine::detect(binary, &config.tesseract_languages) {
                Ok(engine) => Some(Arc::new(engine) as Arc<dyn OcrEngine>),
                Err(e) => {
                    tracing::warn!("⚠️ Tesseract unavailable ({}): {:#}", binary, e);
                    None
                }
            }
        });

        if primary.is_none() && fallback.is_none() {
            tracing::warn!("⚠️ No OCR engine available - image analysis will be degraded");
        }

        Self::from_engines(OcrEngines::new(primary, fallback))
    }

    /// Wrap already constructed engines
    pub fn from_engines(engines: OcrEngines) -> Self {
        Self { engines }
    }

    pub fn engines(&self) -> &OcrEngines {
        &self.engines
    }

    pub fn has_primary(&self) -> bool {
        self.engines.primary.is_some()
    }

    pub fn has_fallback(&self) -> bool {
        self.engines.fallback.is_some()
    }

    /// Both engine slots with their availability
    pub fn list_engines(&self) -> Vec<OcrEngineInfo> {
        vec![
            OcrEngineInfo {
                name: self
                    .engines
                    .primary
                    .as_ref()
                    .map_or(PADDLE_ENGINE_NAME, |e| e.name())
                    .to_string(),
                role: EngineRole::Primary,
                available: self.has_primary(),
            },
            OcrEngineInfo {
                name: self
                    .engines
                    .fallback
                    .as_ref()
                    .map_or(TESSERACT_ENGINE_NAME, |e| e.name())
                    .to_string(),
                role: EngineRole::Fallback,
                available: self.has_fallback(),
            },
        ]
    }
}
