// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction with engine fallback
//!
//! The extractor never fails: engine errors are logged, recorded and turned
//! into empty text so the caller can report a degraded analysis.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use super::engine::{EngineRole, OcrEngines};
use crate::vision::preprocessing::ImagePreprocessor;

/// Which engine produced the extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineUsed {
    Primary,
    Fallback,
    None,
}

impl From<EngineRole> for EngineUsed {
    fn from(role: EngineRole) -> Self {
        match role {
            EngineRole::Primary => EngineUsed::Primary,
            EngineRole::Fallback => EngineUsed::Fallback,
        }
    }
}

/// Outcome of one extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub text: String,
    pub engine_used: EngineUsed,
    /// Name of the engine that produced `text`
    pub engine_name: Option<&'static str>,
    /// One entry per engine that errored
    pub failures: Vec<String>,
    /// Engines that were actually invoked
    pub attempts: usize,
}

impl ExtractionResult {
    fn empty(failures: Vec<String>, attempts: usize) -> Self {
        Self {
            text: String::new(),
            engine_used: EngineUsed::None,
            engine_name: None,
            failures,
            attempts,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Why no engine could analyze the image, if that is the case
    ///
    /// An engine that ran fine but saw no text is not degraded.
    pub fn degraded_reason(&self) -> Option<String> {
        if self.engine_used != EngineUsed::None {
            return None;
        }
        if self.attempts == 0 {
            return Some("No OCR engine available".to_string());
        }
        if self.failures.len() == self.attempts {
            return Some(format!("All OCR engines failed: {}", self.failures.join("; ")));
        }
        None
    }
}

/// Runs preprocessing and the OCR engine chain over an image file
#[derive(Debug, Clone)]
pub struct TextExtractor {
    preprocessor: ImagePreprocessor,
    engines: OcrEngines,
}

impl TextExtractor {
    pub fn new(preprocessor: ImagePreprocessor, engines: OcrEngines) -> Self {
        Self {
            preprocessor,
            engines,
        }
    }

    pub fn engines(&self) -> &OcrEngines {
        &self.engines
    }

    /// Extract text from the image at `image_path`
    pub fn extract(&self, image_path: &Path) -> ExtractionResult {
        if !self.engines.has_any() {
            warn!("No OCR engine available, skipping extraction");
            return ExtractionResult::empty(Vec::new(), 0);
        }

        let prepared = self.preprocessor.prepare(image_path);
        let result = self.run_engines(prepared.path());
        drop(prepared);

        result
    }

    fn run_engines(&self, path: &Path) -> ExtractionResult {
        let mut failures = Vec::new();
        let mut attempts = 0;

        for (role, engine) in self.engines.chain() {
            attempts += 1;
            match engine.recognize(path) {
                Ok(text) if !text.trim().is_empty() => {
                    info!(
                        "Extracted {} chars with {} ({:?})",
                        text.chars().count(),
                        engine.name(),
                        role
                    );
                    return ExtractionResult {
                        text,
                        engine_used: role.into(),
                        engine_name: Some(engine.name()),
                        failures,
                        attempts,
                    };
                }
                Ok(_) => {
                    debug!("{} returned no text", engine.name());
                }
                Err(e) => {
                    warn!("OCR engine {} failed: {:#}", engine.name(), e);
                    failures.push(format!("{}: {:#}", engine.name(), e));
                }
            }
        }

        ExtractionResult::empty(failures, attempts)
    }
}
