// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection pipeline
//!
//! Text input goes straight to the matcher. Image input is stored in a scratch
//! file, run through preprocessing and OCR, then matched. Neither mode returns
//! an error; failures surface as a degraded result.

use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::DetectorConfig;
use crate::detection::{
    extract_ingredients_section, DetectionMethod, DetectionResult, PatternMatcher,
};
use crate::vision::image_utils::{detect_format, format_to_extension};
use crate::vision::ocr::{OcrEngines, TextExtractor};
use crate::vision::preprocessing::ImagePreprocessor;

/// Composes extraction and matching into one uniform result
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    matcher: PatternMatcher,
    extractor: TextExtractor,
    scratch_dir: PathBuf,
}

impl DetectionPipeline {
    pub fn new(
        matcher: PatternMatcher,
        extractor: TextExtractor,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            matcher,
            extractor,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Default BHT patterns, configured preprocessing and the given engines
    pub fn from_config(config: &DetectorConfig, engines: OcrEngines) -> Self {
        let preprocessor =
            ImagePreprocessor::new(config.preprocess.clone(), config.scratch_dir.clone());
        Self::new(
            PatternMatcher::default(),
            TextExtractor::new(preprocessor, engines),
            config.scratch_dir.clone(),
        )
    }

    /// Scan user-supplied text
    pub fn text_mode(&self, raw_text: &str) -> DetectionResult {
        let report = self.matcher.scan(raw_text);
        info!(
            "Text analysis: {} match(es), confidence {:?}",
            report.matches.len(),
            report.confidence
        );
        DetectionResult::new(
            report.matches,
            raw_text.to_string(),
            DetectionMethod::Text,
            report.confidence,
        )
    }

    /// OCR and scan an uploaded image
    pub fn image_mode(&self, raw_bytes: &[u8]) -> DetectionResult {
        if raw_bytes.is_empty() {
            return DetectionResult::degraded(
                String::new(),
                DetectionMethod::Image,
                "Image data is empty",
            );
        }

        let upload = match self.store_upload(raw_bytes) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to store upload in {}: {}", self.scratch_dir.display(), e);
                return DetectionResult::degraded(
                    String::new(),
                    DetectionMethod::Image,
                    format!("Failed to store uploaded image: {}", e),
                );
            }
        };

        let extraction = self.extractor.extract(upload.path());
        drop(upload);

        if let Some(reason) = extraction.degraded_reason() {
            warn!("Image analysis degraded: {}", reason);
            return DetectionResult::degraded(extraction.text, DetectionMethod::Image, reason);
        }

        let report = self.matcher.scan(&extraction.text);
        info!(
            "Image analysis via {:?}: {} match(es), confidence {:?}",
            extraction.engine_used,
            report.matches.len(),
            report.confidence
        );
        DetectionResult::new(
            report.matches,
            extraction.text,
            DetectionMethod::Image,
            report.confidence,
        )
        .with_engine(extraction.engine_name.map(str::to_string))
    }

    /// Re-scan only the ingredients section of a result's source text
    ///
    /// Positions become offsets into that section. Degraded results are
    /// returned unchanged.
    pub fn ingredients_only(&self, result: DetectionResult) -> DetectionResult {
        if result.is_degraded() {
            return result;
        }

        let section = extract_ingredients_section(&result.source_text).to_string();
        let report = self.matcher.scan(&section);
        DetectionResult::new(report.matches, section, result.method, report.confidence)
            .with_engine(result.engine)
    }

    /// Write `bytes` to a uniquely named scratch file removed on drop
    fn store_upload(&self, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
        let extension = detect_format(bytes)
            .map(format_to_extension)
            .unwrap_or("img");

        let mut file = tempfile::Builder::new()
            .prefix("bht-upload-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.scratch_dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file)
    }
}
