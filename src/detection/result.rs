// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection result types

use serde::{Deserialize, Serialize};

use super::patterns::Strength;

/// A single marker occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Literal matched substring
    pub text: String,
    /// Zero-based character offset in the scanned text
    pub position: usize,
}

/// Where the scanned text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Image,
    Text,
}

/// Whether the input could actually be analyzed
///
/// `Degraded` is a soft failure: the result carries no matches because the
/// text could not be obtained, not because the marker is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Complete,
    Degraded,
}

/// Confidence that the additive is really listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Highest strength among matching patterns decides the tier
    pub fn from_strength(strongest: Option<Strength>) -> Self {
        match strongest {
            None => Confidence::None,
            Some(Strength::Weak) => Confidence::Low,
            Some(Strength::Abbreviation) => Confidence::Medium,
            Some(Strength::Definitive) => Confidence::High,
        }
    }
}

/// Uniform pipeline output for both text and image input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub has_match: bool,
    pub matches: Vec<Match>,
    /// Text that was scanned (user input or OCR output)
    pub source_text: String,
    pub method: DetectionMethod,
    pub status: AnalysisStatus,
    /// Why the analysis was degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub confidence: Confidence,
    /// OCR engine that produced `source_text` (image input only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

impl DetectionResult {
    /// Build a complete result; `has_match` is derived from `matches`
    pub fn new(
        matches: Vec<Match>,
        source_text: String,
        method: DetectionMethod,
        confidence: Confidence,
    ) -> Self {
        Self {
            has_match: !matches.is_empty(),
            matches,
            source_text,
            method,
            status: AnalysisStatus::Complete,
            warning: None,
            confidence,
            engine: None,
        }
    }

    /// A no-match result for input that could not be analyzed
    pub fn degraded(
        source_text: String,
        method: DetectionMethod,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            has_match: false,
            matches: Vec::new(),
            source_text,
            method,
            status: AnalysisStatus::Degraded,
            warning: Some(reason.into()),
            confidence: Confidence::None,
            engine: None,
        }
    }

    pub fn with_engine(mut self, engine: Option<String>) -> Self {
        self.engine = engine;
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.status == AnalysisStatus::Degraded
    }
}
