// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::detection::{AnalysisStatus, Confidence, DetectionMethod, DetectionResult, Match};

/// Response from POST /detect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectResponse {
    pub success: bool,
    pub has_bht: bool,
    pub matches: Vec<Match>,
    /// OCR output (image input)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    /// Echoed input (text input)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    pub method: DetectionMethod,
    pub status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

impl From<DetectionResult> for DetectResponse {
    fn from(result: DetectionResult) -> Self {
        let (extracted_text, input_text) = match result.method {
            DetectionMethod::Image => (Some(result.source_text), None),
            DetectionMethod::Text => (None, Some(result.source_text)),
        };

        Self {
            success: true,
            has_bht: result.has_match,
            matches: result.matches,
            extracted_text,
            input_text,
            method: result.method,
            status: result.status,
            warning: result.warning,
            confidence: result.confidence,
            engine: result.engine,
        }
    }
}
