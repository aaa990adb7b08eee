// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod detection;
pub mod pipeline;
pub mod vision;

pub use config::DetectorConfig;
pub use detection::{DetectionResult, Match, PatternMatcher, PatternSet};
pub use pipeline::DetectionPipeline;
pub use vision::ocr::{OcrEngine, OcrEngineManager, OcrEngines};
