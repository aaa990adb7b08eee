// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR text extraction for label photos
//!
//! Components:
//! - `engine` - engine trait and the injected primary/fallback pair
//! - `paddle` - PaddleOCR ONNX models (primary)
//! - `tesseract` - Tesseract process (fallback)
//! - `extractor` - preprocessing plus the fallback chain
//! - `manager` - startup loading and availability listing

pub mod engine;
pub mod extractor;
pub mod manager;
pub mod paddle;
pub mod tesseract;

pub use engine::{EngineRole, OcrEngine, OcrEngines};
pub use extractor::{EngineUsed, ExtractionResult, TextExtractor};
pub use manager::{OcrEngineInfo, OcrEngineManager};
pub use paddle::{PaddleOcrModel, PADDLE_ENGINE_NAME};
pub use tesseract::{TesseractEngine, TESSERACT_ENGINE_NAME};
