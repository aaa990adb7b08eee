// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR ONNX integration (primary engine)
//!
//! - `tensor` - letterboxing and tensor layout for both models
//! - `detection` - text region detection
//! - `recognition` - CTC line recognition
//! - `model` - combined pipeline implementing `OcrEngine`

pub mod detection;
pub mod model;
pub mod recognition;
pub mod tensor;

pub use detection::{OcrDetectionModel, TextBox};
pub use model::{BoundingBox, OcrResult, PaddleOcrModel, TextRegion, PADDLE_ENGINE_NAME};
pub use recognition::{CharDictionary, OcrRecognitionModel, RecognizedText};
