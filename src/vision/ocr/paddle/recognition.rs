// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Recognizes one cropped text line at a time with CTC greedy decoding over a
//! character dictionary. The latin dictionary covers Portuguese and English
//! label text, accents included.

use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array4, ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::tensor::REC_INPUT_HEIGHT;

/// Recognized text for one crop
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean per-character probability (0.0-1.0)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// CTC label table: index 0 is the blank, the last entry is a space
#[derive(Debug, Clone, PartialEq)]
pub struct CharDictionary {
    labels: Vec<char>,
}

impl CharDictionary {
    /// Build from dictionary characters in model order
    pub fn new<I: IntoIterator<Item = char>>(chars: I) -> Self {
        let mut labels = vec!['\0'];
        labels.extend(chars);
        labels.push(' ');
        Self { labels }
    }

    /// Load a PaddleOCR key file (one character per line)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;

        let mut chars = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.context("Failed to read dictionary line")?;
            let line = line.trim_end_matches('\r');
            if let Some(ch) = line.chars().next() {
                chars.push(ch);
            }
        }

        if chars.is_empty() {
            bail!("OCR character dictionary is empty: {}", path.display());
        }
        Ok(Self::new(chars))
    }

    /// Number of CTC classes, blank and space included
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.len() <= 2
    }

    fn label(&self, index: usize) -> Option<char> {
        if index == 0 {
            None
        } else {
            self.labels.get(index).copied()
        }
    }

    /// Greedy CTC decode of `[1, T, C]` or `[T, C]` class probabilities
    ///
    /// Repeated labels collapse unless separated by a blank.
    pub fn decode(&self, output: &ArrayViewD<f32>) -> Result<RecognizedText> {
        let (steps, classes, batched) = match output.shape() {
            [1, t, c] => (*t, *c, true),
            [t, c] => (*t, *c, false),
            other => bail!("Unexpected recognition output shape: {:?}", other),
        };

        let mut text = String::new();
        let mut confidence_sum = 0.0f32;
        let mut emitted = 0usize;
        let mut previous = 0usize;

        for t in 0..steps {
            let (mut best, mut best_prob) = (0usize, f32::NEG_INFINITY);
            for c in 0..classes {
                let p = if batched {
                    output[IxDyn(&[0, t, c])]
                } else {
                    output[IxDyn(&[t, c])]
                };
                if p > best_prob {
                    best = c;
                    best_prob = p;
                }
            }

            if best != previous {
                if let Some(ch) = self.label(best) {
                    text.push(ch);
                    confidence_sum += best_prob;
                    emitted += 1;
                }
            }
            previous = best;
        }

        let confidence = if emitted == 0 {
            0.0
        } else {
            (confidence_sum / emitted as f32).clamp(0.0, 1.0)
        };

        Ok(RecognizedText {
            text: text.trim().to_string(),
            confidence,
        })
    }
}

/// PaddleOCR recognition session (CPU only)
#[derive(Clone)]
pub struct OcrRecognitionModel {
    session: Arc<Mutex<Session>>,
    dictionary: Arc<CharDictionary>,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the recognition model (rec_model.onnx) and its key file
    pub fn load<P: AsRef<Path>>(model_path: P, dict_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            bail!("OCR character dictionary not found: {}", dict_path.display());
        }

        let dictionary = CharDictionary::load(dict_path)?;
        info!(
            "Loading OCR recognition model from {} ({} classes)",
            model_path.display(),
            dictionary.len()
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load OCR recognition model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    pub fn dictionary(&self) -> &CharDictionary {
        &self.dictionary
    }

    /// Recognize a `[1, 3, 48, W]` crop tensor
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 || shape[2] != REC_INPUT_HEIGHT as usize || shape[3] < 4 {
            bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>=4]",
                shape,
                REC_INPUT_HEIGHT
            );
        }

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("OCR recognition session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let probabilities = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let recognized = self.dictionary.decode(&probabilities.view())?;
        debug!(
            "Recognized {:?} ({:.2})",
            recognized.text, recognized.confidence
        );
        Ok(recognized)
    }
}
