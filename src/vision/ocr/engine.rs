// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine abstraction
//!
//! Engines are injected into the extractor as an [`OcrEngines`] value rather
//! than probed globally, so the fallback chain can be driven by substitute
//! engines in tests.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A text recognizer operating on an image file
///
/// Implementations must tolerate concurrent calls; engines backed by
/// non-reentrant native sessions serialize internally.
#[cfg_attr(test, mockall::automock)]
pub trait OcrEngine: Send + Sync {
    /// Short engine name used in logs and results
    fn name(&self) -> &'static str;

    /// Recognize all text in the image at `image_path`
    fn recognize(&self, image_path: &Path) -> Result<String>;
}

/// Position of an engine in the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineRole {
    Primary,
    Fallback,
}

/// The engines available to this process
#[derive(Clone, Default)]
pub struct OcrEngines {
    pub primary: Option<Arc<dyn OcrEngine>>,
    pub fallback: Option<Arc<dyn OcrEngine>>,
}

impl OcrEngines {
    pub fn new(
        primary: Option<Arc<dyn OcrEngine>>,
        fallback: Option<Arc<dyn OcrEngine>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// No OCR capability at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn primary_only(engine: Arc<dyn OcrEngine>) -> Self {
        Self::new(Some(engine), None)
    }

    pub fn fallback_only(engine: Arc<dyn OcrEngine>) -> Self {
        Self::new(None, Some(engine))
    }

    pub fn has_any(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }

    /// Engines in the order they should be tried
    pub fn chain(&self) -> impl Iterator<Item = (EngineRole, &Arc<dyn OcrEngine>)> {
        self.primary
            .iter()
            .map(|e| (EngineRole::Primary, e))
            .chain(self.fallback.iter().map(|e| (EngineRole::Fallback, e)))
    }
}

impl std::fmt::Debug for OcrEngines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrEngines")
            .field("primary", &self.primary.as_ref().map(|e| e.name()))
            .field("fallback", &self.fallback.as_ref().map(|e| e.name()))
            .finish()
    }
}
