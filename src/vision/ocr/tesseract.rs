// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tesseract fallback engine
//!
//! Runs the `tesseract` executable with a combined language model
//! (`por+eng` by default). One process per call, so no state is shared
//! between concurrent requests.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use super::engine::OcrEngine;

pub const TESSERACT_ENGINE_NAME: &str = "tesseract";

/// Tesseract CLI wrapper
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: String,
    languages: String,
}

impl TesseractEngine {
    /// Create an engine without checking that the binary exists
    pub fn new(binary: &str, languages: &str) -> Result<Self> {
        Ok(Self {
            binary: binary.to_string(),
            languages: normalize_languages(languages)?,
        })
    }

    /// Create an engine after confirming the binary runs
    pub fn detect(binary: &str, languages: &str) -> Result<Self> {
        let engine = Self::new(binary, languages)?;
        let version = engine.version()?;
        info!("✅ Tesseract available: {} ({})", version, engine.languages);
        Ok(engine)
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    /// First line of `tesseract --version`
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .with_context(|| format!("Failed to run {}", self.binary))?;

        if !output.status.success() {
            bail!("{} --version exited with {}", self.binary, output.status);
        }

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        Ok(banner.lines().next().unwrap_or_default().trim().to_string())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        TESSERACT_ENGINE_NAME
    }

    fn recognize(&self, image_path: &Path) -> Result<String> {
        debug!(
            "Running {} on {} (lang={})",
            self.binary,
            image_path.display(),
            self.languages
        );

        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .output()
            .with_context(|| format!("Failed to run {}", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract failed with {}: {}",
                output.status,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Normalize a language list ("por, eng" / "por+eng") into tesseract form
pub fn normalize_languages(languages: &str) -> Result<String> {
    let parts: Vec<&str> = languages
        .split(|c| c == '+' || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        bail!("tesseract language list is empty");
    }
    if let Some(bad) = parts
        .iter()
        .find(|p| !p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
    {
        bail!("invalid tesseract language code '{}'", bad);
    }

    Ok(parts.join("+"))
}
