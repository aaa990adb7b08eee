// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OCR Engine Manager tests
//!
//! These tests verify that the OcrEngineManager:
//! - Starts with missing models or binaries instead of failing
//! - Reports both engine slots with their availability
//! - Picks up a working tesseract binary as the fallback

use bht_detector::{
    config::OcrConfig,
    vision::ocr::{EngineRole, OcrEngineManager},
};
use std::path::PathBuf;

#[cfg(test)]
mod engine_manager_tests {
    use super::*;

    #[test]
    fn test_missing_everything_degrades_gracefully() {
        let config = OcrConfig {
            model_dir: Some(PathBuf::from("/nonexistent/paddleocr-onnx")),
            tesseract_binary: Some("/nonexistent/bin/tesseract".to_string()),
            ..OcrConfig::default()
        };

        let manager = OcrEngineManager::load(&config);
        assert!(!manager.engines().has_any());

        let listed = manager.list_engines();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|e| !e.available));
    }

    #[test]
    fn test_model_dir_without_models() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            model_dir: Some(dir.path().to_path_buf()),
            tesseract_binary: None,
            ..OcrConfig::default()
        };

        let manager = OcrEngineManager::load(&config);
        assert!(!manager.has_primary());
    }

    #[cfg(unix)]
    #[test]
    fn test_working_tesseract_becomes_fallback() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("tesseract");
        std::fs::write(&binary, "#!/bin/sh\necho 'tesseract 5.3.4'\n").unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = OcrConfig {
            model_dir: None,
            tesseract_binary: Some(binary.to_string_lossy().into_owned()),
            ..OcrConfig::default()
        };

        let manager = OcrEngineManager::load(&config);
        assert!(!manager.has_primary());
        assert!(manager.has_fallback());

        let fallback = manager
            .list_engines()
            .into_iter()
            .find(|e| e.role == EngineRole::Fallback)
            .unwrap();
        assert_eq!(fallback.name, "tesseract");
        assert!(fallback.available);
    }
}
