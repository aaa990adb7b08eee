// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text-mode detection tests
//!
//! These tests verify that DetectionPipeline::text_mode:
//! - Finds every textual form of the marker
//! - Reports character offsets, not byte offsets
//! - Keeps pattern order and duplicates
//! - Never flags unrelated text

use bht_detector::{
    config::DetectorConfig,
    detection::{AnalysisStatus, Confidence, DetectionMethod},
    DetectionPipeline, OcrEngines,
};

fn pipeline() -> DetectionPipeline {
    DetectionPipeline::from_config(&DetectorConfig::default(), OcrEngines::none())
}

#[cfg(test)]
mod text_mode_tests {
    use super::*;

    #[test]
    fn test_abbreviation_any_case() {
        for text in ["BHT", "bht", "Bht", "contém bHt."] {
            let result = pipeline().text_mode(text);
            assert!(result.has_match, "{:?} should match", text);
            assert_eq!(result.method, DetectionMethod::Text);
            assert_eq!(result.status, AnalysisStatus::Complete);
        }
    }

    #[test]
    fn test_abbreviation_inside_word_ignored() {
        let result = pipeline().text_mode("ALBHTX, farinha de trigo");
        assert!(!result.has_match);
        assert!(result.matches.is_empty());
        assert_eq!(result.confidence, Confidence::None);
    }

    #[test]
    fn test_e_number_with_space() {
        let text = "contains E 320 additive";
        let result = pipeline().text_mode(text);
        assert!(result.has_match);
        assert!(result.matches.iter().any(|m| m.text.contains("320")));
        for m in &result.matches {
            assert_eq!(m.position, 9);
            assert_eq!(m.text, "E 320");
        }
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_full_portuguese_label() {
        let text = "INGREDIENTES: farinha de trigo, açúcar, gordura vegetal, \
                    antioxidante 320, conservante 320, hidroxitolueno butilado.";
        let result = pipeline().text_mode(text);
        assert!(result.has_match);

        let texts: Vec<&str> = result.matches.iter().map(|m| m.text.as_str()).collect();
        assert!(texts.contains(&"hidroxitolueno butilado"));
        assert!(texts.contains(&"antioxidante 320"));
        assert!(texts.contains(&"conservante 320"));
        let antioxidant = result
            .matches
            .iter()
            .find(|m| m.text == "antioxidante 320")
            .unwrap();
        assert_eq!(antioxidant.position, 57);
    }

    #[test]
    fn test_positions_are_character_offsets() {
        let text = "Açúcar, óleo, BHT";
        let result = pipeline().text_mode(text);
        let position = result.matches[0].position;
        let prefix: String = text.chars().take(position).collect();
        assert_eq!(prefix, "Açúcar, óleo, ");
        assert_eq!(position, 14);
    }

    #[test]
    fn test_matches_follow_pattern_order() {
        // E-number appears first in the text, but the abbreviation pattern
        // comes first in the pattern set
        let result = pipeline().text_mode("E320 e BHT");
        assert_eq!(result.matches[0].text, "BHT");
        assert_eq!(result.matches.last().map(|m| m.text.as_str()), Some("E320"));
    }

    #[test]
    fn test_redundant_patterns_keep_duplicates() {
        let result = pipeline().text_mode("BHT");
        // both bare-code patterns fire on the same span
        assert_eq!(result.matches.len(), 2);
        assert!(result.matches.iter().all(|m| m.position == 0));
    }

    #[test]
    fn test_empty_and_unrelated_text() {
        for text in ["", "   ", "Ingredientes: água, sal, E330, INS 330"] {
            let result = pipeline().text_mode(text);
            assert!(!result.has_match, "{:?} should not match", text);
            assert!(!result.is_degraded());
        }
    }

    #[test]
    fn test_has_match_agrees_with_matches() {
        for text in ["BHT", "nada", "butylated hydroxytoluene", "320 (BHT)"] {
            let result = pipeline().text_mode(text);
            assert_eq!(result.has_match, !result.matches.is_empty());
        }
    }
}

