// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Textual marker detection
//!
//! - `patterns` - compiled marker pattern sets
//! - `matcher` - ordered multi-pattern scanning with character offsets
//! - `result` - uniform detection result types
//! - `ingredients` - ingredient-list extraction from full label text

pub mod ingredients;
pub mod matcher;
pub mod patterns;
pub mod result;

pub use ingredients::extract_ingredients_section;
pub use matcher::{MatchReport, PatternMatcher};
pub use patterns::{MarkerPattern, PatternError, PatternSet, Strength};
pub use result::{AnalysisStatus, Confidence, DetectionMethod, DetectionResult, Match};
