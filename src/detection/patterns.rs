// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Marker patterns for BHT (butylated hydroxytoluene, E320 / INS 320)
//!
//! A [`PatternSet`] is an ordered, immutable list of compiled regular
//! expressions. Order matters: the matcher reports matches pattern by pattern.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while compiling a custom pattern set
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Invalid marker pattern '{label}': {source}")]
    InvalidRegex {
        label: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern set is empty")]
    Empty,
}

/// How strongly a single pattern indicates the additive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Custom patterns with no known tier
    Weak,
    /// Bare abbreviation ("BHT")
    Abbreviation,
    /// Full chemical name or E/INS number
    Definitive,
}

/// One compiled textual form of the marker
#[derive(Debug, Clone)]
pub struct MarkerPattern {
    label: String,
    regex: Regex,
    strength: Strength,
}

impl MarkerPattern {
    /// Compile a case-insensitive marker pattern
    pub fn new(label: &str, pattern: &str, strength: Strength) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternError::InvalidRegex {
                label: label.to_string(),
                source,
            })?;

        Ok(Self {
            label: label.to_string(),
            regex,
            strength,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }
}

/// Default BHT markers: (label, regex, strength), in reporting order.
///
/// Some entries are redundant under case-insensitive matching (`\bBHT\b` and
/// `\bbht\b`, `\be\s*320\b` and `\bE\s*320\b`). They are kept, so a single
/// occurrence can be reported more than once.
const BHT_MARKERS: &[(&str, &str, Strength)] = &[
    ("code-upper", r"\bBHT\b", Strength::Abbreviation),
    ("code-lower", r"\bbht\b", Strength::Abbreviation),
    ("name-en", r"butylated\s+hydroxytoluene", Strength::Definitive),
    ("name-en-accented", r"butylat[eé]d\s+hydroxytoluene", Strength::Definitive),
    ("name-pt", r"butilado\s+hidroxitolueno", Strength::Definitive),
    ("name-pt-inverted", r"hidroxitolueno\s+butilado", Strength::Definitive),
    ("e-number-lower", r"\be\s*320\b", Strength::Definitive),
    ("e-number-upper", r"\bE\s*320\b", Strength::Definitive),
    ("ins-number", r"\bINS\s*320\b", Strength::Definitive),
    ("number-with-code", r"\b320\s*\(BHT\)", Strength::Definitive),
    ("antioxidant-pt", r"antioxidante\s+320", Strength::Definitive),
    ("antioxidant-abbrev", r"antiox\.\s*320", Strength::Definitive),
    ("preservative-pt", r"conservante\s+320", Strength::Definitive),
    ("preservative-alt", r"preservativo\s+320", Strength::Definitive),
];

static BHT_PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    let patterns = BHT_MARKERS
        .iter()
        .map(|(label, pattern, strength)| {
            MarkerPattern::new(label, pattern, *strength)
                .unwrap_or_else(|e| panic!("built-in marker pattern failed to compile: {}", e))
        })
        .collect();
    PatternSet {
        patterns: Arc::new(patterns),
    }
});

/// Ordered, immutable collection of marker patterns
///
/// Cloning is cheap; the compiled patterns are shared.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Arc<Vec<MarkerPattern>>,
}

impl PatternSet {
    /// The built-in BHT marker set (compiled once per process)
    pub fn bht() -> Self {
        BHT_PATTERNS.clone()
    }

    /// Build a set from already compiled patterns
    pub fn from_patterns(patterns: Vec<MarkerPattern>) -> Result<Self, PatternError> {
        if patterns.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self {
            patterns: Arc::new(patterns),
        })
    }

    /// Compile a custom set from `(label, regex)` pairs with no strength tier
    pub fn compile<'a, I>(entries: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let patterns = entries
            .into_iter()
            .map(|(label, pattern)| MarkerPattern::new(label, pattern, Strength::Weak))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_patterns(patterns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::bht()
    }
}
