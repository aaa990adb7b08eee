// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multi-pattern marker matching over free text

use tracing::debug;

use super::patterns::{PatternSet, Strength};
use super::result::{Confidence, Match};

/// Output of a single scan
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    pub matches: Vec<Match>,
    pub confidence: Confidence,
}

impl MatchReport {
    pub fn has_match(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Scans text against an ordered [`PatternSet`]
///
/// Every pattern runs independently over the whole text. Matches are
/// concatenated in pattern order, then in discovery order, with no
/// deduplication or re-sorting by offset.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    patterns: PatternSet,
}

impl PatternMatcher {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    /// Scan `text`, returning `(has_match, matches)`
    pub fn detect(&self, text: &str) -> (bool, Vec<Match>) {
        let report = self.scan(text);
        (report.has_match(), report.matches)
    }

    /// Scan `text` and grade the strongest pattern that fired
    pub fn scan(&self, text: &str) -> MatchReport {
        if text.is_empty() {
            return MatchReport {
                matches: Vec::new(),
                confidence: Confidence::None,
            };
        }

        let mut matches = Vec::new();
        let mut strongest: Option<Strength> = None;

        for pattern in self.patterns.iter() {
            let before = matches.len();
            for m in pattern.regex().find_iter(text) {
                matches.push(Match {
                    text: m.as_str().to_string(),
                    position: char_offset(text, m.start()),
                });
            }

            let found = matches.len() - before;
            if found > 0 {
                debug!("Pattern {} matched {} time(s)", pattern.label(), found);
                strongest = strongest.max(Some(pattern.strength()));
            }
        }

        MatchReport {
            matches,
            confidence: Confidence::from_strength(strongest),
        }
    }
}

/// Convert a byte offset from the regex engine into a character offset
fn char_offset(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}
