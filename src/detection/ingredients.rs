// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Locating the ingredient list inside a full label

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Headings that open an ingredient list (already lowercased, no accents)
const INGREDIENT_KEYWORDS: &[&str] = &[
    "ingredientes",
    "ingredients",
    "ingrediente",
    "ingredient",
    "composicao",
    "composition",
];

/// Return the text from the first line naming an ingredient heading onwards
///
/// Keyword lookup ignores case and Portuguese accents. When no heading is
/// found the whole text is returned unchanged.
pub fn extract_ingredients_section(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let folded = fold_line(line);
        if INGREDIENT_KEYWORDS.iter().any(|k| folded.contains(k)) {
            return &text[offset..];
        }
        offset += line.len();
    }
    text
}

/// Lowercase and strip combining marks after canonical decomposition
fn fold_line(line: &str) -> String {
    line.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
