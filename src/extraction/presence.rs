//! Approximate check that a value appears in a source text.
//!
//! Both sides are NFKC-normalized, lowercased and stripped of whitespace
//! and punctuation. A value is present if it is then a substring of the
//! source, or if at least 80% of its character bigrams occur in the source.

use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

const BIGRAM_COVERAGE_THRESHOLD: f64 = 0.8;

pub fn normalize(text: &str) -> String {
    text.nfkc()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn bigrams(chars: &[char]) -> impl Iterator<Item = (char, char)> + '_ {
    chars.windows(2).map(|pair| (pair[0], pair[1]))
}

pub fn bigram_coverage(value: &str, source: &str) -> f64 {
    let value: Vec<char> = value.chars().collect();
    let source: Vec<char> = source.chars().collect();
    if value.len() < 2 {
        return 0.0;
    }
    let source_bigrams: HashSet<(char, char)> = bigrams(&source).collect();
    let total = value.len() - 1;
    let hits = bigrams(&value)
        .filter(|pair| source_bigrams.contains(pair))
        .count();
    hits as f64 / total as f64
}

pub fn is_present_in(value: &str, source: &str) -> bool {
    let value = normalize(value);
    if value.is_empty() {
        return true;
    }
    let source = normalize(source);
    if source.contains(&value) {
        return true;
    }
    bigram_coverage(&value, &source) >= BIGRAM_COVERAGE_THRESHOLD
}
