//! Turkish-aware text normalization
//!
//! Every comparison of document text against markers, keywords or expected
//! values goes through [`fold`] (see [`shared_types::text`] for the folding
//! table), so that `İÇİNDEKİLER`, `İçindekiler` and `icindekiler` compare
//! equal. This module adds casing helpers and folded regex markers on top.

use regex::Regex;
use tracing::warn;

pub use shared_types::text::{collapse_whitespace, fold, fold_pattern};

use crate::error::CheckError;

/// Turkish-aware uppercase (`i` → `İ`, `ı` → `I`)
pub fn turkish_upper(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'i' => out.push('İ'),
            'ı' => out.push('I'),
            _ => out.extend(c.to_uppercase()),
        }
    }
    out
}

/// True when the text has letters and none of them is lowercase
pub fn is_upper(text: &str) -> bool {
    let mut has_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            has_letter = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_letter
}

/// Folded equality
pub fn same_text(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Compile one marker against folded text.
///
/// A pattern that is not a valid regex is retried as an escaped literal so
/// that a typo in the rule book degrades to a plain substring search.
pub fn compile_marker(pattern: &str) -> Result<Regex, CheckError> {
    let folded = fold_pattern(pattern);
    match Regex::new(&folded) {
        Ok(re) => Ok(re),
        Err(err) => {
            warn!(pattern, error = %err, "invalid marker regex, matching literally");
            Regex::new(&regex::escape(&fold(pattern))).map_err(|source| {
                CheckError::InvalidMarker {
                    pattern: pattern.to_string(),
                    source,
                }
            })
        }
    }
}

/// A compiled set of alternative markers
#[derive(Debug, Clone, Default)]
pub struct Markers {
    patterns: Vec<Regex>,
}

impl Markers {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, CheckError> {
        let patterns = patterns
            .iter()
            .map(|p| compile_marker(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Does any marker match the folded text?
    pub fn matches(&self, text: &str) -> bool {
        let folded = fold(text);
        self.patterns.iter().any(|re| re.is_match(&folded))
    }
}
