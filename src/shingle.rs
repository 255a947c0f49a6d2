// src/shingle.rs
//! Shingle extraction: fixed-length overlapping windows over a document.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a shingle window counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShingleUnit {
    /// Whitespace-separated tokens, re-joined with a single space.
    #[default]
    Word,
    /// Unicode scalar values.
    Char,
}

/// Returns every contiguous window of `k` units in `text`.
///
/// Texts shorter than `k` units (and `k == 0`) produce an empty set.
#[must_use]
pub fn shingles(text: &str, k: usize, unit: ShingleUnit) -> HashSet<String> {
    if k == 0 {
        return HashSet::new();
    }
    match unit {
        ShingleUnit::Word => {
            let words: Vec<&str> = text.split_whitespace().collect();
            if words.len() < k {
                return HashSet::new();
            }
            words.windows(k).map(|w| w.join(" ")).collect()
        }
        ShingleUnit::Char => {
            let chars: Vec<char> = text.chars().collect();
            if chars.len() < k {
                return HashSet::new();
            }
            chars.windows(k).map(|w| w.iter().collect()).collect()
        }
    }
}
