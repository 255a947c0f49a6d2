// src/fuzzy.rs
//! Indel-normalized similarity ratio.
//!
//! `ratio(a, b) = 100 * 2 * LCS(a, b) / (|a| + |b|)`, where lengths count
//! Unicode scalar values. The longest common subsequence is computed with the
//! bit-parallel algorithm of Hyyrö, 64 positions of `a` per machine word.

use std::collections::HashMap;

const WORD: usize = 64;

/// Similarity in `[0, 100]`. Two empty strings are identical (100).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let lcs = lcs_len(&a, &b);
    100.0 * (2 * lcs) as f64 / total as f64
}

/// Indel distance: insertions plus deletions turning `a` into `b`.
#[must_use]
pub fn indel_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    a.len() + b.len() - 2 * lcs_len(&a, &b)
}

/// Length of the longest common subsequence.
#[must_use]
pub fn lcs_len(a: &[char], b: &[char]) -> usize {
    // The shorter side is the bit pattern; LCS is symmetric.
    let (pattern, text) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if pattern.is_empty() {
        return 0;
    }

    let words = (pattern.len() + WORD - 1) / WORD;
    let mut masks: HashMap<char, Vec<u64>> = HashMap::new();
    for (i, &c) in pattern.iter().enumerate() {
        masks.entry(c).or_insert_with(|| vec![0; words])[i / WORD] |= 1 << (i % WORD);
    }

    let mut v = vec![u64::MAX; words];
    for c in text {
        let Some(m) = masks.get(c) else {
            continue;
        };
        let mut carry = false;
        for (vw, &mw) in v.iter_mut().zip(m) {
            let u = *vw & mw;
            let (sum, c1) = vw.overflowing_add(u);
            let (sum, c2) = sum.overflowing_add(u64::from(carry));
            carry = c1 || c2;
            *vw = sum | (*vw - u);
        }
    }

    let tail = pattern.len() % WORD;
    v.iter()
        .enumerate()
        .map(|(w, &vw)| {
            let zeros = !vw;
            let zeros = if w == words - 1 && tail != 0 {
                zeros & ((1_u64 << tail) - 1)
            } else {
                zeros
            };
            zeros.count_ones() as usize
        })
        .sum()
}
