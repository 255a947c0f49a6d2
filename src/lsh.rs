// src/lsh.rs
//! Banded locality-sensitive hashing over MinHash signatures.
//!
//! A signature of `num_perm` values is cut into `bands` slices of `rows`
//! values. Two signatures collide when at least one slice matches exactly, so
//! a pair with Jaccard `s` becomes a candidate with probability
//! `1 - (1 - s^rows)^bands`.

use crate::error::{DedupError, Result};
use crate::minhash::{Signature, SignatureError};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

const FALSE_POSITIVE_WEIGHT: f64 = 0.5;
const FALSE_NEGATIVE_WEIGHT: f64 = 0.5;
const INTEGRATION_STEPS: usize = 256;

/// Band/row split of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banding {
    pub bands: usize,
    pub rows: usize,
}

impl Banding {
    /// Probability that a pair with Jaccard `s` shares at least one band.
    #[must_use]
    pub fn collision_probability(self, s: f64) -> f64 {
        let bands = i32::try_from(self.bands).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.rows).unwrap_or(i32::MAX);
        1.0 - (1.0 - s.powi(rows)).powi(bands)
    }

    /// Weighted false positive + false negative area for threshold `t`.
    #[must_use]
    pub fn weighted_error(self, t: f64) -> f64 {
        let fp = integrate(|s| self.collision_probability(s), 0.0, t);
        let fn_ = integrate(|s| 1.0 - self.collision_probability(s), t, 1.0);
        FALSE_POSITIVE_WEIGHT * fp + FALSE_NEGATIVE_WEIGHT * fn_
    }

    /// Picks the divisor split of `num_perm` with the least weighted error at `threshold`.
    #[must_use]
    pub fn optimal(threshold: f64, num_perm: usize) -> Self {
        let mut best = Banding {
            bands: 1,
            rows: num_perm.max(1),
        };
        let mut best_err = f64::INFINITY;
        for bands in 1..=num_perm {
            if num_perm % bands != 0 {
                continue;
            }
            let candidate = Banding {
                bands,
                rows: num_perm / bands,
            };
            let err = candidate.weighted_error(threshold);
            if err < best_err {
                best_err = err;
                best = candidate;
            }
        }
        best
    }
}

/// Composite Simpson's rule.
#[allow(clippy::cast_precision_loss)]
fn integrate(f: impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    if b <= a {
        return 0.0;
    }
    let n = INTEGRATION_STEPS;
    let h = (b - a) / n as f64;
    let mut acc = f(a) + f(b);
    for i in 1..n {
        let x = a + h * i as f64;
        acc += if i % 2 == 0 { 2.0 } else { 4.0 } * f(x);
    }
    acc * h / 3.0
}

/// LSH index keyed by document id.
///
/// Inserting the whole corpus before querying keeps candidate sets symmetric.
/// Interleaving inserts with queries only finds documents inserted earlier.
#[derive(Debug, Clone)]
pub struct LshIndex<Id>
where
    Id: Eq + Hash + Clone,
{
    num_perm: usize,
    banding: Banding,
    tables: Vec<HashMap<Box<[u64]>, HashSet<Id>>>,
    ids: HashSet<Id>,
}

impl<Id> LshIndex<Id>
where
    Id: Eq + Hash + Clone,
{
    /// Creates an index whose banding is tuned for `threshold`.
    ///
    /// # Errors
    /// Returns [`DedupError::InvalidConfig`] for a threshold outside `(0, 1]`
    /// or fewer than two permutations.
    pub fn new(threshold: f64, num_perm: usize) -> Result<Self> {
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            return Err(DedupError::InvalidConfig(format!(
                "LSH threshold must lie in (0, 1], got {threshold}"
            )));
        }
        if num_perm < 2 {
            return Err(DedupError::InvalidConfig(format!(
                "LSH needs at least 2 permutations, got {num_perm}"
            )));
        }
        Ok(Self::from_banding(num_perm, Banding::optimal(threshold, num_perm)))
    }

    /// Creates an index with an explicit number of bands.
    ///
    /// # Errors
    /// Returns [`DedupError::InvalidConfig`] unless `bands` divides `num_perm`.
    pub fn with_bands(num_perm: usize, bands: usize) -> Result<Self> {
        if bands == 0 || num_perm == 0 || num_perm % bands != 0 {
            return Err(DedupError::InvalidConfig(format!(
                "num_perm ({num_perm}) must be a positive multiple of bands ({bands})"
            )));
        }
        let banding = Banding {
            bands,
            rows: num_perm / bands,
        };
        Ok(Self::from_banding(num_perm, banding))
    }

    fn from_banding(num_perm: usize, banding: Banding) -> Self {
        Self {
            num_perm,
            banding,
            tables: vec![HashMap::new(); banding.bands],
            ids: HashSet::new(),
        }
    }

    #[must_use]
    pub fn banding(&self) -> Banding {
        self.banding
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Adds a signature under `id`.
    ///
    /// Signatures of empty shingle sets are indexed too. Their sentinel
    /// values lie outside the permuted hash range, so they only ever share
    /// bands with each other.
    ///
    /// # Errors
    /// Rejects signatures of the wrong width.
    pub fn insert(&mut self, id: Id, signature: &Signature) -> std::result::Result<(), SignatureError> {
        self.ensure_width(signature)?;
        for (band, table) in self.tables.iter_mut().enumerate() {
            let key = band_key(signature.values(), band, self.banding.rows);
            table.entry(key).or_default().insert(id.clone());
        }
        self.ids.insert(id);
        Ok(())
    }

    /// Every indexed id sharing at least one band with `signature`.
    ///
    /// # Errors
    /// Rejects signatures of the wrong width.
    pub fn query(&self, signature: &Signature) -> std::result::Result<HashSet<Id>, SignatureError> {
        self.ensure_width(signature)?;
        let mut found = HashSet::new();
        for (band, table) in self.tables.iter().enumerate() {
            let start = band * self.banding.rows;
            let slice = &signature.values()[start..start + self.banding.rows];
            if let Some(bucket) = table.get(slice) {
                found.extend(bucket.iter().cloned());
            }
        }
        Ok(found)
    }

    /// Like [`LshIndex::query`] with `own` removed from the result.
    ///
    /// # Errors
    /// Rejects signatures of the wrong width.
    pub fn query_excluding(
        &self,
        own: &Id,
        signature: &Signature,
    ) -> std::result::Result<HashSet<Id>, SignatureError> {
        let mut found = self.query(signature)?;
        found.remove(own);
        Ok(found)
    }

    fn ensure_width(&self, signature: &Signature) -> std::result::Result<(), SignatureError> {
        if signature.len() != self.num_perm {
            return Err(SignatureError::LengthMismatch {
                expected: self.num_perm,
                found: signature.len(),
            });
        }
        Ok(())
    }
}

fn band_key(values: &[u64], band: usize, rows: usize) -> Box<[u64]> {
    let start = band * rows;
    values[start..start + rows].into()
}
