// src/minhash.rs
//! MinHash signatures over shingle sets.
//!
//! Each permutation is a universal hash `((a * x + b) mod p) & 0xFFFF_FFFF`
//! over a 32-bit base hash of the shingle, with `p = 2^61 - 1`. The `(a, b)`
//! pairs are derived from a fixed seed, so every document in a run (and every
//! run with the same seed) is hashed by the same family.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;

/// Mersenne prime modulus of the permutation family.
pub const MERSENNE_PRIME: u64 = (1 << 61) - 1;
/// Largest value a permuted hash can take.
pub const MAX_HASH: u64 = (1 << 32) - 1;
/// Signature value for permutations that saw no shingle.
pub const EMPTY_SLOT: u64 = u64::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature length {found} does not match expected {expected}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Fixed-length MinHash signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    values: Vec<u64>,
}

impl Signature {
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the signature came from an empty shingle set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|&v| v == EMPTY_SLOT)
    }

    /// Estimated Jaccard similarity: fraction of agreeing positions.
    ///
    /// # Errors
    /// Returns [`SignatureError::LengthMismatch`] for signatures of different width.
    #[allow(clippy::cast_precision_loss)]
    pub fn jaccard(&self, other: &Signature) -> Result<f64, SignatureError> {
        if self.values.len() != other.values.len() {
            return Err(SignatureError::LengthMismatch {
                expected: self.values.len(),
                found: other.values.len(),
            });
        }
        if self.values.is_empty() {
            return Ok(1.0);
        }
        let matches = self
            .values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a == b)
            .count();
        Ok(matches as f64 / self.values.len() as f64)
    }
}

/// The pinned permutation functions shared by every document of a run.
#[derive(Debug, Clone)]
pub struct PermutationFamily {
    coefficients: Vec<(u64, u64)>,
}

impl PermutationFamily {
    /// Derives `num_perm` permutations from `seed`.
    #[must_use]
    pub fn new(num_perm: usize, seed: u64) -> Self {
        let mut state = seed;
        let coefficients = (0..num_perm)
            .map(|_| {
                let a = next_u64(&mut state) % (MERSENNE_PRIME - 1) + 1;
                let b = next_u64(&mut state) % MERSENNE_PRIME;
                (a, b)
            })
            .collect();
        Self { coefficients }
    }

    #[must_use]
    pub fn num_perm(&self) -> usize {
        self.coefficients.len()
    }

    /// Computes the signature of a shingle set.
    #[must_use]
    pub fn signature(&self, shingles: &HashSet<String>) -> Signature {
        let mut values = vec![EMPTY_SLOT; self.coefficients.len()];
        for shingle in shingles {
            let x = base_hash(shingle.as_bytes());
            for (slot, &(a, b)) in values.iter_mut().zip(&self.coefficients) {
                let h = permute(a, b, x);
                if h < *slot {
                    *slot = h;
                }
            }
        }
        Signature { values }
    }
}

/// First four bytes of SHA-256, little endian.
#[must_use]
pub fn base_hash(bytes: &[u8]) -> u64 {
    let digest = Sha256::digest(bytes);
    u64::from(u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

fn permute(a: u64, b: u64, x: u64) -> u64 {
    let v = (u128::from(a) * u128::from(x) + u128::from(b)) % u128::from(MERSENNE_PRIME);
    #[allow(clippy::cast_possible_truncation)]
    let v = v as u64;
    v & MAX_HASH
}

/// SplitMix64 step.
fn next_u64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
