// src/candidates.rs
//! Approximate candidate discovery: shingles, signatures, LSH.

use crate::config::DedupConfig;
use crate::corpus::{Corpus, ReadFailure};
use crate::error::Result;
use crate::lsh::{Banding, LshIndex};
use crate::minhash::{PermutationFamily, Signature};
use crate::shingle::shingles;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

pub type DocId = String;

/// Document id to the other documents it shares at least one LSH band with.
pub type CandidateMap = BTreeMap<DocId, BTreeSet<DocId>>;

/// Counters for one candidate pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateStats {
    pub documents: usize,
    pub indexed: usize,
    /// Too short to produce a single shingle. These are still indexed and
    /// can only become candidates of each other.
    pub too_short: usize,
    /// Unreadable, vanished or not UTF-8.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct CandidateRun {
    pub candidates: CandidateMap,
    pub banding: Banding,
    pub stats: CandidateStats,
}

impl CandidateRun {
    /// Number of unordered candidate pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.candidates
            .iter()
            .map(|(id, others)| others.iter().filter(|o| *o > id).count())
            .sum()
    }
}

/// Finds approximate duplicates across the whole corpus.
///
/// Every signature is inserted before any query runs, so the result is
/// symmetric. Documents without candidates are left out.
///
/// # Errors
/// Returns error if the corpus cannot be listed or the LSH parameters are invalid.
pub fn find_candidates(corpus: &Corpus, config: &DedupConfig) -> Result<CandidateRun> {
    let ids = corpus.document_ids()?;
    let family = PermutationFamily::new(config.num_perm, config.seed);
    let mut index = LshIndex::new(config.minhash_threshold, config.num_perm)?;
    let banding = index.banding();
    tracing::debug!(
        bands = banding.bands,
        rows = banding.rows,
        "LSH banding selected"
    );

    let signed: Vec<(DocId, Option<Signature>)> = ids
        .into_par_iter()
        .map(|id| {
            let sig = signature_for(corpus, &id, &family, config);
            (id, sig)
        })
        .collect();

    let mut stats = CandidateStats {
        documents: signed.len(),
        ..CandidateStats::default()
    };

    let mut indexed: Vec<(&DocId, &Signature)> = Vec::with_capacity(signed.len());
    for (id, sig) in &signed {
        let Some(sig) = sig else {
            stats.skipped += 1;
            continue;
        };
        if sig.is_empty() {
            tracing::debug!(file = %id, "too short to shingle");
            stats.too_short += 1;
        }
        index.insert(id.clone(), sig)?;
        indexed.push((id, sig));
    }
    stats.indexed = index.len();

    let mut candidates = CandidateMap::new();
    for (id, sig) in indexed {
        let others = index.query_excluding(id, sig)?;
        if others.is_empty() {
            continue;
        }
        candidates.insert(id.clone(), others.into_iter().collect());
    }

    tracing::info!(
        documents = stats.documents,
        with_candidates = candidates.len(),
        "finished MinHash candidate search"
    );
    Ok(CandidateRun {
        candidates,
        banding,
        stats,
    })
}

fn signature_for(
    corpus: &Corpus,
    id: &str,
    family: &PermutationFamily,
    config: &DedupConfig,
) -> Option<Signature> {
    match corpus.read_text(id) {
        Ok(text) => {
            let set = shingles(&text, config.shingle_size, config.shingle_unit);
            Some(family.signature(&set))
        }
        Err(ReadFailure::Missing) => {
            tracing::warn!(file = %id, "file vanished before signing, skipped");
            None
        }
        Err(e) => {
            tracing::warn!(file = %id, reason = %e, "unreadable document skipped");
            None
        }
    }
}
