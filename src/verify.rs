// src/verify.rs
//! Precise verification of approximate candidates.
//!
//! Every pair is scored independently on the rayon pool. Workers only read
//! files; results are merged on the calling thread once all pairs are done.

use crate::candidates::{CandidateMap, DocId};
use crate::corpus::{Corpus, ReadFailure};
use crate::fuzzy;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Document id to the documents it was confirmed against, with scores.
pub type ConfirmedMap = BTreeMap<DocId, Vec<(DocId, f64)>>;

/// A candidate pair whose precise score reached the confirmation threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedPair {
    pub a: DocId,
    pub b: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyStats {
    pub pairs: usize,
    pub confirmed: usize,
    /// Pairs dropped because a file vanished or became unreadable.
    pub missing: usize,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyRun {
    pub confirmed: Vec<ConfirmedPair>,
    pub stats: VerifyStats,
}

impl VerifyRun {
    /// Both directions of every confirmed pair, each list sorted by id.
    #[must_use]
    pub fn confirmed_map(&self) -> ConfirmedMap {
        let mut map = ConfirmedMap::new();
        for pair in &self.confirmed {
            map.entry(pair.a.clone())
                .or_default()
                .push((pair.b.clone(), pair.score));
            map.entry(pair.b.clone())
                .or_default()
                .push((pair.a.clone(), pair.score));
        }
        for list in map.values_mut() {
            list.sort_by(|x, y| x.0.cmp(&y.0));
        }
        map
    }
}

/// Flattens a candidate map into unordered pairs `(a, b)` with `a < b`.
#[must_use]
pub fn candidate_pairs(candidates: &CandidateMap) -> Vec<(DocId, DocId)> {
    let mut pairs = BTreeSet::new();
    for (id, others) in candidates {
        for other in others {
            match id.cmp(other) {
                std::cmp::Ordering::Less => {
                    pairs.insert((id.clone(), other.clone()));
                }
                std::cmp::Ordering::Greater => {
                    pairs.insert((other.clone(), id.clone()));
                }
                std::cmp::Ordering::Equal => {}
            }
        }
    }
    pairs.into_iter().collect()
}

/// Scores every pair and keeps those at or above `threshold`.
#[must_use]
pub fn verify(corpus: &Corpus, pairs: &[(DocId, DocId)], threshold: u8) -> VerifyRun {
    let scored: Vec<Option<(usize, f64)>> = pairs
        .par_iter()
        .enumerate()
        .map(|(i, (a, b))| score_pair(corpus, a, b).map(|s| (i, s)))
        .collect();

    let mut run = VerifyRun {
        stats: VerifyStats {
            pairs: pairs.len(),
            ..VerifyStats::default()
        },
        ..VerifyRun::default()
    };
    for result in scored {
        let Some((i, score)) = result else {
            run.stats.missing += 1;
            continue;
        };
        if score >= f64::from(threshold) {
            let (a, b) = &pairs[i];
            run.confirmed.push(ConfirmedPair {
                a: a.clone(),
                b: b.clone(),
                score,
            });
        }
    }
    run.stats.confirmed = run.confirmed.len();

    tracing::info!(
        pairs = run.stats.pairs,
        confirmed = run.stats.confirmed,
        missing = run.stats.missing,
        "finished fuzzy verification"
    );
    run
}

/// Precise score of one pair, or `None` when either side cannot be read.
#[must_use]
pub fn score_pair(corpus: &Corpus, a: &str, b: &str) -> Option<f64> {
    let left = read_for_pair(corpus, a)?;
    let right = read_for_pair(corpus, b)?;
    Some(fuzzy::ratio(&left, &right))
}

fn read_for_pair(corpus: &Corpus, id: &str) -> Option<String> {
    match corpus.read_text(id) {
        Ok(text) => Some(text),
        Err(ReadFailure::Missing) => {
            tracing::debug!(file = %id, "file has been removed, pair dropped");
            None
        }
        Err(e) => {
            tracing::warn!(file = %id, reason = %e, "unreadable document, pair dropped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn corpus(files: &[(&str, &str)]) -> (tempfile::TempDir, Corpus) {
        let d = tempfile::tempdir().unwrap();
        for (name, body) in files {
            fs::write(d.path().join(name), body).unwrap();
        }
        let c = Corpus::open(d.path()).unwrap();
        (d, c)
    }

    #[test]
    fn pairs_are_unordered_and_deduplicated() {
        let mut map = CandidateMap::new();
        map.insert("a".into(), BTreeSet::from(["b".to_string(), "c".to_string()]));
        map.insert("b".into(), BTreeSet::from(["a".to_string()]));
        map.insert("c".into(), BTreeSet::from(["a".to_string()]));
        assert_eq!(
            candidate_pairs(&map),
            vec![
                ("a".to_string(), "b".to_string()),
                ("a".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn confirms_only_above_threshold() {
        let (_d, c) = corpus(&[
            ("a.txt", "the quick brown fox jumps over the lazy dog"),
            ("b.txt", "the quick brown fox jumps over the lazy cat"),
            ("c.txt", "entirely different words here"),
        ]);
        let pairs = vec![
            ("a.txt".to_string(), "b.txt".to_string()),
            ("a.txt".to_string(), "c.txt".to_string()),
        ];
        let run = verify(&c, &pairs, 80);
        assert_eq!(run.stats.pairs, 2);
        assert_eq!(run.confirmed.len(), 1);
        assert_eq!(run.confirmed[0].a, "a.txt");
        assert!(run.confirmed[0].score > 90.0);
    }

    #[test]
    fn scores_are_symmetric() {
        let (_d, c) = corpus(&[
            ("a.txt", "lorem ipsum dolor sit amet"),
            ("b.txt", "lorem ipsum dolor sit amet, consectetur"),
        ]);
        assert_eq!(
            score_pair(&c, "a.txt", "b.txt"),
            score_pair(&c, "b.txt", "a.txt")
        );
    }

    #[test]
    fn missing_file_drops_pair_without_failing_batch() {
        let (_d, c) = corpus(&[("a.txt", "same text"), ("b.txt", "same text")]);
        let pairs = vec![
            ("a.txt".to_string(), "b.txt".to_string()),
            ("a.txt".to_string(), "gone.txt".to_string()),
        ];
        let run = verify(&c, &pairs, 60);
        assert_eq!(run.stats.missing, 1);
        assert_eq!(run.stats.confirmed, 1);
        assert_eq!(run.confirmed[0].score, 100.0);
    }

    #[test]
    fn confirmed_map_lists_both_directions() {
        let run = VerifyRun {
            confirmed: vec![
                ConfirmedPair { a: "a".into(), b: "c".into(), score: 90.0 },
                ConfirmedPair { a: "a".into(), b: "b".into(), score: 95.0 },
            ],
            stats: VerifyStats::default(),
        };
        let map = run.confirmed_map();
        assert_eq!(
            map["a"],
            vec![("b".to_string(), 95.0), ("c".to_string(), 90.0)]
        );
        assert_eq!(map["b"], vec![("a".to_string(), 95.0)]);
        assert_eq!(map["c"], vec![("a".to_string(), 90.0)]);
    }
}
