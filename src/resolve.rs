// src/resolve.rs
//! Cluster resolution: one survivor per connected cluster of confirmed pairs.
//!
//! Clusters are walked one at a time. For every member after the first, the
//! current canonical and the member are ranked by their live on-disk size,
//! re-read at that moment. The strictly larger one becomes canonical; the
//! other is deleted and then recorded in the audit log. A delete that
//! fails leaves the file in place and unlogged, and the run goes on. Files
//! that are already gone rank as 0 and are skipped when they lose, so re-running over a
//! partially reduced corpus removes nothing new.

use crate::audit_log::AuditLog;
use crate::candidates::DocId;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::union_find::UnionFind;
use crate::verify::ConfirmedMap;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Ranks documents when two members of a cluster compete for survival.
/// A candidate replaces the canonical only if its rank is strictly higher.
pub trait SurvivorPolicy {
    fn rank(&self, corpus: &Corpus, id: &str) -> u64;
}

/// Keeps the largest file on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestFile;

impl SurvivorPolicy for LargestFile {
    fn rank(&self, corpus: &Corpus, id: &str) -> u64 {
        corpus.live_size(id)
    }
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Removed ids, in removal order.
    pub removed: Vec<DocId>,
    /// Cluster survivors still present on disk.
    pub kept: BTreeSet<DocId>,
    pub clusters: usize,
    /// Losers that had already vanished.
    pub already_absent: usize,
    /// Losers that could not be deleted.
    pub failed: Vec<DocId>,
}

pub struct Resolver<'a, P: SurvivorPolicy = LargestFile> {
    corpus: &'a Corpus,
    log: Option<&'a mut AuditLog>,
    policy: P,
    removed: HashSet<DocId>,
}

impl<'a> Resolver<'a, LargestFile> {
    /// A resolver that deletes losers and records them in `log`.
    pub fn new(corpus: &'a Corpus, log: &'a mut AuditLog) -> Self {
        Self {
            corpus,
            log: Some(log),
            policy: LargestFile,
            removed: HashSet::new(),
        }
    }

    /// A resolver that only plans removals; nothing is deleted or logged.
    #[must_use]
    pub fn dry_run(corpus: &'a Corpus) -> Self {
        Self {
            corpus,
            log: None,
            policy: LargestFile,
            removed: HashSet::new(),
        }
    }
}

impl<'a, P: SurvivorPolicy> Resolver<'a, P> {
    /// Swaps the survivor heuristic.
    pub fn with_policy<Q: SurvivorPolicy>(self, policy: Q) -> Resolver<'a, Q> {
        Resolver {
            corpus: self.corpus,
            log: self.log,
            policy,
            removed: self.removed,
        }
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.log.is_none()
    }

    /// Resolves every cluster formed by pairs scoring at least `threshold`.
    ///
    /// # Errors
    /// Returns error if the audit log cannot be written.
    pub fn resolve(&mut self, confirmed: &ConfirmedMap, threshold: u8) -> Result<Resolution> {
        let clusters = clusters(confirmed, threshold);
        let mut resolution = Resolution {
            clusters: clusters.len(),
            ..Resolution::default()
        };

        for members in clusters {
            let mut canonical = members[0].clone();
            for candidate in &members[1..] {
                let canonical_rank = self.rank(&canonical);
                let candidate_rank = self.rank(candidate);
                if candidate_rank > canonical_rank {
                    let loser = std::mem::replace(&mut canonical, candidate.clone());
                    self.discard(&loser, &mut resolution)?;
                } else {
                    self.discard(candidate, &mut resolution)?;
                }
            }
            if self.is_present(&canonical) {
                resolution.kept.insert(canonical);
            }
        }

        tracing::info!(
            clusters = resolution.clusters,
            removed = resolution.removed.len(),
            kept = resolution.kept.len(),
            "finished cluster resolution"
        );
        Ok(resolution)
    }

    fn is_present(&self, id: &str) -> bool {
        !self.removed.contains(id) && self.corpus.exists(id)
    }

    fn rank(&self, id: &str) -> u64 {
        if self.removed.contains(id) {
            return 0;
        }
        self.policy.rank(self.corpus, id)
    }

    fn discard(&mut self, id: &str, resolution: &mut Resolution) -> Result<()> {
        if !self.is_present(id) {
            resolution.already_absent += 1;
            return Ok(());
        }
        let Some(log) = self.log.as_deref_mut() else {
            tracing::info!(file = %id, "would remove near-duplicate");
            self.removed.insert(id.to_string());
            resolution.removed.push(id.to_string());
            return Ok(());
        };
        match self.corpus.remove(id) {
            Ok(true) => log.record(id)?,
            Ok(false) => {
                tracing::debug!(file = %id, "vanished before delete");
                resolution.already_absent += 1;
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(file = %id, error = %e, "could not delete near-duplicate, left in place");
                resolution.failed.push(id.to_string());
                return Ok(());
            }
        }
        tracing::info!(file = %id, "removed near-duplicate");
        self.removed.insert(id.to_string());
        resolution.removed.push(id.to_string());
        Ok(())
    }
}

/// Connected components over pairs scoring at least `threshold`; members
/// sorted by id, clusters ordered by their smallest member.
#[must_use]
pub fn clusters(confirmed: &ConfirmedMap, threshold: u8) -> Vec<Vec<DocId>> {
    let min_score = f64::from(threshold);
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for (id, others) in confirmed {
        ids.insert(id.as_str());
        ids.extend(others.iter().map(|(o, _)| o.as_str()));
    }
    let ids: Vec<&str> = ids.into_iter().collect();
    let index: BTreeMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut uf = UnionFind::new(ids.len());
    for (id, others) in confirmed {
        for (other, score) in others {
            if *score >= min_score && id != other {
                uf.union(index[id.as_str()], index[other.as_str()]);
            }
        }
    }

    uf.clusters()
        .into_iter()
        .map(|group| group.into_iter().map(|i| ids[i].to_string()).collect())
        .collect()
}
