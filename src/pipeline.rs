// src/pipeline.rs
//! End-to-end run: pre-pass, candidates, verification, resolution.
//!
//! Verification finishes completely before the resolver deletes anything.

use crate::audit_log::AuditLog;
use crate::candidates::{self, CandidateStats};
use crate::config::DedupConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::resolve::{Resolution, Resolver};
use crate::results;
use crate::verify::{self, ConfirmedMap, VerifyStats};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where the confirmed map comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Run MinHash/LSH and fuzzy verification over the corpus.
    Detect,
    /// Reuse a JSON map saved by an earlier run.
    SavedResults(PathBuf),
}

/// Everything a run did, for reporting.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub empty_removed: Vec<String>,
    pub candidates: CandidateStats,
    pub candidate_pairs: usize,
    pub verify: VerifyStats,
    pub confirmed: ConfirmedMap,
    pub results_path: Option<PathBuf>,
    pub resolution: Resolution,
    pub dry_run: bool,
    pub duration_ms: u128,
}

impl RunSummary {
    /// Documents that could not be used at some stage.
    #[must_use]
    pub fn skipped_or_missing(&self) -> usize {
        self.candidates.skipped + self.verify.missing + self.resolution.already_absent
    }
}

/// Runs the full pipeline over `corpus_dir`.
///
/// # Errors
/// Returns input errors (bad config, missing corpus) before any work, and
/// fatal I/O errors on output artifacts. Per-document problems are logged
/// and counted instead.
pub fn run(corpus_dir: &Path, config: &DedupConfig, source: &Source) -> Result<RunSummary> {
    config.validate()?;
    let corpus = Corpus::open(corpus_dir)?;
    let start = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let mut summary = RunSummary {
        dry_run: config.dry_run,
        ..RunSummary::default()
    };

    if config.remove_empty && !config.dry_run {
        let mut empty_log = AuditLog::open(&config.empty_log_path())?;
        summary.empty_removed = corpus.remove_empty_files(&mut empty_log)?;
    }

    let confirmed = match source {
        Source::SavedResults(path) => {
            tracing::info!(path = %path.display(), "resolving from saved results");
            results::load(path)?
        }
        Source::Detect => pool.install(|| detect(&corpus, config, &mut summary))?,
    };
    summary.confirmed = confirmed;

    if config.save_results && matches!(source, Source::Detect) {
        let path = config.results_path();
        results::save(&summary.confirmed, &path)?;
        summary.results_path = Some(path);
    }

    summary.resolution = if config.dry_run {
        Resolver::dry_run(&corpus).resolve(&summary.confirmed, config.dedup_threshold)?
    } else {
        let mut track = AuditLog::open(&config.track_path())?;
        Resolver::new(&corpus, &mut track).resolve(&summary.confirmed, config.dedup_threshold)?
    };

    summary.duration_ms = start.elapsed().as_millis();
    Ok(summary)
}

/// Candidate search followed by precise verification.
///
/// # Errors
/// Returns error if the corpus cannot be listed.
pub fn detect(
    corpus: &Corpus,
    config: &DedupConfig,
    summary: &mut RunSummary,
) -> Result<ConfirmedMap> {
    let run = candidates::find_candidates(corpus, config)?;
    let pairs = verify::candidate_pairs(&run.candidates);
    summary.candidates = run.stats;
    summary.candidate_pairs = pairs.len();

    let verified = verify::verify(corpus, &pairs, config.fuzzy_threshold);
    summary.verify = verified.stats;
    Ok(verified.confirmed_map())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn invalid_config_fails_before_touching_corpus() {
        let d = tempfile::tempdir().unwrap();
        fs::write(d.path().join("empty.txt"), "").unwrap();
        let config = DedupConfig {
            num_perm: 1,
            output_dir: d.path().join("out"),
            ..DedupConfig::default()
        };
        assert!(run(d.path(), &config, &Source::Detect).is_err());
        assert!(d.path().join("empty.txt").exists());
    }

    #[test]
    fn dry_run_keeps_every_file() {
        let d = tempfile::tempdir().unwrap();
        let corpus_dir = d.path().join("corpus");
        fs::create_dir(&corpus_dir).unwrap();
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        fs::write(corpus_dir.join("a.txt"), text).unwrap();
        fs::write(corpus_dir.join("b.txt"), text).unwrap();
        fs::write(corpus_dir.join("empty.txt"), "").unwrap();
        let config = DedupConfig {
            shingle_size: 3,
            dry_run: true,
            output_dir: d.path().join("out"),
            ..DedupConfig::default()
        };
        let summary = run(&corpus_dir, &config, &Source::Detect).unwrap();
        assert_eq!(summary.resolution.removed, vec!["b.txt"]);
        assert!(summary.empty_removed.is_empty());
        assert!(corpus_dir.join("a.txt").exists());
        assert!(corpus_dir.join("b.txt").exists());
        assert!(corpus_dir.join("empty.txt").exists());
    }
}
