// src/cli.rs
use crate::config::DedupConfig;
use crate::pipeline::{self, Source};
use crate::reporting;
use crate::shingle::ShingleUnit;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "neardup",
    version,
    about = "Find and remove near-duplicate text files with MinHash, LSH and fuzzy matching"
)]
pub struct Cli {
    /// Directory containing the documents
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,
    /// TOML config file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// MinHash LSH similarity threshold, in (0, 1]
    #[arg(long)]
    pub minhash_threshold: Option<f64>,
    /// Fuzzy score (0-100) needed to confirm a candidate pair
    #[arg(long)]
    pub fuzzy_threshold: Option<u8>,
    /// Number of MinHash permutations
    #[arg(long)]
    pub num_perm: Option<usize>,
    /// Fuzzy score (0-100) needed to remove a duplicate
    #[arg(long)]
    pub dedup_threshold: Option<u8>,
    /// Directory for results and removal logs
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Save confirmed duplicates as JSON
    #[arg(long)]
    pub save_results: bool,
    /// Name (without extension) of the JSON results file
    #[arg(long)]
    pub output_filename: Option<String>,
    #[arg(long)]
    pub shingle_size: Option<usize>,
    #[arg(long, value_enum)]
    pub shingle_unit: Option<ShingleUnit>,
    /// Seed of the MinHash permutation family
    #[arg(long)]
    pub seed: Option<u64>,
    /// Worker threads (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,
    /// Resolve from a saved JSON results file instead of scanning
    #[arg(long, value_name = "FILE")]
    pub from_results: Option<PathBuf>,
    /// Leave zero-byte files in place
    #[arg(long)]
    pub keep_empty: bool,
    /// Report what would be removed without deleting anything
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the effective configuration: file (or defaults), then flags.
    ///
    /// # Errors
    /// Returns error if the config file cannot be loaded.
    pub fn to_config(&self) -> Result<DedupConfig> {
        let mut config = match &self.config {
            Some(path) => DedupConfig::load(path)?,
            None => DedupConfig::default(),
        };
        if let Some(v) = self.minhash_threshold {
            config.minhash_threshold = v;
        }
        if let Some(v) = self.fuzzy_threshold {
            config.fuzzy_threshold = v;
        }
        if let Some(v) = self.num_perm {
            config.num_perm = v;
        }
        if let Some(v) = self.dedup_threshold {
            config.dedup_threshold = v;
        }
        if let Some(v) = &self.output_dir {
            config.output_dir.clone_from(v);
        }
        if let Some(v) = &self.output_filename {
            config.output_filename.clone_from(v);
        }
        if let Some(v) = self.shingle_size {
            config.shingle_size = v;
        }
        if let Some(v) = self.shingle_unit {
            config.shingle_unit = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.threads {
            config.threads = v;
        }
        config.save_results |= self.save_results;
        config.dry_run |= self.dry_run;
        if self.keep_empty {
            config.remove_empty = false;
        }
        Ok(config)
    }

    #[must_use]
    pub fn source(&self) -> Source {
        self.from_results
            .clone()
            .map_or(Source::Detect, Source::SavedResults)
    }
}

/// Runs the pipeline for parsed arguments and prints the summary.
///
/// # Errors
/// Returns error for invalid input or fatal I/O failures.
pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.to_config()?;
    let summary = pipeline::run(&cli.corpus, &config, &cli.source())
        .with_context(|| format!("deduplicating {}", cli.corpus.display()))?;
    reporting::print_summary(&summary);
    Ok(())
}
