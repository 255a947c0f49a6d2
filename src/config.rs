// src/config.rs
use crate::error::{DedupError, Result};
use crate::shingle::ShingleUnit;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the append-only removal record inside `output_dir`.
pub const TRACK_FILE: &str = "dedup_track.txt";
/// File name of the empty-file pre-pass record inside `output_dir`.
pub const EMPTY_FILES_LOG: &str = "empty_files.txt";

/// Run configuration. Every field has a default so a partial TOML file works.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// LSH candidate threshold (estimated Jaccard), in `(0, 1]`.
    #[serde(default = "default_minhash_threshold")]
    pub minhash_threshold: f64,
    /// Precise confirmation threshold on the 0-100 fuzzy scale.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
    /// Signature length.
    #[serde(default = "default_num_perm")]
    pub num_perm: usize,
    /// Removal decision threshold on the 0-100 fuzzy scale.
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: u8,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Persist the confirmed map as JSON.
    #[serde(default)]
    pub save_results: bool,
    /// Stem of the JSON results file.
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
    #[serde(default = "default_shingle_size")]
    pub shingle_size: usize,
    #[serde(default)]
    pub shingle_unit: ShingleUnit,
    /// Seed for the MinHash permutation family.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Worker threads for signatures and verification; 0 = rayon default.
    #[serde(default)]
    pub threads: usize,
    /// Delete zero-byte files before the pipeline runs.
    #[serde(default = "default_remove_empty")]
    pub remove_empty: bool,
    /// Detect and report, but delete nothing.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_minhash_threshold() -> f64 { 0.5 }
fn default_fuzzy_threshold() -> u8 { 60 }
fn default_num_perm() -> usize { 128 }
fn default_dedup_threshold() -> u8 { 80 }
fn default_output_dir() -> PathBuf { PathBuf::from("dedup_outputs") }
fn default_output_filename() -> String { "dap".to_string() }
fn default_shingle_size() -> usize { 20 }
fn default_seed() -> u64 { 1 }
fn default_remove_empty() -> bool { true }

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            minhash_threshold: default_minhash_threshold(),
            fuzzy_threshold: default_fuzzy_threshold(),
            num_perm: default_num_perm(),
            dedup_threshold: default_dedup_threshold(),
            output_dir: default_output_dir(),
            save_results: false,
            output_filename: default_output_filename(),
            shingle_size: default_shingle_size(),
            shingle_unit: ShingleUnit::default(),
            seed: default_seed(),
            threads: 0,
            remove_empty: default_remove_empty(),
            dry_run: false,
        }
    }
}

impl DedupConfig {
    /// Parses a TOML document. Missing keys fall back to defaults.
    ///
    /// # Errors
    /// Returns [`DedupError::Toml`] when the content is not valid TOML for this shape.
    pub fn parse_toml(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| DedupError::Toml {
            source,
            path: origin.to_path_buf(),
        })
    }

    /// Loads a TOML config file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DedupError::io(e, path))?;
        Self::parse_toml(&content, path)
    }

    /// Validates ranges before any work begins.
    ///
    /// # Errors
    /// Returns [`DedupError::InvalidConfig`] naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        let t = self.minhash_threshold;
        if !t.is_finite() || t <= 0.0 || t > 1.0 {
            return Err(invalid(format!(
                "minhash_threshold must lie in (0, 1], got {t}"
            )));
        }
        if self.num_perm < 2 {
            return Err(invalid(format!(
                "num_perm must be at least 2, got {}",
                self.num_perm
            )));
        }
        if self.fuzzy_threshold > 100 {
            return Err(invalid(format!(
                "fuzzy_threshold must lie in [0, 100], got {}",
                self.fuzzy_threshold
            )));
        }
        if self.dedup_threshold > 100 {
            return Err(invalid(format!(
                "dedup_threshold must lie in [0, 100], got {}",
                self.dedup_threshold
            )));
        }
        if self.shingle_size == 0 {
            return Err(invalid("shingle_size must be at least 1".to_string()));
        }
        if self.output_filename.trim().is_empty() {
            return Err(invalid("output_filename must not be empty".to_string()));
        }
        Ok(())
    }

    /// Path of the JSON results file.
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.output_filename))
    }

    /// Path of the removal record.
    #[must_use]
    pub fn track_path(&self) -> PathBuf {
        self.output_dir.join(TRACK_FILE)
    }

    /// Path of the empty-file record.
    #[must_use]
    pub fn empty_log_path(&self) -> PathBuf {
        self.output_dir.join(EMPTY_FILES_LOG)
    }
}

fn invalid(msg: String) -> DedupError {
    DedupError::InvalidConfig(msg)
}
