// src/audit_log.rs
//! Append-only record of removed files, one file name per line.

use crate::error::{DedupError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// An open, append-only log file.
///
/// Each entry is flushed before `record` returns, so the log stays truthful
/// for whatever removals happened if the run stops part way.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: File,
}

impl AuditLog {
    /// Opens (creating if needed) the log at `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns error if the directory or file cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DedupError::io(e, parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| DedupError::io(e, path))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Appends one entry and flushes it to the OS.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn record(&mut self, name: &str) -> Result<()> {
        writeln!(self.file, "{name}").map_err(|e| DedupError::io(e, &self.path))?;
        self.file
            .flush()
            .map_err(|e| DedupError::io(e, &self.path))?;
        Ok(())
    }
}

/// Reads every entry of a log file. A missing file reads as empty.
///
/// # Errors
/// Returns error if the file exists but cannot be read.
pub fn read_entries(path: &Path) -> Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DedupError::io(e, path)),
    };
    BufReader::new(file)
        .lines()
        .filter(|l| !matches!(l, Ok(s) if s.is_empty()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| DedupError::io(e, path))
}
