// src/corpus.rs
//! The on-disk document population.
//!
//! Nothing here caches sizes or contents: the resolver deletes files while a
//! run is in progress, so every read goes back to the filesystem.

use crate::audit_log::AuditLog;
use crate::error::{DedupError, Result};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Why a document could not be read as text.
#[derive(Debug, Error)]
pub enum ReadFailure {
    #[error("file not found")]
    Missing,
    #[error("not valid UTF-8")]
    NotText,
    #[error("{0}")]
    Io(#[source] io::Error),
}

/// True when `id` names an entry directly inside the corpus root: one
/// normal path component, no separators, no `..`, not absolute.
#[must_use]
pub fn is_document_id(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == id
    )
}

/// A flat directory of text documents identified by file name.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
}

impl Corpus {
    /// Opens a corpus directory.
    ///
    /// # Errors
    /// Returns [`DedupError::CorpusNotFound`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DedupError::CorpusNotFound(root));
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Lists document ids (file names) in name order. Hidden files and
    /// subdirectories are ignored.
    ///
    /// # Errors
    /// Returns error if the corpus directory itself cannot be read.
    pub fn document_ids(&self) -> Result<Vec<String>> {
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        let mut ids = Vec::new();
        for item in walker {
            let entry = match item {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };
            if name.starts_with('.') {
                tracing::debug!(file = %name, "skipping hidden file");
                continue;
            }
            ids.push(name.to_string());
        }
        Ok(ids)
    }

    /// Reads a document's text at the moment of the call.
    ///
    /// # Errors
    /// Returns the reason the document is unusable.
    pub fn read_text(&self, id: &str) -> std::result::Result<String, ReadFailure> {
        match fs::read(self.path_of(id)) {
            Ok(bytes) => String::from_utf8(bytes).map_err(|_| ReadFailure::NotText),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ReadFailure::Missing),
            Err(e) => Err(ReadFailure::Io(e)),
        }
    }

    /// Current on-disk byte size; a vanished or unreadable file counts as 0.
    #[must_use]
    pub fn live_size(&self, id: &str) -> u64 {
        if !is_document_id(id) {
            return 0;
        }
        fs::metadata(self.path_of(id)).map_or(0, |m| m.len())
    }

    /// Whether `id` is a valid document id with an entry on disk.
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        is_document_id(id) && fs::symlink_metadata(self.path_of(id)).is_ok()
    }

    /// Deletes a document. Returns `Ok(false)` if it was already gone or
    /// `id` does not name an entry of this corpus.
    ///
    /// # Errors
    /// Returns error for any failure other than not-found.
    pub fn remove(&self, id: &str) -> Result<bool> {
        if !is_document_id(id) {
            tracing::warn!(file = %id, "refusing to delete outside the corpus");
            return Ok(false);
        }
        let path = self.path_of(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DedupError::io(e, path)),
        }
    }

    /// Deletes every zero-byte document and records each deleted name in `log`.
    /// A file that cannot be deleted is left in place with a warning.
    ///
    /// # Errors
    /// Returns error if listing the corpus or writing the log fails.
    pub fn remove_empty_files(&self, log: &mut AuditLog) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        for id in self.document_ids()? {
            let is_empty = fs::metadata(self.path_of(&id)).is_ok_and(|m| m.len() == 0);
            if !is_empty {
                continue;
            }
            match self.remove(&id) {
                Ok(true) => {
                    log.record(&id)?;
                    tracing::info!(file = %id, "deleted empty file");
                    removed.push(id);
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(file = %id, error = %e, "could not delete empty file"),
            }
        }
        Ok(removed)
    }
}
