// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

use crate::minhash::SignatureError;

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Corpus directory not found: {0}")]
    CorpusNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed results file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("Malformed config file {path}: {source}")]
    Toml {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl DedupError {
    /// Wraps an I/O error together with the path it concerns.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        DedupError::Io {
            source,
            path: path.into(),
        }
    }

    /// Returns true for errors caused by the caller's input rather than the run.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DedupError::CorpusNotFound(_) | DedupError::InvalidConfig(_) | DedupError::Toml { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DedupError>;

// Allow `?` on std::io::Error by converting to DedupError::Io with unknown path.
impl From<std::io::Error> for DedupError {
    fn from(source: std::io::Error) -> Self {
        DedupError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

// Gracefully convert WalkDir errors
impl From<walkdir::Error> for DedupError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map_or_else(|| PathBuf::from("<unknown>"), PathBuf::from);
        match e.into_io_error() {
            Some(source) => DedupError::Io { source, path },
            None => DedupError::Io {
                source: std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"),
                path,
            },
        }
    }
}
