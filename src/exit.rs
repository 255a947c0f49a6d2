// src/exit.rs
//! Standardized process exit codes for `neardup`.
//!
//! Provides a stable contract for scripts and automation.

use colored::Colorize;
use std::process::Termination;

use crate::error::DedupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DedupExit {
    /// Run completed (duplicates removed or none found).
    Success = 0,
    /// Generic error (e.g. IO on output artifacts, malformed results file).
    Error = 1,
    /// Input validation failed (missing corpus directory, invalid configuration).
    InvalidInput = 2,
}

impl DedupExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Maps a run failure onto its exit code.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<DedupError>() {
            Some(e) if e.is_input_error() => Self::InvalidInput,
            _ => Self::Error,
        }
    }
}

impl Termination for DedupExit {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn report(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self.code() as u8)
    }
}

impl From<anyhow::Result<()>> for DedupExit {
    fn from(res: anyhow::Result<()>) -> Self {
        match res {
            Ok(()) => Self::Success,
            Err(e) => {
                eprintln!("{} {e:#}", "Error:".red());
                Self::for_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn codes_are_distinct() {
        assert_eq!(DedupExit::Success.code(), 0);
        assert_ne!(DedupExit::Error.code(), DedupExit::InvalidInput.code());
    }

    #[test]
    fn missing_corpus_is_invalid_input() {
        let err = anyhow::Error::new(DedupError::CorpusNotFound(PathBuf::from("nope")));
        assert_eq!(DedupExit::for_error(&err), DedupExit::InvalidInput);
    }

    #[test]
    fn io_failure_is_generic_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = anyhow::Error::new(DedupError::io(io, "out/dedup_track.txt"));
        assert_eq!(DedupExit::for_error(&err), DedupExit::Error);
    }

    #[test]
    fn run_result_converts_to_exit() {
        assert_eq!(DedupExit::from(Ok(())), DedupExit::Success);
        let bad: anyhow::Result<()> =
            Err(DedupError::InvalidConfig("num_perm".into())).map_err(anyhow::Error::from);
        assert_eq!(DedupExit::from(bad), DedupExit::InvalidInput);
    }
}
