// src/results.rs
//! JSON persistence of confirmed duplicates.
//!
//! Shape: `{ "doc.txt": [["other.txt", 97.5], ...], ... }`. The resolver can
//! consume a saved file instead of re-running detection.

use crate::corpus::is_document_id;
use crate::error::{DedupError, Result};
use crate::verify::ConfirmedMap;
use serde::de::Error as _;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes `confirmed` as pretty-printed JSON, creating parent directories.
///
/// # Errors
/// Returns error if the directory or file cannot be written.
pub fn save(confirmed: &ConfirmedMap, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DedupError::io(e, parent))?;
    }
    let file = File::create(path).map_err(|e| DedupError::io(e, path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, confirmed).map_err(|source| DedupError::Json {
        source,
        path: path.to_path_buf(),
    })?;
    writer.flush().map_err(|e| DedupError::io(e, path))?;
    tracing::info!(path = %path.display(), documents = confirmed.len(), "saved confirmed duplicates");
    Ok(())
}

/// Reads a confirmed map written by [`save`].
///
/// Every id must be a plain file name; anything that could point outside the
/// corpus directory rejects the whole file.
///
/// # Errors
/// Returns error if the file is missing or malformed.
pub fn load(path: &Path) -> Result<ConfirmedMap> {
    let file = File::open(path).map_err(|e| DedupError::io(e, path))?;
    let malformed = |source: serde_json::Error| DedupError::Json {
        source,
        path: path.to_path_buf(),
    };
    let map: ConfirmedMap = serde_json::from_reader(BufReader::new(file)).map_err(malformed)?;

    let ids = map
        .iter()
        .flat_map(|(id, others)| std::iter::once(id).chain(others.iter().map(|(o, _)| o)));
    for id in ids {
        if !is_document_id(id) {
            return Err(malformed(serde_json::Error::custom(format!(
                "{id:?} is not a file name inside the corpus"
            ))));
        }
    }
    Ok(map)
}
