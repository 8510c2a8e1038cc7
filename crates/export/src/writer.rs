//! Atomic artifact writes.
//!
//! Every file is written to a temporary file in its destination directory
//! and renamed into place, so readers never see a partial document.

use crate::error::ExportError;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ExportError::Persist {
        path: path.display().to_string(),
        source: e.error,
    })?;
    log::debug!("[WRITE] {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Pretty-printed JSON, written atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}
