//! Reading and persisting whole image files.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{PatchError, Result};

/// Read an entire image into memory.
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| PatchError::io(path, e))
}

/// Persist `bytes` at `path`, replacing any existing file.
///
/// The data goes to a temporary file next to the target first and is then
/// renamed over it, so readers never observe a half-written image.
pub fn write_image(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic(path, bytes)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PatchError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| PatchError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| PatchError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| PatchError::io(path, e.error))?;
    Ok(())
}
