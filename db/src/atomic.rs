//! Atomic file replacement.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{DocsError, IoOperation, Result};

/// Writes `contents` to a temporary file next to `path`, then renames it over
/// `path`. A failure leaves any existing file untouched.
///
/// # Errors
///
/// Returns [`DocsError::Io`] with [`IoOperation::Write`] if the temporary
/// file cannot be created or written, or [`IoOperation::Replace`] if the
/// rename fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(DocsError::io(dir, IoOperation::Write))?;
    file.write_all(contents)
        .and_then(|()| file.flush())
        .map_err(DocsError::io(path, IoOperation::Write))?;
    file.persist(path)
        .map_err(|err| DocsError::io(path, IoOperation::Replace)(err.error))?;
    Ok(())
}
