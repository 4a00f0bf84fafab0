//! Error types for documentation artifacts.
//!
//! Content never fails extraction or synthesis; what can fail is the I/O at
//! the process boundary, parsing a persisted artifact, or loading an index
//! that breaks the record invariants.

use std::fmt;
use std::path::{Path, PathBuf};

use csm_docs_core::ValidationError;
use csm_docs_grammar::SynthesisError;
use thiserror::Error;

/// File operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOperation {
    Read,
    Write,
    /// Renaming a finished temporary file over the target.
    Replace,
}

impl fmt::Display for IoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoOperation::Read => "read",
            IoOperation::Write => "write",
            IoOperation::Replace => "replace",
        })
    }
}

/// Errors that can occur while loading, building or saving artifacts.
#[derive(Debug, Error)]
pub enum DocsError {
    /// File I/O failure, with the path and operation involved.
    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        path: PathBuf,
        operation: IoOperation,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The synthesized grammar failed structural validation.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// A persisted index breaks the command record invariants.
    #[error("invalid documentation index {}: {}", path.display(), join(errors))]
    InvalidIndex {
        path: PathBuf,
        errors: Vec<ValidationError>,
    },
}

impl DocsError {
    /// Builds a closure that wraps an [`std::io::Error`] with context, for use
    /// with [`Result::map_err`].
    pub(crate) fn io(
        path: impl AsRef<Path>,
        operation: IoOperation,
    ) -> impl FnOnce(std::io::Error) -> DocsError {
        let path = path.as_ref().to_path_buf();
        move |source| DocsError::Io {
            path,
            operation,
            source,
        }
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`DocsError`].
pub type Result<T> = std::result::Result<T, DocsError>;
