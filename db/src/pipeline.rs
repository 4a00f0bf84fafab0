//! Build pipeline: header → index → grammar.
//!
//! The command index comes from the first available source:
//!
//! 1. the header, when it exists (extracted, then persisted);
//! 2. the previously persisted index (reused as-is);
//! 3. nothing, in which case the grammar is built from the keyword catalog
//!    alone and the run reports a warning instead of failing.
//!
//! The grammar is then synthesized and written only if its bytes changed.

use std::fmt;
use std::path::Path;

use chrono::Utc;
use csm_docs_core::CommandIndex;
use csm_docs_extract::{ExtractionReport, extract_with_report};
use csm_docs_grammar::synthesize;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::atomic::write_atomic;
use crate::config::PipelineConfig;
use crate::error::{DocsError, IoOperation, Result};
use crate::index::DocumentationIndex;

/// Where the command index used for synthesis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSource {
    /// Extracted from the header in this run.
    Extracted,
    /// Loaded from the previously persisted index.
    Reused,
    /// No header and no index; keyword-only grammar.
    Missing,
}

impl fmt::Display for IndexSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexSource::Extracted => "extracted",
            IndexSource::Reused => "reused",
            IndexSource::Missing => "missing",
        })
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    pub index_source: IndexSource,
    /// Commands available to the grammar and to hover lookups.
    pub commands: usize,
    /// Names whose earlier header definition was replaced.
    pub duplicates: Vec<String>,
    /// Lowercase hex SHA-256 of the serialized grammar.
    pub grammar_sha256: String,
    /// `false` when the grammar on disk already had identical content.
    pub grammar_written: bool,
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Writes the report as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut raw = serde_json::to_string_pretty(self)?;
        raw.push('\n');
        write_atomic(path.as_ref(), raw.as_bytes())
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Runs the full build with the paths and grammar identity in `config`.
///
/// # Errors
///
/// Fails on unreadable inputs, a persisted index that breaks the record
/// invariants, or an artifact that cannot be written. A missing header and
/// index is not an error.
pub fn run_pipeline(config: &PipelineConfig) -> Result<BuildReport> {
    let (commands, index_source, extraction) = resolve_index(config)?;

    let mut warnings = Vec::new();
    if let Some(report) = &extraction {
        warnings.extend(report.warnings());
    }
    if index_source == IndexSource::Missing {
        warnings.push(format!(
            "neither {} nor {} exists; grammar built from keywords only",
            config.paths.header.display(),
            config.paths.index.display()
        ));
    }

    let catalog = config.catalog()?;
    let grammar = synthesize(&catalog, commands.names(), &config.grammar_options())?;
    let rendered = grammar.to_json_pretty()?;
    let grammar_sha256 = sha256_hex(rendered.as_bytes());
    let grammar_written = write_if_changed(&config.paths.grammar, rendered.as_bytes())?;

    info!(
        source = %index_source,
        commands = commands.len(),
        written = grammar_written,
        "Build finished"
    );

    Ok(BuildReport {
        generated_at: Utc::now().to_rfc3339(),
        index_source,
        commands: commands.len(),
        duplicates: extraction.map(|report| report.duplicates).unwrap_or_default(),
        grammar_sha256,
        grammar_written,
        warnings,
    })
}

fn resolve_index(
    config: &PipelineConfig,
) -> Result<(CommandIndex, IndexSource, Option<ExtractionReport>)> {
    let header = &config.paths.header;
    let index_path = &config.paths.index;

    if header.is_file() {
        let text =
            std::fs::read_to_string(header).map_err(DocsError::io(header, IoOperation::Read))?;
        let (commands, report) = extract_with_report(&text);
        let index = DocumentationIndex::new(commands);
        index.save(index_path)?;
        info!(
            header = %header.display(),
            index = %index_path.display(),
            commands = index.len(),
            "Extracted documentation index"
        );
        return Ok((index.into_commands(), IndexSource::Extracted, Some(report)));
    }

    if index_path.is_file() {
        let index = DocumentationIndex::load_validated(index_path)?;
        info!(
            index = %index_path.display(),
            commands = index.len(),
            "Header not found, reusing existing documentation index"
        );
        return Ok((index.into_commands(), IndexSource::Reused, None));
    }

    warn!(
        header = %header.display(),
        index = %index_path.display(),
        "No header or documentation index, building keyword-only grammar"
    );
    Ok((CommandIndex::new(), IndexSource::Missing, None))
}

/// Writes `contents` unless `path` already holds exactly those bytes.
fn write_if_changed(path: &Path, contents: &[u8]) -> Result<bool> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == contents {
            debug!(path = %path.display(), "Grammar unchanged, skipping write");
            return Ok(false);
        }
    }
    write_atomic(path, contents)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_write_if_changed_skips_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grammar.json");

        assert!(write_if_changed(&path, b"{}\n").unwrap());
        assert!(!write_if_changed(&path, b"{}\n").unwrap());
        assert!(write_if_changed(&path, b"{ }\n").unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), b"{ }\n");
    }

    #[test]
    fn test_index_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&IndexSource::Reused).unwrap(),
            "\"reused\""
        );
    }
}
