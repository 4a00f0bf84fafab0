//! Pipeline configuration.
//!
//! Every field is optional; a missing configuration file means defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! paths:
//!   header: vendor/OpenCSM.h
//!   index: csm-documentation.json
//!   grammar: syntaxes/csm.tmLanguage.json
//! grammar:
//!   name: CSM
//!   scope_name: source.csm
//!   schema_url: null
//! keywords:
//!   control_files:
//!     - keywords/control.txt
//!   function_files: []
//!   supplementary_files: []
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use csm_docs_grammar::{
    GrammarOptions, KeywordCatalog, KeywordKind, TMLANGUAGE_SCHEMA_URL, parse_keyword_list,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DocsError, IoOperation, Result};

/// File name looked up when no configuration path is given.
pub const DEFAULT_CONFIG_FILE: &str = "csm-docs.yml";

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// OpenCSM header to extract documentation from.
    pub header: PathBuf,
    /// Persisted command index (written after extraction, reused otherwise).
    pub index: PathBuf,
    /// Grammar output.
    pub grammar: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            header: PathBuf::from("OpenCSM.h"),
            index: PathBuf::from("csm-documentation.json"),
            grammar: PathBuf::from("csm.tmLanguage.json"),
        }
    }
}

/// Identity of the generated grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    pub name: String,
    pub scope_name: String,
    /// `$schema` URL; `null` omits the field.
    pub schema_url: Option<String>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        let options = GrammarOptions::default();
        Self {
            name: options.name,
            scope_name: options.scope_name,
            schema_url: Some(TMLANGUAGE_SCHEMA_URL.to_string()),
        }
    }
}

/// Extra keyword list files merged into the built-in catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordsConfig {
    pub control_files: Vec<PathBuf>,
    pub function_files: Vec<PathBuf>,
    pub supplementary_files: Vec<PathBuf>,
}

/// Top-level pipeline configuration.
///
/// # Examples
///
/// ```
/// use csm_docs_db::PipelineConfig;
///
/// let config: PipelineConfig = serde_yaml::from_str("paths:\n  header: vendor/OpenCSM.h\n").unwrap();
/// assert_eq!(config.paths.header.to_str(), Some("vendor/OpenCSM.h"));
/// assert_eq!(config.paths.index.to_str(), Some("csm-documentation.json"));
/// assert_eq!(config.grammar.scope_name, "source.csm");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Configuration format version.
    pub version: String,
    pub paths: PathsConfig,
    pub grammar: GrammarConfig,
    pub keywords: KeywordsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathsConfig::default(),
            grammar: GrammarConfig::default(),
            keywords: KeywordsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::Io`] if the file cannot be read, or
    /// [`DocsError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(DocsError::io(path, IoOperation::Read))?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(DocsError::io(path, IoOperation::Write))?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn grammar_options(&self) -> GrammarOptions {
        GrammarOptions {
            name: self.grammar.name.clone(),
            scope_name: self.grammar.scope_name.clone(),
            schema_url: self.grammar.schema_url.clone(),
        }
    }

    /// Built-in catalog extended with the configured keyword files.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::Io`] if a keyword file cannot be read.
    pub fn catalog(&self) -> Result<KeywordCatalog> {
        let mut catalog = KeywordCatalog::builtin();
        let sources = [
            (KeywordKind::Control, &self.keywords.control_files),
            (KeywordKind::Function, &self.keywords.function_files),
            (KeywordKind::Supplementary, &self.keywords.supplementary_files),
        ];
        for (kind, files) in sources {
            for file in files {
                let text = std::fs::read_to_string(file)
                    .map_err(DocsError::io(file, IoOperation::Read))?;
                let words = parse_keyword_list(&text);
                debug!(path = %file.display(), ?kind, count = words.len(), "Loaded keyword list");
                catalog.extend(kind, words);
            }
        }
        Ok(catalog)
    }
}
