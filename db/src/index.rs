//! Persisted documentation index.
//!
//! The on-disk form is a JSON object keyed by command name, each value a
//! [`CommandRecord`] (`name`, `syntax`, `description`, `usage`, `parameters`,
//! `notes`). Keys are sorted, so rewriting an unchanged index yields the same
//! bytes.

use std::path::Path;

use csm_docs_core::{CommandIndex, CommandRecord, ValidationError, validate_index};
use tracing::{debug, warn};

use crate::atomic::write_atomic;
use crate::error::{DocsError, IoOperation, Result};

/// Default file name of the persisted index.
pub const DEFAULT_INDEX_FILE: &str = "csm-documentation.json";

/// A [`CommandIndex`] with load/save support.
///
/// # Examples
///
/// ```no_run
/// use csm_docs_db::DocumentationIndex;
///
/// let index = DocumentationIndex::load_or_empty("csm-documentation.json").unwrap();
/// for name in index.names() {
///     println!("{name}");
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentationIndex {
    commands: CommandIndex,
}

impl DocumentationIndex {
    pub fn new(commands: CommandIndex) -> Self {
        Self { commands }
    }

    /// Loads an index from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError::Io`] if the file cannot be read, or
    /// [`DocsError::Json`] if it is not a valid index.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(DocsError::io(path, IoOperation::Read))?;
        let commands: CommandIndex = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), commands = commands.len(), "Loaded documentation index");
        Ok(Self { commands })
    }

    /// Like [`load`](Self::load), but a missing file logs a warning and
    /// yields an empty index. Hover lookups against it always miss.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Documentation index not found");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Loads an index and rejects it if any record breaks the
    /// [`CommandRecord`] invariants.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let index = Self::load(path)?;
        let errors = index.validate();
        if !errors.is_empty() {
            return Err(DocsError::InvalidIndex {
                path: path.to_path_buf(),
                errors,
            });
        }
        Ok(index)
    }

    /// Writes the index as pretty JSON, replacing `path` atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut raw = serde_json::to_string_pretty(&self.commands)?;
        raw.push('\n');
        write_atomic(path.as_ref(), raw.as_bytes())
    }

    /// YAML rendering of the index.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.commands)?)
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        validate_index(&self.commands)
    }

    /// Command names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.names()
    }

    /// Exact lookup by canonical (uppercase) name.
    pub fn get(&self, name: &str) -> Option<&CommandRecord> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &CommandIndex {
        &self.commands
    }

    pub fn into_commands(self) -> CommandIndex {
        self.commands
    }
}

impl From<CommandIndex> for DocumentationIndex {
    fn from(commands: CommandIndex) -> Self {
        Self::new(commands)
    }
}
