//! Hover documentation lookup.
//!
//! A hover query is the token under the editor cursor. It is trimmed,
//! uppercased and looked up exactly; there is no prefix or fuzzy matching. A
//! miss is a normal outcome and means "no tooltip".

use std::path::Path;

use csm_docs_core::{CommandIndex, CommandRecord, NOTES_LINE_BREAK};
use serde::Serialize;
use tracing::warn;

use crate::error::{DocsError, Result};
use crate::index::DocumentationIndex;

/// Language tag of the syntax code block.
pub const LANGUAGE_ID: &str = "csm";

/// Markdown hard line break used when expanding note line markers.
const MARKDOWN_LINE_BREAK: &str = "  \n";

/// Canonical lookup key for a hover token, or `None` for an empty token.
///
/// # Examples
///
/// ```
/// use csm_docs_db::canonical_token;
///
/// assert_eq!(canonical_token("  box "), Some("BOX".to_string()));
/// assert_eq!(canonical_token("   "), None);
/// ```
pub fn canonical_token(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_ascii_uppercase())
}

/// Looks up the record for `token` in `index`.
pub fn resolve<'a>(index: &'a CommandIndex, token: &str) -> Option<&'a CommandRecord> {
    index.get(&canonical_token(token)?)
}

/// One part of a hover tooltip, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverSection<'a> {
    Syntax(&'a str),
    Usage(&'a str),
    /// Notes with line-break markers still in place.
    Notes(&'a str),
}

impl HoverSection<'_> {
    /// Markdown for this section alone.
    pub fn to_markdown(&self) -> String {
        match self {
            HoverSection::Syntax(syntax) => format!("```{LANGUAGE_ID}\n{syntax}\n```\n\n"),
            HoverSection::Usage(usage) => format!("**Usage**: {usage}\n\n"),
            HoverSection::Notes(notes) => format!(
                "**Notes**:\n\n{}",
                notes.replace(NOTES_LINE_BREAK, MARKDOWN_LINE_BREAK)
            ),
        }
    }
}

/// Render-ready hover content for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverPayload {
    pub name: String,
    pub syntax: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HoverPayload {
    pub fn from_record(record: &CommandRecord) -> Self {
        let non_empty = |text: &str| (!text.is_empty()).then(|| text.to_string());
        Self {
            name: record.name.clone(),
            syntax: record.syntax.clone(),
            usage: non_empty(&record.usage),
            notes: non_empty(&record.notes),
        }
    }

    /// Present sections: syntax always, then usage and notes when non-empty.
    pub fn sections(&self) -> Vec<HoverSection<'_>> {
        let mut sections = vec![HoverSection::Syntax(&self.syntax)];
        if let Some(usage) = &self.usage {
            sections.push(HoverSection::Usage(usage));
        }
        if let Some(notes) = &self.notes {
            sections.push(HoverSection::Notes(notes));
        }
        sections
    }

    /// Concatenated Markdown of every present section.
    ///
    /// # Examples
    ///
    /// ```
    /// use csm_docs_core::CommandRecord;
    /// use csm_docs_db::HoverPayload;
    ///
    /// let record = CommandRecord::new("BOX", "xmin ymin zmin dx dy dz")
    ///     .with_usage("creates a rectangular box");
    /// assert_eq!(
    ///     HoverPayload::from_record(&record).to_markdown(),
    ///     "```csm\nBOX xmin ymin zmin dx dy dz\n```\n\n**Usage**: creates a rectangular box\n\n"
    /// );
    /// ```
    pub fn to_markdown(&self) -> String {
        self.sections()
            .iter()
            .map(HoverSection::to_markdown)
            .collect()
    }
}

/// Answers hover queries against the most recently loaded index.
///
/// # Examples
///
/// ```
/// use csm_docs_core::{CommandIndex, CommandRecord};
/// use csm_docs_db::HoverResolver;
///
/// let mut commands = CommandIndex::new();
/// commands.insert(CommandRecord::new("SPHERE", "xcent ycent zcent radius"));
/// let resolver = HoverResolver::new(commands.into());
///
/// assert_eq!(resolver.resolve("sphere").unwrap().syntax, "SPHERE xcent ycent zcent radius");
/// assert!(resolver.resolve("cube").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HoverResolver {
    index: DocumentationIndex,
}

impl HoverResolver {
    pub fn new(index: DocumentationIndex) -> Self {
        Self { index }
    }

    /// Resolver over the index stored at `path`. A missing or malformed file
    /// logs a warning and gives a resolver that never finds anything; only
    /// I/O failures on an existing file are returned.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match DocumentationIndex::load_or_empty(path) {
            Ok(index) => Ok(Self::new(index)),
            Err(DocsError::Json(err)) => {
                warn!(path = %path.display(), error = %err, "Malformed documentation index");
                Ok(Self::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Swaps in a newly loaded index.
    pub fn reload(&mut self, index: DocumentationIndex) {
        self.index = index;
    }

    pub fn lookup(&self, token: &str) -> Option<&CommandRecord> {
        resolve(self.index.commands(), token)
    }

    pub fn resolve(&self, token: &str) -> Option<HoverPayload> {
        self.lookup(token).map(HoverPayload::from_record)
    }

    pub fn index(&self) -> &DocumentationIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> HoverResolver {
        let mut commands = CommandIndex::new();
        commands.insert(
            CommandRecord::new("BOX", "xmin ymin zmin dx dy dz")
                .with_usage("creates a rectangular box")
                .with_note_lines(&["xmin,ymin,zmin are the coordinates of one corner"]),
        );
        commands.insert(
            CommandRecord::new("DESPMTR", "$pmtrName values")
                .with_note_lines(&["cannot be followed by ubound", "sensitivity available"]),
        );
        commands.insert(CommandRecord::new("UNION", "toMark=0"));
        HoverResolver::new(commands.into())
    }

    #[test]
    fn test_lowercase_token_resolves_to_record() {
        let payload = resolver().resolve("box").unwrap();
        assert_eq!(payload.name, "BOX");
        assert_eq!(payload.syntax, "BOX xmin ymin zmin dx dy dz");
        assert_eq!(payload.usage.as_deref(), Some("creates a rectangular box"));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(resolver().resolve("  Union\t").is_some());
    }

    #[test]
    fn test_unknown_and_empty_tokens_miss() {
        let resolver = resolver();
        assert!(resolver.resolve("SPHERE").is_none());
        assert!(resolver.resolve("").is_none());
        assert!(resolver.resolve("BO").is_none());
    }

    #[test]
    fn test_sections_are_ordered_and_optional() {
        let resolver = resolver();

        let full = resolver.resolve("BOX").unwrap();
        assert!(matches!(
            full.sections().as_slice(),
            [
                HoverSection::Syntax(_),
                HoverSection::Usage(_),
                HoverSection::Notes(_)
            ]
        ));

        let syntax_only = resolver.resolve("UNION").unwrap();
        assert_eq!(
            syntax_only.sections(),
            vec![HoverSection::Syntax("UNION toMark=0")]
        );

        let notes_only = resolver.resolve("despmtr").unwrap();
        assert_eq!(notes_only.sections().len(), 2);
        assert!(matches!(notes_only.sections()[1], HoverSection::Notes(_)));
    }

    #[test]
    fn test_markdown_expands_note_line_breaks() {
        let markdown = resolver().resolve("DESPMTR").unwrap().to_markdown();
        assert_eq!(
            markdown,
            "```csm\nDESPMTR $pmtrName values\n```\n\n\
             **Notes**:\n\ncannot be followed by ubound  \nsensitivity available"
        );
    }

    #[test]
    fn test_payload_json_omits_absent_sections() {
        let payload = resolver().resolve("UNION").unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["syntax"], "UNION toMark=0");
        assert!(value.get("usage").is_none());
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_reload_replaces_index() {
        let mut resolver = resolver();
        resolver.reload(DocumentationIndex::default());
        assert!(resolver.resolve("BOX").is_none());
        assert!(resolver.index().is_empty());
    }

    #[test]
    fn test_from_path_malformed_index_resolves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csm-documentation.json");
        std::fs::write(&path, "{ \"BOX\": ").unwrap();

        let resolver = HoverResolver::from_path(&path).unwrap();

        assert!(resolver.index().is_empty());
        assert!(resolver.resolve("BOX").is_none());
    }

    #[test]
    fn test_from_path_loads_saved_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csm-documentation.json");
        resolver().index().save(&path).unwrap();

        let loaded = HoverResolver::from_path(&path).unwrap();

        assert_eq!(loaded.index().len(), 3);
        assert!(loaded.resolve("union").is_some());
    }

    #[test]
    fn test_free_resolve_returns_record() {
        let resolver = resolver();
        let record = resolve(resolver.index().commands(), "box").unwrap();
        assert_eq!(record.notes, "xmin,ymin,zmin are the coordinates of one corner");
    }
}
