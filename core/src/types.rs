//! Command documentation types.
//!
//! A [`CommandRecord`] documents one command of the CSM language; a
//! [`CommandIndex`] maps canonical (uppercase) command names to their records.
//! Both round-trip through JSON unchanged, which is how the index is persisted
//! between extraction and the hover/grammar consumers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Separator placed between note lines inside [`CommandRecord::notes`].
///
/// This is the two-character sequence backslash + `n`, not a newline. Existing
/// consumers of the persisted index expect this exact marker.
pub const NOTES_LINE_BREAK: &str = "\\n";

/// Documentation for a single command.
///
/// # Examples
///
/// ```
/// use csm_docs_core::CommandRecord;
///
/// let record = CommandRecord::new("BOX", "xmin ymin zmin dx dy dz")
///     .with_usage("creates a rectangular box");
/// assert_eq!(record.syntax, "BOX xmin ymin zmin dx dy dz");
/// assert_eq!(record.usage, "creates a rectangular box");
/// assert!(record.notes.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Canonical uppercase command name.
    pub name: String,
    /// `name` followed by the declared parameter text.
    pub syntax: String,
    /// Reserved; always empty when produced by extraction.
    #[serde(default)]
    pub description: String,
    /// One-line usage text from a `use:` annotation.
    #[serde(default)]
    pub usage: String,
    /// Raw parameter text following the name on the definition line.
    #[serde(default)]
    pub parameters: String,
    /// Note lines joined with [`NOTES_LINE_BREAK`].
    #[serde(default)]
    pub notes: String,
}

impl CommandRecord {
    /// Creates a record from a command name and its raw parameter text.
    pub fn new(name: impl Into<String>, parameters: impl Into<String>) -> Self {
        let name = name.into();
        let parameters = parameters.into();
        Self {
            syntax: format!("{name} {parameters}"),
            name,
            description: String::new(),
            usage: String::new(),
            parameters,
            notes: String::new(),
        }
    }

    /// Sets the usage line.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Sets the notes from individual lines.
    pub fn with_note_lines<S: AsRef<str>>(mut self, lines: &[S]) -> Self {
        self.notes = join_note_lines(lines);
        self
    }

    /// Splits [`notes`](Self::notes) back into its individual lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use csm_docs_core::CommandRecord;
    ///
    /// let record = CommandRecord::new("SPHERE", "xcent ycent zcent radius")
    ///     .with_note_lines(&["radius must be positive", "sensitivity computed"]);
    /// let lines: Vec<&str> = record.note_lines().collect();
    /// assert_eq!(lines, ["radius must be positive", "sensitivity computed"]);
    /// ```
    pub fn note_lines(&self) -> impl Iterator<Item = &str> {
        self.notes
            .split(NOTES_LINE_BREAK)
            .filter(|line| !line.is_empty())
    }

    /// Returns `true` when the record has neither usage nor notes.
    pub fn is_undocumented(&self) -> bool {
        self.usage.is_empty() && self.notes.is_empty()
    }
}

/// Joins note lines with [`NOTES_LINE_BREAK`].
pub fn join_note_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(NOTES_LINE_BREAK)
}

/// Returns `true` if `name` has the command-name shape: an uppercase ASCII
/// letter followed by uppercase ASCII letters or digits.
///
/// # Examples
///
/// ```
/// use csm_docs_core::is_command_name;
///
/// assert!(is_command_name("BOX"));
/// assert!(is_command_name("ROTATEX"));
/// assert!(is_command_name("L2"));
/// assert!(!is_command_name("box"));
/// assert!(!is_command_name("2D"));
/// assert!(!is_command_name("MAX_ITER"));
/// ```
pub fn is_command_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            chars.all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
        }
        _ => false,
    }
}

/// Mapping from canonical command name to its documentation.
///
/// Backed by a [`BTreeMap`] so serialized output has a stable key order.
/// Inserting a name that is already present replaces the earlier record.
///
/// # Examples
///
/// ```
/// use csm_docs_core::{CommandIndex, CommandRecord};
///
/// let mut index = CommandIndex::new();
/// index.insert(CommandRecord::new("BOX", "xmin ymin zmin dx dy dz"));
/// index.insert(CommandRecord::new("BOX", "xbase ybase"));
/// assert_eq!(index.len(), 1);
/// assert_eq!(index.get("BOX").unwrap().parameters, "xbase ybase");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandIndex {
    commands: BTreeMap<String, CommandRecord>,
}

impl CommandIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record under its own name, returning the record it replaced.
    pub fn insert(&mut self, record: CommandRecord) -> Option<CommandRecord> {
        self.commands.insert(record.name.clone(), record)
    }

    /// Exact-key lookup. Callers are responsible for canonicalizing `name`.
    pub fn get(&self, name: &str) -> Option<&CommandRecord> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// `(key, record)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandRecord)> {
        self.commands.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn records(&self) -> impl Iterator<Item = &CommandRecord> {
        self.commands.values()
    }
}

impl FromIterator<CommandRecord> for CommandIndex {
    fn from_iter<I: IntoIterator<Item = CommandRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_full_field_set() {
        let record = CommandRecord::new("BOX", "xmin ymin zmin dx dy dz");
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        for field in [
            "name",
            "syntax",
            "description",
            "usage",
            "parameters",
            "notes",
        ] {
            assert!(object.contains_key(field), "missing field {field}");
        }
        assert_eq!(value["description"], "");
    }

    #[test]
    fn test_record_tolerates_missing_optional_fields() {
        let raw = r#"{"name":"BOX","syntax":"BOX a b"}"#;
        let record: CommandRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.name, "BOX");
        assert!(record.usage.is_empty());
        assert!(record.notes.is_empty());
    }

    #[test]
    fn test_index_serializes_as_plain_mapping() {
        let index: CommandIndex = [
            CommandRecord::new("SPHERE", "xcent ycent zcent radius"),
            CommandRecord::new("BOX", "xmin ymin zmin dx dy dz"),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["BOX"]["syntax"], "BOX xmin ymin zmin dx dy dz");
        assert_eq!(json["SPHERE"]["name"], "SPHERE");

        let names: Vec<&str> = index.names().collect();
        assert_eq!(names, ["BOX", "SPHERE"]);
    }

    #[test]
    fn test_index_round_trips_through_json() {
        let index: CommandIndex = [
            CommandRecord::new("BOX", "xmin ymin zmin dx dy dz")
                .with_usage("creates a rectangular box")
                .with_note_lines(&["one corner", "dx dy dz are lengths"]),
            CommandRecord::new("SET", "$pmtrName exprs"),
        ]
        .into_iter()
        .collect();

        let raw = serde_json::to_string_pretty(&index).unwrap();
        let reloaded: CommandIndex = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded, index);
    }

    #[test]
    fn test_note_lines_use_literal_marker() {
        let record = CommandRecord::new("BOX", "a").with_note_lines(&["first", "second"]);
        assert_eq!(record.notes, "first\\nsecond");
        assert!(!record.notes.contains('\n'));
    }
}
