//! Line classification for header documentation.
//!
//! Each header line is classified on its own, before the extraction state
//! machine sees it. Definition detection is split into two independent
//! predicates, [`definition_parts`] (shape) and [`is_excluded`] (policy), so
//! the exclusion rules can be tested and extended without touching the shape
//! match.

use std::sync::LazyLock;

use regex::Regex;

/// Name prefixes reserved for macros and constants.
pub const RESERVED_PREFIXES: &[&str] = &["MAX_", "OCSM_"];

/// Substrings that mark a line as macro or comment text.
pub const EXCLUDED_SUBSTRINGS: &[&str] = &["#define", "/*", "*/"];

/// Marker introducing a one-line usage description.
pub const USAGE_MARKER: &str = "use:";

/// Marker introducing a multi-line notes block.
pub const NOTES_MARKER: &str = "notes:";

static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Z0-9]*)\s+(.*)$").expect("static regex must compile")
});

/// Classified header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Introduces a command; `parameters` is trimmed.
    Definition { name: &'a str, parameters: &'a str },
    /// Has the definition shape but is rejected by [`is_excluded`].
    Excluded,
    /// `use:` line; holds the text after the marker, trimmed.
    UsageAnnotation(&'a str),
    /// `notes:` line. Text after the marker is not kept.
    NotesAnnotation,
    /// Empty or whitespace-only.
    Blank,
    /// Anything else, trimmed. Inside a notes block this is a note body line.
    Text(&'a str),
}

/// Splits a definition-shaped line into `(name, parameters)`.
///
/// The line must start (no indentation) with an uppercase letter followed by
/// uppercase letters or digits, then whitespace. Parameters are trimmed.
///
/// # Examples
///
/// ```
/// use csm_docs_extract::classify::definition_parts;
///
/// assert_eq!(
///     definition_parts("BOX   xmin ymin zmin dx dy dz"),
///     Some(("BOX", "xmin ymin zmin dx dy dz"))
/// );
/// assert_eq!(definition_parts("  BOX xmin"), None);
/// assert_eq!(definition_parts("box xmin"), None);
/// assert_eq!(definition_parts("BOX"), None);
/// ```
pub fn definition_parts(line: &str) -> Option<(&str, &str)> {
    let caps = DEFINITION.captures(line)?;
    let name = caps.get(1)?.as_str();
    let parameters = caps.get(2).map_or("", |m| m.as_str().trim());
    Some((name, parameters))
}

/// Returns `true` if the line has the definition-line shape.
pub fn is_definition_line(line: &str) -> bool {
    DEFINITION.is_match(line)
}

/// Returns `true` if a definition-shaped line must not start a command:
/// reserved macro/constant prefixes and comment or `#define` text.
///
/// # Examples
///
/// ```
/// use csm_docs_extract::classify::is_excluded;
///
/// assert!(is_excluded("OCSM_MAXLEN 1024"));
/// assert!(is_excluded("SET value /* inline comment */"));
/// assert!(!is_excluded("SET $pmtrName exprs"));
/// ```
pub fn is_excluded(line: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        || EXCLUDED_SUBSTRINGS.iter().any(|needle| line.contains(needle))
}

/// Returns `true` if the trimmed line ends a notes block: blank, or shaped
/// like a definition once indentation is removed.
pub fn ends_notes(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || is_definition_line(trimmed)
}

/// Classifies one header line.
///
/// # Examples
///
/// ```
/// use csm_docs_extract::classify::{LineKind, classify_line};
///
/// assert_eq!(
///     classify_line("    use:    creates a rectangular box"),
///     LineKind::UsageAnnotation("creates a rectangular box")
/// );
/// assert_eq!(classify_line("   notes:"), LineKind::NotesAnnotation);
/// assert_eq!(classify_line("   "), LineKind::Blank);
/// ```
pub fn classify_line(line: &str) -> LineKind<'_> {
    if let Some((name, parameters)) = definition_parts(line) {
        if is_excluded(line) {
            return LineKind::Excluded;
        }
        return LineKind::Definition { name, parameters };
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineKind::Blank
    } else if let Some(rest) = trimmed.strip_prefix(USAGE_MARKER) {
        LineKind::UsageAnnotation(rest.trim())
    } else if trimmed.starts_with(NOTES_MARKER) {
        LineKind::NotesAnnotation
    } else {
        LineKind::Text(trimmed)
    }
}
