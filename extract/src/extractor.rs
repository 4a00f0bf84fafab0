//! Single-pass documentation extraction over header text.
//!
//! [`HeaderDocExtractor`] consumes classified lines one at a time and keeps a
//! single open record. A definition line seals the open record into the index
//! (replacing any earlier record of the same name) and opens a new one. While
//! a record is open and has not yet seen `notes:`, a `use:` line sets its
//! usage; a `notes:` line switches to note collection, which runs until a
//! blank line or a definition-shaped line and closes documentation for that
//! record.

use csm_docs_core::{CommandIndex, CommandRecord, join_note_lines};
use tracing::{debug, info};

use crate::classify::{LineKind, classify_line, ends_notes};
use crate::report::ExtractionReport;

#[derive(Debug, Default)]
enum DocState {
    /// No record open, or the open record's documentation is complete.
    #[default]
    Closed,
    /// Record open; `use:` and `notes:` are still accepted.
    Awaiting,
    /// Inside a `notes:` block.
    Notes(Vec<String>),
}

/// Streaming extractor; feed lines in order, then call [`finish`](Self::finish).
///
/// # Examples
///
/// ```
/// use csm_docs_extract::HeaderDocExtractor;
///
/// let mut extractor = HeaderDocExtractor::new();
/// for line in ["SPHERE  xcent ycent zcent radius", "    use:  creates a sphere"] {
///     extractor.feed_line(line);
/// }
/// let (index, report) = extractor.finish();
/// assert_eq!(index.get("SPHERE").unwrap().usage, "creates a sphere");
/// assert_eq!(report.definitions, 1);
/// ```
#[derive(Debug, Default)]
pub struct HeaderDocExtractor {
    index: CommandIndex,
    current: Option<CommandRecord>,
    state: DocState,
    report: ExtractionReport,
}

impl HeaderDocExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one line (without its line terminator).
    pub fn feed_line(&mut self, line: &str) {
        self.report.lines_scanned += 1;

        if let DocState::Notes(lines) = &mut self.state {
            if !ends_notes(line) {
                lines.push(line.trim().to_string());
                return;
            }
            self.close_notes();
        }

        match classify_line(line) {
            LineKind::Definition { name, parameters } => {
                self.seal();
                self.report.definitions += 1;
                self.current = Some(CommandRecord::new(name, parameters));
                self.state = DocState::Awaiting;
            }
            LineKind::Excluded => {
                self.report.excluded_lines += 1;
            }
            LineKind::UsageAnnotation(usage) => {
                if let (DocState::Awaiting, Some(record)) = (&self.state, &mut self.current) {
                    record.usage = usage.to_string();
                }
            }
            LineKind::NotesAnnotation => {
                if matches!(self.state, DocState::Awaiting) && self.current.is_some() {
                    self.state = DocState::Notes(Vec::new());
                }
            }
            LineKind::Blank | LineKind::Text(_) => {}
        }
    }

    /// Seals the open record and returns the index with its report.
    pub fn finish(mut self) -> (CommandIndex, ExtractionReport) {
        if matches!(self.state, DocState::Notes(_)) {
            self.close_notes();
        }
        self.seal();

        self.report.commands = self.index.len();
        self.report.with_usage = self.index.records().filter(|r| !r.usage.is_empty()).count();
        self.report.with_notes = self.index.records().filter(|r| !r.notes.is_empty()).count();

        info!(
            commands = self.report.commands,
            definitions = self.report.definitions,
            duplicates = self.report.duplicates.len(),
            "Extracted command documentation"
        );
        (self.index, self.report)
    }

    fn close_notes(&mut self) {
        if let DocState::Notes(lines) = std::mem::take(&mut self.state) {
            if let Some(record) = self.current.as_mut() {
                record.notes = join_note_lines(&lines);
            }
        }
    }

    fn seal(&mut self) {
        self.state = DocState::Closed;
        let Some(record) = self.current.take() else {
            return;
        };
        debug!(command = %record.name, "Sealed command record");
        let name = record.name.clone();
        if self.index.insert(record).is_some() {
            debug!(command = %name, "Replaced earlier definition");
            self.report.duplicates.push(name);
        }
    }
}

/// Extracts the command index from header text. Never fails; malformed lines
/// are skipped.
///
/// # Examples
///
/// ```
/// use csm_docs_extract::extract;
///
/// let header = "\
/// BOX   xmin ymin zmin dx dy dz
///     use:    creates a rectangular box
///     notes:
///         xmin,ymin,zmin are the coordinates of one corner
///
/// ";
/// let index = extract(header);
/// let record = index.get("BOX").unwrap();
/// assert_eq!(record.syntax, "BOX xmin ymin zmin dx dy dz");
/// assert_eq!(record.usage, "creates a rectangular box");
/// assert_eq!(record.notes, "xmin,ymin,zmin are the coordinates of one corner");
/// ```
pub fn extract(header_text: &str) -> CommandIndex {
    extract_with_report(header_text).0
}

/// Same as [`extract`], also returning extraction statistics.
pub fn extract_with_report(header_text: &str) -> (CommandIndex, ExtractionReport) {
    let mut extractor = HeaderDocExtractor::new();
    for line in header_text.lines() {
        extractor.feed_line(line);
    }
    extractor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_without_docs() {
        let index = extract("UNION     toMark=0  trimList=0  maxtol=0\n");
        let record = index.get("UNION").unwrap();
        assert_eq!(record.parameters, "toMark=0  trimList=0  maxtol=0");
        assert_eq!(record.syntax, "UNION toMark=0  trimList=0  maxtol=0");
        assert!(record.is_undocumented());
    }

    #[test]
    fn test_usage_then_notes() {
        let header = "\
SET       $pmtrName exprs
          use:    define a (local) parameter
          notes:  Sketch: may be used
                  if pmtrName already exists, its value is changed
                  multi-valued parameters need brackets
REORDER   ishift iflip=0
";
        let index = extract(header);
        let set = index.get("SET").unwrap();
        assert_eq!(set.usage, "define a (local) parameter");
        assert_eq!(
            set.notes,
            "if pmtrName already exists, its value is changed\\nmulti-valued parameters need brackets"
        );
        assert!(index.contains("REORDER"));
    }

    #[test]
    fn test_blank_line_ends_notes_but_not_record() {
        let header = "\
FILLET    radius edgeList=0
          notes:
              first note

              after blank
          use:    too late
";
        let index = extract(header);
        let fillet = index.get("FILLET").unwrap();
        assert_eq!(fillet.notes, "first note");
        assert!(fillet.usage.is_empty());
    }

    #[test]
    fn test_blank_line_does_not_end_usage_scan() {
        let header = "\
CHAMFER   radius edgeList=0

          use:    applies a chamfer
";
        let index = extract(header);
        assert_eq!(index.get("CHAMFER").unwrap().usage, "applies a chamfer");
    }

    #[test]
    fn test_notes_stop_at_next_definition() {
        let header = "\
SPHERE    xcent ycent zcent radius
          notes:
              radius must be positive
CYLINDER  xbeg ybeg zbeg xend yend zend radius
          use:    creates a cylinder
";
        let index = extract(header);
        assert_eq!(index.get("SPHERE").unwrap().notes, "radius must be positive");
        assert_eq!(index.get("CYLINDER").unwrap().usage, "creates a cylinder");
    }

    #[test]
    fn test_notes_at_end_of_input_are_kept() {
        let index = extract("TORUS  xcent ycent zcent\n notes:\n   last line");
        assert_eq!(index.get("TORUS").unwrap().notes, "last line");
    }

    #[test]
    fn test_duplicate_definition_last_wins() {
        let header = "\
BOX   old params
      use:    old usage
BOX   xmin ymin zmin dx dy dz
";
        let (index, report) = extract_with_report(header);
        let record = index.get("BOX").unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(record.parameters, "xmin ymin zmin dx dy dz");
        assert!(record.usage.is_empty());
        assert_eq!(report.duplicates, vec!["BOX".to_string()]);
    }

    #[test]
    fn test_annotations_before_any_definition_are_ignored() {
        let (index, report) = extract_with_report("  use: orphan\n  notes:\n  orphan note\n");
        assert!(index.is_empty());
        assert_eq!(report.lines_scanned, 3);
    }

    #[test]
    fn test_excluded_line_does_not_seal_record() {
        let header = "\
EXTRUDE   dx dy dz
DEFINE    X /* not a command */
          use:    extrudes a sketch
";
        let (index, report) = extract_with_report(header);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("EXTRUDE").unwrap().usage, "extrudes a sketch");
        assert_eq!(report.excluded_lines, 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let index = extract("BOX   a b c\r\n   use:  box\r\n");
        let record = index.get("BOX").unwrap();
        assert_eq!(record.parameters, "a b c");
        assert_eq!(record.usage, "box");
    }

    #[test]
    fn test_empty_input() {
        let (index, report) = extract_with_report("");
        assert!(index.is_empty());
        assert_eq!(report, ExtractionReport::default());
    }
}
