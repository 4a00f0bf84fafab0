//! Extraction statistics.

use serde::{Deserialize, Serialize};

/// Counters collected during one extraction run.
///
/// Duplicates and excluded lines are expected outcomes, not errors; they are
/// recorded here so callers can surface them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Number of input lines processed.
    pub lines_scanned: usize,
    /// Definition lines accepted (including ones later overwritten).
    pub definitions: usize,
    /// Definition-shaped lines rejected by the exclusion policy.
    pub excluded_lines: usize,
    /// Names whose earlier record was replaced, in replacement order.
    pub duplicates: Vec<String>,
    /// Records in the final index.
    pub commands: usize,
    /// Records with a usage line.
    pub with_usage: usize,
    /// Records with notes.
    pub with_notes: usize,
}

impl ExtractionReport {
    /// Human-readable warnings for the outcomes worth flagging.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.duplicates.is_empty() {
            warnings.push(format!(
                "{} duplicate definition(s) replaced by later ones: {}",
                self.duplicates.len(),
                self.duplicates.join(", ")
            ));
        }

        if self.lines_scanned > 0 && self.commands == 0 {
            warnings.push("No command definitions found".to_string());
        }

        warnings
    }
}
