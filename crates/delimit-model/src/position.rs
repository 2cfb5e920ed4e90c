use serde::{Deserialize, Serialize};

/// Where the current record sits in the source.
///
/// A record may span several physical lines when a field holds line breaks.
/// Lines are 1-based; `record_number` counts records returned so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPosition {
    pub start_line: u64,
    pub end_line: u64,
    pub record_number: u64,
}

impl RecordPosition {
    /// Number of physical lines the record covers.
    pub fn line_span(&self) -> u64 {
        if self.end_line < self.start_line {
            0
        } else {
            self.end_line - self.start_line + 1
        }
    }
}
