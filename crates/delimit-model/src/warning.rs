//! Warnings raised while reading.
//!
//! Warnings never abort a read. They are handed to the caller through the
//! reader's event sink; the core does not store or display them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What part of the record a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningScope {
    /// The whole record (ordinal −1).
    Row,
    /// A trailing-column heuristic applied to the header (ordinal −2).
    Trailer,
    /// A single column by ordinal.
    Column(usize),
}

impl WarningScope {
    pub const ROW_ORDINAL: i64 = -1;
    pub const TRAILER_ORDINAL: i64 = -2;

    /// Numeric ordinal: column index, −1 for rows, −2 for the trailer heuristic.
    pub fn ordinal(&self) -> i64 {
        match self {
            WarningScope::Row => Self::ROW_ORDINAL,
            WarningScope::Trailer => Self::TRAILER_ORDINAL,
            WarningScope::Column(ordinal) => *ordinal as i64,
        }
    }
}

/// Warning category; each category is throttled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningKind {
    /// Field contains the delimiter.
    Delimiter,
    /// Field contains the qualifier.
    Qualifier,
    /// Field contains a line break.
    LineFeed,
    /// Field contains a dense run of replacement characters.
    UnknownCharacter,
    /// Field contains a non-breaking space.
    NonBreakingSpace,
    /// Additional trailing columns were all empty.
    EmptyTrailingColumns,
    /// Row has fewer or more columns than expected.
    RowShape,
    /// Row realignment attempt.
    Realign,
    /// Value could not be converted to the column type.
    Conversion,
    /// Header name was adjusted.
    ColumnName,
    /// Schema binding issue.
    Schema,
    /// Unexpected failure while scanning.
    Scan,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Delimiter => "delimiter",
            WarningKind::Qualifier => "qualifier",
            WarningKind::LineFeed => "line feed",
            WarningKind::UnknownCharacter => "unknown character",
            WarningKind::NonBreakingSpace => "non-breaking space",
            WarningKind::EmptyTrailingColumns => "empty trailing columns",
            WarningKind::RowShape => "row shape",
            WarningKind::Realign => "realign",
            WarningKind::Conversion => "conversion",
            WarningKind::ColumnName => "column name",
            WarningKind::Schema => "schema",
            WarningKind::Scan => "scan",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable issue tied to a record and optionally a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub record_number: u64,
    pub scope: WarningScope,
    pub kind: WarningKind,
    pub message: String,
    pub start_line: u64,
    pub end_line: u64,
    pub column_name: Option<String>,
}

impl Warning {
    /// Column ordinal, −1 for row-level and −2 for trailer warnings.
    pub fn ordinal(&self) -> i64 {
        self.scope.ordinal()
    }

    pub fn is_row_level(&self) -> bool {
        self.scope == WarningScope::Row
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}", self.record_number)?;
        if self.start_line == self.end_line {
            write!(f, " (line {})", self.start_line)?;
        } else {
            write!(f, " (lines {}-{})", self.start_line, self.end_line)?;
        }
        if let Some(name) = &self.column_name {
            write!(f, ", column '{name}'")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_for_scopes() {
        assert_eq!(WarningScope::Row.ordinal(), -1);
        assert_eq!(WarningScope::Trailer.ordinal(), -2);
        assert_eq!(WarningScope::Column(4).ordinal(), 4);
    }

    #[test]
    fn display_includes_lines_and_column() {
        let warning = Warning {
            record_number: 3,
            scope: WarningScope::Column(1),
            kind: WarningKind::Conversion,
            message: "'x' is not an integer".to_string(),
            start_line: 4,
            end_line: 5,
            column_name: Some("Qty".to_string()),
        };
        assert_eq!(
            warning.to_string(),
            "record 3 (lines 4-5), column 'Qty': 'x' is not an integer"
        );
    }
}
