//! Reader configuration.
//!
//! Every option is fixed for the lifetime of one reader. Options are plain
//! serde structs so callers can keep them in a settings file.

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Which fields get leading and trailing whitespace removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrimmingOption {
    /// Keep all whitespace.
    None,
    /// Trim fields that were not enclosed in qualifiers.
    #[default]
    Unquoted,
    /// Trim every field, including the content of qualified fields.
    All,
}

/// Per-kind warning toggles and the shared ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningOptions {
    /// Warn when a value contains the delimiter.
    pub delimiter_in_value: bool,
    /// Warn when a value contains the qualifier.
    pub qualifier_in_value: bool,
    /// Warn when a value contains a line break.
    pub line_feed: bool,
    /// Warn on dense runs of replacement characters.
    pub unknown_character: bool,
    /// Warn when a value contains a non-breaking space.
    pub non_breaking_space: bool,
    /// Report extra trailing columns that were all empty.
    pub empty_trailing_columns: bool,
    /// Maximum number of warnings emitted per kind in one read pass.
    pub max_per_kind: usize,
}

impl Default for WarningOptions {
    fn default() -> Self {
        Self {
            delimiter_in_value: false,
            qualifier_in_value: false,
            line_feed: false,
            unknown_character: true,
            non_breaking_space: true,
            empty_trailing_columns: true,
            max_per_kind: 100,
        }
    }
}

/// Options for reading delimited text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    pub delimiter: char,
    /// Quote character; `None` disables quoting.
    pub qualifier: Option<char>,
    /// Character that makes the following delimiter, qualifier, or escape literal.
    pub escape_prefix: Option<char>,
    /// Lines starting with this text are skipped; empty disables comments.
    pub comment_prefix: String,
    /// Literal standing for the delimiter inside values.
    pub delimiter_placeholder: String,
    /// Literal standing for the qualifier inside values.
    pub qualifier_placeholder: String,
    /// Literal standing for a line break inside values.
    pub newline_placeholder: String,
    pub trimming: TrimmingOption,
    /// A qualifier only closes a field when followed by a delimiter or line end.
    pub context_sensitive_qualifier: bool,
    /// Two consecutive qualifiers inside a qualified field are one literal qualifier.
    pub duplicate_qualifier_as_escape: bool,
    /// A lone line feed inside a qualified field becomes a space.
    pub treat_linefeed_as_space: bool,
    /// Replacement characters (U+FFFD) become spaces.
    pub treat_unknown_character_as_space: bool,
    /// Non-breaking spaces become regular spaces.
    pub treat_nbsp_as_space: bool,
    /// Field text that is read as null; empty disables.
    pub treat_text_as_null: String,
    pub has_header: bool,
    /// Physical lines skipped before the header.
    pub skip_rows: usize,
    /// Skip rows that repeat the header.
    pub skip_duplicate_header: bool,
    pub skip_empty_lines: bool,
    /// Consecutive empty rows after which input is considered finished.
    pub consecutive_empty_rows: usize,
    /// Join a short row with the following line.
    pub allow_row_combining: bool,
    /// Try to realign rows with too many columns.
    pub try_to_solve_more_columns: bool,
    /// Maximum number of records returned; `None` reads everything.
    pub record_limit: Option<u64>,
    /// A lone short last row up to this many characters is taken as an end marker.
    pub eof_marker_max_len: usize,
    /// Zone date-time values are converted into.
    pub destination_time_zone: String,
    pub warnings: WarningOptions,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            qualifier: Some('"'),
            escape_prefix: None,
            comment_prefix: String::new(),
            delimiter_placeholder: String::new(),
            qualifier_placeholder: String::new(),
            newline_placeholder: String::new(),
            trimming: TrimmingOption::default(),
            context_sensitive_qualifier: false,
            duplicate_qualifier_as_escape: true,
            treat_linefeed_as_space: false,
            treat_unknown_character_as_space: false,
            treat_nbsp_as_space: false,
            treat_text_as_null: "NULL".to_string(),
            has_header: true,
            skip_rows: 0,
            skip_duplicate_header: true,
            skip_empty_lines: true,
            consecutive_empty_rows: 5,
            allow_row_combining: false,
            try_to_solve_more_columns: false,
            record_limit: None,
            eof_marker_max_len: 10,
            destination_time_zone: "UTC".to_string(),
            warnings: WarningOptions::default(),
        }
    }
}

impl ReaderOptions {
    /// Tab-separated defaults.
    pub fn tab_separated() -> Self {
        Self {
            delimiter: '\t',
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Option<char>) -> Self {
        self.qualifier = qualifier;
        self
    }

    #[must_use]
    pub fn with_escape_prefix(mut self, escape: Option<char>) -> Self {
        self.escape_prefix = escape;
        self
    }

    #[must_use]
    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    /// Set the delimiter, qualifier, and newline placeholders.
    #[must_use]
    pub fn with_placeholders(
        mut self,
        delimiter: impl Into<String>,
        qualifier: impl Into<String>,
        newline: impl Into<String>,
    ) -> Self {
        self.delimiter_placeholder = delimiter.into();
        self.qualifier_placeholder = qualifier.into();
        self.newline_placeholder = newline.into();
        self
    }

    #[must_use]
    pub fn with_trimming(mut self, trimming: TrimmingOption) -> Self {
        self.trimming = trimming;
        self
    }

    #[must_use]
    pub fn with_context_sensitive_qualifier(mut self, enabled: bool) -> Self {
        self.context_sensitive_qualifier = enabled;
        self
    }

    #[must_use]
    pub fn with_duplicate_qualifier_as_escape(mut self, enabled: bool) -> Self {
        self.duplicate_qualifier_as_escape = enabled;
        self
    }

    #[must_use]
    pub fn with_treat_linefeed_as_space(mut self, enabled: bool) -> Self {
        self.treat_linefeed_as_space = enabled;
        self
    }

    #[must_use]
    pub fn with_treat_unknown_character_as_space(mut self, enabled: bool) -> Self {
        self.treat_unknown_character_as_space = enabled;
        self
    }

    #[must_use]
    pub fn with_treat_nbsp_as_space(mut self, enabled: bool) -> Self {
        self.treat_nbsp_as_space = enabled;
        self
    }

    #[must_use]
    pub fn with_treat_text_as_null(mut self, text: impl Into<String>) -> Self {
        self.treat_text_as_null = text.into();
        self
    }

    #[must_use]
    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    #[must_use]
    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    #[must_use]
    pub fn with_skip_duplicate_header(mut self, enabled: bool) -> Self {
        self.skip_duplicate_header = enabled;
        self
    }

    #[must_use]
    pub fn with_skip_empty_lines(mut self, enabled: bool) -> Self {
        self.skip_empty_lines = enabled;
        self
    }

    #[must_use]
    pub fn with_consecutive_empty_rows(mut self, rows: usize) -> Self {
        self.consecutive_empty_rows = rows;
        self
    }

    #[must_use]
    pub fn with_row_combining(mut self, enabled: bool) -> Self {
        self.allow_row_combining = enabled;
        self
    }

    #[must_use]
    pub fn with_realign_columns(mut self, enabled: bool) -> Self {
        self.try_to_solve_more_columns = enabled;
        self
    }

    #[must_use]
    pub fn with_record_limit(mut self, limit: Option<u64>) -> Self {
        self.record_limit = limit;
        self
    }

    #[must_use]
    pub fn with_eof_marker_max_len(mut self, length: usize) -> Self {
        self.eof_marker_max_len = length;
        self
    }

    #[must_use]
    pub fn with_destination_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.destination_time_zone = zone.into();
        self
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: WarningOptions) -> Self {
        self.warnings = warnings;
        self
    }

    /// Checks delimiter, qualifier, and escape choices.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] when the characters collide or
    /// use a line break (or a space, for the delimiter).
    pub fn validate(&self) -> Result<()> {
        if matches!(self.delimiter, '\0' | '\r' | '\n' | ' ') {
            return Err(IngestError::configuration(format!(
                "delimiter {:?} is not allowed; it must be set and must not be a line break or space",
                self.delimiter
            )));
        }
        if let Some(qualifier) = self.qualifier {
            if qualifier == self.delimiter {
                return Err(IngestError::configuration(format!(
                    "qualifier {qualifier:?} must differ from the delimiter"
                )));
            }
            if matches!(qualifier, '\r' | '\n') {
                return Err(IngestError::configuration(
                    "qualifier must not be a line break",
                ));
            }
        }
        if let Some(escape) = self.escape_prefix {
            if escape == self.delimiter {
                return Err(IngestError::configuration(format!(
                    "escape prefix {escape:?} must differ from the delimiter"
                )));
            }
            if Some(escape) == self.qualifier {
                return Err(IngestError::configuration(format!(
                    "escape prefix {escape:?} must differ from the qualifier"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ReaderOptions::default().validate().is_ok());
        assert!(ReaderOptions::tab_separated().validate().is_ok());
    }

    #[test]
    fn rejects_bad_delimiters() {
        for delimiter in ['\r', '\n', ' '] {
            let options = ReaderOptions::default().with_delimiter(delimiter);
            assert!(matches!(
                options.validate(),
                Err(IngestError::Configuration { .. })
            ));
        }
    }

    #[test]
    fn rejects_qualifier_equal_to_delimiter() {
        let options = ReaderOptions::default().with_qualifier(Some(','));
        assert!(options.validate().is_err());
        let options = ReaderOptions::default().with_qualifier(Some('\n'));
        assert!(options.validate().is_err());
    }

    #[test]
    fn rejects_escape_collisions() {
        let options = ReaderOptions::default().with_escape_prefix(Some(','));
        assert!(options.validate().is_err());
        let options = ReaderOptions::default().with_escape_prefix(Some('"'));
        assert!(options.validate().is_err());
        let options = ReaderOptions::default().with_escape_prefix(Some('\\'));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn options_round_trip_through_json_with_defaults() {
        let options: ReaderOptions =
            serde_json::from_str(r#"{"delimiter": ";", "qualifier": null}"#).expect("parse");
        assert_eq!(options.delimiter, ';');
        assert_eq!(options.qualifier, None);
        assert_eq!(options.consecutive_empty_rows, 5);
    }
}
