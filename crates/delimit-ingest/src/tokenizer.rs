//! Row tokenizer for delimited text.
//!
//! Scans a [`CharSource`] one column at a time and assembles logical rows.
//! A logical row may span several physical lines when a qualified field
//! contains line breaks. Row-shape decisions (empty rows, short and long
//! rows, header repeats) belong to the reader; the tokenizer only produces
//! raw fields plus the issues found while scanning them.

use std::io;

use delimit_model::WarningKind;

use crate::error::Result;
use crate::field::{FieldIssue, FieldRules, NBSP};
use crate::options::ReaderOptions;
use crate::source::CharSource;

/// How a column scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldEnd {
    Delimiter,
    LineEnd,
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    PreData,
    Quoted,
    PostData,
    Unquoted,
}

/// Position the tokenizer can be returned to on a rewindable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    position: usize,
    line: u64,
    end_of_input: bool,
}

/// Splits a character stream into rows of raw field text.
pub struct Tokenizer<S> {
    source: S,
    delimiter: char,
    qualifier: Option<char>,
    escape: Option<char>,
    comment_prefix: Vec<char>,
    context_sensitive: bool,
    duplicate_escape: bool,
    linefeed_as_space: bool,
    nbsp_as_space: bool,
    rules: FieldRules,
    field: String,
    leading: String,
    record_text: String,
    line: u64,
    start_line: u64,
    end_line: u64,
    issues: Vec<FieldIssue>,
    end_of_input: bool,
}

impl<S: CharSource> Tokenizer<S> {
    /// Creates a tokenizer after validating the options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when delimiter, qualifier, and escape
    /// choices conflict.
    pub fn new(source: S, options: &ReaderOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            source,
            delimiter: options.delimiter,
            qualifier: options.qualifier,
            escape: options.escape_prefix,
            comment_prefix: options.comment_prefix.chars().collect(),
            context_sensitive: options.context_sensitive_qualifier,
            duplicate_escape: options.duplicate_qualifier_as_escape,
            linefeed_as_space: options.treat_linefeed_as_space,
            nbsp_as_space: options.treat_nbsp_as_space,
            rules: FieldRules::new(options),
            field: String::new(),
            leading: String::new(),
            record_text: String::new(),
            line: 1,
            start_line: 1,
            end_line: 1,
            issues: Vec::new(),
            end_of_input: false,
        })
    }

    /// Reads the next logical row, or `None` at end of input.
    ///
    /// Comment lines are skipped. An empty physical line yields a row with a
    /// single empty field.
    pub fn read_row(&mut self) -> Option<Vec<String>> {
        self.issues.clear();
        self.record_text.clear();
        if self.end_of_input {
            return None;
        }
        loop {
            if self.source.peek().is_none() {
                self.end_of_input = true;
                return None;
            }
            if !self.at_comment() {
                break;
            }
            tracing::debug!(line = self.line, "skipping comment line");
            self.skip_line();
            self.record_text.clear();
        }

        self.start_line = self.line;
        let mut row = Vec::new();
        loop {
            let (end, quoted) = self.scan_field(row.len());
            let text = self.rules.finish(&self.field, quoted, row.len(), &mut self.issues);
            self.field.clear();
            row.push(text);
            match end {
                FieldEnd::Delimiter => {}
                FieldEnd::LineEnd => break,
                FieldEnd::EndOfInput => {
                    self.end_line = self.line;
                    self.end_of_input = true;
                    break;
                }
            }
        }
        Some(row)
    }

    /// Consumes one physical line without tokenizing it.
    ///
    /// Returns false when input was already exhausted.
    pub fn skip_line(&mut self) -> bool {
        if self.source.peek().is_none() {
            self.end_of_input = true;
            return false;
        }
        while let Some(ch) = self.source.peek() {
            if ch == '\r' || ch == '\n' {
                self.take_line_break();
                return true;
            }
            self.bump();
        }
        self.end_of_input = true;
        true
    }

    /// Issues found while scanning the last row.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn take_issues(&mut self) -> Vec<FieldIssue> {
        std::mem::take(&mut self.issues)
    }

    /// Raw source text of the last row, line breaks included.
    pub fn record_text(&self) -> &str {
        &self.record_text
    }

    /// First physical line of the last row.
    pub fn start_line(&self) -> u64 {
        self.start_line
    }

    /// Last physical line of the last row.
    pub fn end_line(&self) -> u64 {
        self.end_line
    }

    /// Physical line the next row starts on.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn is_end_of_input(&self) -> bool {
        self.end_of_input
    }

    /// True when no characters remain to be read.
    pub fn at_end(&mut self) -> bool {
        self.end_of_input || self.source.peek().is_none()
    }

    pub fn is_rewindable(&self) -> bool {
        self.source.is_rewindable()
    }

    pub fn progress(&self) -> Option<f64> {
        self.source.progress()
    }

    /// Read error hit by the source since the last call, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.source.take_error()
    }

    pub fn mark(&self) -> Mark {
        Mark {
            position: self.source.position(),
            line: self.line,
            end_of_input: self.end_of_input,
        }
    }

    /// Returns to `mark`; false when the source cannot seek.
    pub fn rewind(&mut self, mark: Mark) -> bool {
        if !self.source.seek(mark.position) {
            return false;
        }
        self.line = mark.line;
        self.end_of_input = mark.end_of_input;
        self.issues.clear();
        self.record_text.clear();
        true
    }

    /// Marks input as finished; later reads return `None` without scanning.
    pub fn force_end_of_input(&mut self) {
        self.end_of_input = true;
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.source.next_char()?;
        self.record_text.push(ch);
        Some(ch)
    }

    fn at_comment(&mut self) -> bool {
        if self.comment_prefix.is_empty() {
            return false;
        }
        let prefix_len = self.comment_prefix.len();
        for index in 0..prefix_len {
            if self.source.peek_at(index) != Some(self.comment_prefix[index]) {
                return false;
            }
        }
        true
    }

    /// Consumes CR, LF, CR LF, or LF CR and counts one line.
    fn take_line_break(&mut self) -> &'static str {
        let first = self.bump();
        let next = self.source.peek();
        let sequence = match (first, next) {
            (Some('\r'), Some('\n')) => {
                self.bump();
                "\r\n"
            }
            (Some('\n'), Some('\r')) => {
                self.bump();
                "\n\r"
            }
            (Some('\r'), _) => "\r",
            _ => "\n",
        };
        self.line += 1;
        sequence
    }

    fn is_leading_whitespace(&self, ch: char) -> bool {
        ch != self.delimiter && ch != '\r' && ch != '\n' && ch.is_whitespace()
    }

    fn map_char(&self, ch: char) -> char {
        if ch == NBSP && self.nbsp_as_space { ' ' } else { ch }
    }

    /// Ends the row on a line break, recording the row's last line first.
    fn end_line_here(&mut self) -> FieldEnd {
        self.end_line = self.line;
        self.take_line_break();
        FieldEnd::LineEnd
    }

    fn scan_field(&mut self, column: usize) -> (FieldEnd, bool) {
        self.field.clear();
        self.leading.clear();
        let mut state = ScanState::PreData;
        let mut quoted = false;
        let mut escaped = false;

        loop {
            let Some(ch) = self.source.peek() else {
                match state {
                    ScanState::PreData => self.field.push_str(&self.leading),
                    ScanState::Quoted => self.issues.push(FieldIssue::column(
                        column,
                        WarningKind::Qualifier,
                        "Qualified field was not closed before the end of input",
                    )),
                    ScanState::PostData | ScanState::Unquoted => {}
                }
                return (FieldEnd::EndOfInput, quoted);
            };

            match state {
                ScanState::PreData => {
                    if ch == self.delimiter {
                        self.bump();
                        self.field.push_str(&self.leading);
                        return (FieldEnd::Delimiter, false);
                    }
                    if ch == '\r' || ch == '\n' {
                        self.field.push_str(&self.leading);
                        return (self.end_line_here(), false);
                    }
                    self.bump();
                    if Some(ch) == self.qualifier {
                        self.leading.clear();
                        quoted = true;
                        state = ScanState::Quoted;
                    } else if Some(ch) == self.escape {
                        self.field.push_str(&self.leading);
                        escaped = true;
                        state = ScanState::Unquoted;
                    } else if self.is_leading_whitespace(ch) {
                        self.leading.push(ch);
                    } else {
                        self.field.push_str(&self.leading);
                        self.field.push(self.map_char(ch));
                        state = ScanState::Unquoted;
                    }
                }
                ScanState::Unquoted => {
                    if escaped {
                        escaped = false;
                        if ch == '\r' || ch == '\n' {
                            let sequence = self.take_line_break();
                            self.field.push_str(sequence);
                        } else {
                            self.bump();
                            self.field.push(ch);
                        }
                    } else if ch == self.delimiter {
                        self.bump();
                        return (FieldEnd::Delimiter, false);
                    } else if ch == '\r' || ch == '\n' {
                        return (self.end_line_here(), false);
                    } else {
                        self.bump();
                        if Some(ch) == self.escape {
                            escaped = true;
                        } else {
                            self.field.push(self.map_char(ch));
                        }
                    }
                }
                ScanState::Quoted => {
                    if escaped {
                        escaped = false;
                        if ch == '\r' || ch == '\n' {
                            let sequence = self.take_line_break();
                            self.field.push_str(sequence);
                        } else {
                            self.bump();
                            self.field.push(ch);
                        }
                    } else if Some(ch) == self.qualifier {
                        let next = self.source.peek_at(1);
                        self.bump();
                        if self.duplicate_escape && next == Some(ch) {
                            self.bump();
                            self.field.push(ch);
                        } else if !self.context_sensitive
                            || next.is_none_or(|c| c == self.delimiter || c == '\r' || c == '\n')
                        {
                            state = ScanState::PostData;
                        } else {
                            self.field.push(ch);
                        }
                    } else if ch == '\r' || ch == '\n' {
                        let sequence = self.take_line_break();
                        if sequence == "\n" && self.linefeed_as_space {
                            self.field.push(' ');
                        } else {
                            self.field.push_str(sequence);
                        }
                    } else {
                        self.bump();
                        if Some(ch) == self.escape {
                            escaped = true;
                        } else {
                            self.field.push(self.map_char(ch));
                        }
                    }
                }
                ScanState::PostData => {
                    if ch == self.delimiter {
                        self.bump();
                        return (FieldEnd::Delimiter, true);
                    }
                    if ch == '\r' || ch == '\n' {
                        return (self.end_line_here(), true);
                    }
                    self.bump();
                }
            }
        }
    }
}

/// Tokenizes `text` with `options`, skipping the reader's row handling.
///
/// # Errors
///
/// Returns a configuration error for invalid options.
pub fn split_rows(text: &str, options: &ReaderOptions) -> Result<Vec<Vec<String>>> {
    let mut tokenizer = Tokenizer::new(crate::source::TextSource::new(text), options)?;
    let mut rows = Vec::new();
    while let Some(row) = tokenizer.read_row() {
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TrimmingOption;
    use crate::source::TextSource;

    fn rows(text: &str, options: &ReaderOptions) -> Vec<Vec<String>> {
        split_rows(text, options).expect("valid options")
    }

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| (*f).to_string()).collect()
    }

    #[test]
    fn splits_respecting_qualifiers() {
        let options = ReaderOptions::default();
        assert_eq!(rows("a,\"b,c\",d", &options), vec![row(&["a", "b,c", "d"])]);
    }

    #[test]
    fn doubled_qualifier_is_literal() {
        let options = ReaderOptions::default();
        assert_eq!(
            rows("\"He said \"\"hi\"\"\"", &options),
            vec![row(&["He said \"hi\""])]
        );
    }

    #[test]
    fn line_endings_all_end_rows() {
        let options = ReaderOptions::default();
        let parsed = rows("a,b\r\nc,d\re,f\ng,h\n\ri,j", &options);
        assert_eq!(
            parsed,
            vec![
                row(&["a", "b"]),
                row(&["c", "d"]),
                row(&["e", "f"]),
                row(&["g", "h"]),
                row(&["i", "j"])
            ]
        );
    }

    #[test]
    fn trailing_delimiter_gives_empty_field() {
        let options = ReaderOptions::default();
        assert_eq!(rows("a,b,\n", &options), vec![row(&["a", "b", ""])]);
    }

    #[test]
    fn quoted_line_break_spans_lines() {
        let options = ReaderOptions::default();
        let mut tokenizer =
            Tokenizer::new(TextSource::new("h\n\"x\ny\",z\nnext\n"), &options).expect("options");
        tokenizer.read_row();
        let second = tokenizer.read_row().expect("row");
        assert_eq!(second, row(&["x\ny", "z"]));
        assert_eq!(tokenizer.start_line(), 2);
        assert_eq!(tokenizer.end_line(), 3);
        assert_eq!(tokenizer.record_text(), "\"x\ny\",z\n");
        tokenizer.read_row();
        assert_eq!(tokenizer.start_line(), 4);
    }

    #[test]
    fn linefeed_as_space_in_quotes() {
        let options = ReaderOptions::default().with_treat_linefeed_as_space(true);
        assert_eq!(rows("\"x\ny\"", &options), vec![row(&["x y"])]);
        assert_eq!(rows("\"x\r\ny\"", &options), vec![row(&["x\r\ny"])]);
    }

    #[test]
    fn context_sensitive_qualifier_keeps_inner_quotes() {
        let options = ReaderOptions::default()
            .with_context_sensitive_qualifier(true)
            .with_duplicate_qualifier_as_escape(false);
        assert_eq!(
            rows("\"a \"quoted\" word\",b", &options),
            vec![row(&["a \"quoted\" word", "b"])]
        );
    }

    #[test]
    fn text_after_closing_qualifier_is_dropped() {
        let options = ReaderOptions::default();
        assert_eq!(rows("\"a\"junk,b", &options), vec![row(&["a", "b"])]);
    }

    #[test]
    fn escape_prefix_makes_next_char_literal() {
        let options = ReaderOptions::default().with_escape_prefix(Some('\\'));
        assert_eq!(
            rows("a\\,b,c\\\\d,\\\"e", &options),
            vec![row(&["a,b", "c\\d", "\"e"])]
        );
    }

    #[test]
    fn comment_lines_are_skipped() {
        let options = ReaderOptions::default().with_comment_prefix("#");
        assert_eq!(
            rows("#note, with, commas\na,b\n# another\nc,d", &options),
            vec![row(&["a", "b"]), row(&["c", "d"])]
        );
    }

    #[test]
    fn leading_whitespace_kept_without_trimming() {
        let options = ReaderOptions::default().with_trimming(TrimmingOption::None);
        assert_eq!(
            rows("  a , \"b\" ,  ", &options),
            vec![row(&["  a ", "b", "  "])]
        );
        let trimmed = ReaderOptions::default();
        assert_eq!(rows("  a , \"b\" ,  ", &trimmed), vec![row(&["a", "b", ""])]);
    }

    #[test]
    fn unterminated_qualifier_reports_issue() {
        let options = ReaderOptions::default();
        let mut tokenizer = Tokenizer::new(TextSource::new("a,\"open"), &options).expect("options");
        assert_eq!(tokenizer.read_row(), Some(row(&["a", "open"])));
        assert_eq!(tokenizer.issues().len(), 1);
        assert_eq!(tokenizer.issues()[0].column, Some(1));
        assert!(tokenizer.read_row().is_none());
    }

    #[test]
    fn no_qualifier_treats_quotes_as_data() {
        let options = ReaderOptions::default().with_qualifier(None);
        assert_eq!(rows("\"a,b\"", &options), vec![row(&["\"a", "b\""])]);
    }

    #[test]
    fn rewind_replays_rows() {
        let options = ReaderOptions::default();
        let mut tokenizer =
            Tokenizer::new(TextSource::new("a\nb\nc\n"), &options).expect("options");
        tokenizer.read_row();
        let mark = tokenizer.mark();
        let first: Vec<_> = std::iter::from_fn(|| tokenizer.read_row()).collect();
        assert!(tokenizer.rewind(mark));
        let second: Vec<_> = std::iter::from_fn(|| tokenizer.read_row()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![row(&["b"]), row(&["c"])]);
    }

    #[test]
    fn empty_line_is_single_empty_field() {
        let options = ReaderOptions::default();
        assert_eq!(
            rows("a\n\nb", &options),
            vec![row(&["a"]), row(&[""]), row(&["b"])]
        );
    }
}
