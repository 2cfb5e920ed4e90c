//! Pull-based reader for delimited text.
//!
//! [`DelimitedReader`] owns one tokenizer over one character source. `open`
//! reads the header and binds the schema, `read` advances to the next
//! record, and the [`TypedAccess`] getters convert values of the current
//! record. Everything that can be pinned to a single value or row is
//! reported as a warning; only configuration and open failures are errors.

use std::collections::VecDeque;
use std::path::Path;

use chrono::NaiveDateTime;
use encoding_rs::Encoding;

use delimit_model::{
    Column, DataType, RecordPosition, SchemaDescription, ValueFormat, Warning, WarningKind,
    WarningScope,
};

use crate::access::TypedAccess;
use crate::convert::{ConversionError, DateFormat};
use crate::error::{IngestError, Result};
use crate::events::{CancelFlag, ColumnErrors, Notifier, ReaderEvents};
use crate::field::FieldIssue;
use crate::names::{default_column_name, normalize_column_names};
use crate::options::ReaderOptions;
use crate::realign::RowRealigner;
use crate::schema::{BoundColumn, BoundSchema, bind_schema};
use crate::source::{CharSource, open_file};
use crate::timezone::{FixedOffsetAdjust, TimeZoneAdjust};
use crate::tokenizer::{Mark, Tokenizer};

/// Rows looked at after the header to decide whether an unnamed trailing
/// column holds data.
pub const DISCOVERY_ROWS: usize = 10;

/// Columns a joined short row may exceed the expected width by.
pub const COMBINE_SLACK: usize = 3;

/// A boxed character source, owned or borrowed for `'a`.
pub type BoxedSource<'a> = Box<dyn CharSource + 'a>;

type Opener<'a> = Box<dyn FnMut() -> Result<BoxedSource<'a>> + 'a>;

/// One logical row as scanned, before shape handling.
#[derive(Debug, Clone, Default)]
struct ScannedRow {
    fields: Vec<String>,
    start_line: u64,
    end_line: u64,
    raw_text: String,
    issues: Vec<FieldIssue>,
}

/// Reader over delimited text.
pub struct DelimitedReader<'a> {
    options: ReaderOptions,
    definitions: Vec<Column>,
    description: String,
    source: Option<BoxedSource<'a>>,
    opener: Option<Opener<'a>>,
    tokenizer: Option<Tokenizer<BoxedSource<'a>>>,
    notifier: Notifier<Box<dyn ReaderEvents + 'a>>,
    zone_adjust: Box<dyn TimeZoneAdjust + 'a>,
    cancel: Option<CancelFlag>,
    schema: BoundSchema,
    date_formats: Vec<Option<DateFormat>>,
    default_format: ValueFormat,
    header: Vec<String>,
    data_start: Option<Mark>,
    pending: VecDeque<ScannedRow>,
    current: Option<Vec<String>>,
    position: RecordPosition,
    records_returned: u64,
    empty_run: usize,
    realigner: Option<RowRealigner>,
    dropped_trailing: bool,
    end_of_input: bool,
    finish_reported: bool,
}

impl<'a> DelimitedReader<'a> {
    fn build(
        options: ReaderOptions,
        description: String,
        source: Option<BoxedSource<'a>>,
        opener: Option<Opener<'a>>,
    ) -> Result<Self> {
        options.validate()?;
        let events: Box<dyn ReaderEvents + 'a> = Box::new(());
        Ok(Self {
            notifier: Notifier::new(events, options.warnings.max_per_kind),
            options,
            definitions: Vec::new(),
            description,
            source,
            opener,
            tokenizer: None,
            zone_adjust: Box::new(FixedOffsetAdjust),
            cancel: None,
            schema: BoundSchema::default(),
            date_formats: Vec::new(),
            default_format: ValueFormat::default(),
            header: Vec::new(),
            data_start: None,
            pending: VecDeque::new(),
            current: None,
            position: RecordPosition::default(),
            records_returned: 0,
            empty_run: 0,
            realigner: None,
            dropped_trailing: false,
            end_of_input: false,
            finish_reported: false,
        })
    }

    /// Reader for a file; the file is opened on [`open`](Self::open) and
    /// reopened when needed.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] for invalid options.
    pub fn from_path(
        path: impl AsRef<Path>,
        encoding: &'static Encoding,
        options: ReaderOptions,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let description = path.display().to_string();
        let opener = move || -> Result<BoxedSource<'a>> {
            Ok(Box::new(open_file(&path, encoding)?))
        };
        Self::build(options, description, None, Some(Box::new(opener)))
    }

    /// Reader that takes ownership of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] for invalid options.
    pub fn from_source(source: impl CharSource + 'a, options: ReaderOptions) -> Result<Self> {
        Self::build(options, "<source>".to_string(), Some(Box::new(source)), None)
    }

    /// Reader over a caller-owned source, which is left open on close.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] for invalid options.
    pub fn from_borrowed(source: &'a mut dyn CharSource, options: ReaderOptions) -> Result<Self> {
        Self::build(options, "<stream>".to_string(), Some(Box::new(source)), None)
    }

    /// Reader that acquires a fresh source from `opener` on every open.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] for invalid options.
    pub fn with_opener(
        opener: impl FnMut() -> Result<BoxedSource<'a>> + 'a,
        options: ReaderOptions,
    ) -> Result<Self> {
        Self::build(options, "<opener>".to_string(), None, Some(Box::new(opener)))
    }

    /// Column definitions matched against the header.
    #[must_use]
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.definitions = columns;
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: impl ReaderEvents + 'a) -> Self {
        self.notifier.events = Box::new(events);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[must_use]
    pub fn with_time_zone_adjust(mut self, adjust: impl TimeZoneAdjust + 'a) -> Self {
        self.zone_adjust = Box::new(adjust);
        self
    }

    /// Name used for the source in log output.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    // === Lifecycle ===

    /// Opens the source, skips leading lines, reads the header, and binds
    /// the schema.
    ///
    /// On failure the observer is told the read finished and may ask for
    /// one retry.
    ///
    /// # Errors
    ///
    /// Returns open, decoding, or schema errors.
    pub fn open(&mut self) -> Result<()> {
        let mut retried = false;
        loop {
            match self.open_once() {
                Ok(()) => return Ok(()),
                Err(error) => {
                    tracing::error!(source = %self.description, error = %error, "open failed");
                    self.notifier.events.on_read_finished();
                    if retried || !self.notifier.events.on_open_error(&error) {
                        return Err(error);
                    }
                    retried = true;
                    tracing::info!(source = %self.description, "retrying open");
                }
            }
        }
    }

    fn open_once(&mut self) -> Result<()> {
        self.close();
        self.clear_schema();
        self.restart_pass();

        let source = self.acquire_source()?;
        let mut tokenizer = Tokenizer::new(source, &self.options)?;
        let mut skipped = 0;
        while skipped < self.options.skip_rows && tokenizer.skip_line() {
            skipped += 1;
        }
        if skipped > 0 {
            tracing::debug!(rows = skipped, "skipped leading lines");
        }
        self.tokenizer = Some(tokenizer);

        if let Err(error) = self.read_header() {
            self.close();
            return Err(error);
        }
        tracing::info!(
            source = %self.description,
            columns = self.schema.len(),
            has_header = self.options.has_header,
            "opened delimited source"
        );
        Ok(())
    }

    fn acquire_source(&mut self) -> Result<BoxedSource<'a>> {
        if let Some(source) = self.source.take() {
            return Ok(source);
        }
        match self.opener.as_mut() {
            Some(opener) => opener(),
            None => Err(IngestError::NotRewindable),
        }
    }

    /// Goes back to the first data row.
    ///
    /// Rewinds the source when it can seek, otherwise reopens it through
    /// the opener.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotOpen`] before `open`, and
    /// [`IngestError::NotRewindable`] when neither option is available.
    pub fn reset(&mut self) -> Result<()> {
        let mark = self.data_start;
        let tokenizer = self.tokenizer.as_mut().ok_or(IngestError::NotOpen)?;
        if let Some(mark) = mark
            && tokenizer.rewind(mark)
        {
            self.restart_pass();
            tracing::debug!(source = %self.description, "reset to first data row");
            return Ok(());
        }
        if self.opener.is_some() {
            return self.open();
        }
        Err(IngestError::NotRewindable)
    }

    /// Releases the source. An owned source without an opener is kept,
    /// rewound, for a later `open`; a borrowed source is never closed.
    pub fn close(&mut self) {
        if let Some(tokenizer) = self.tokenizer.take() {
            let mut source = tokenizer.into_source();
            if self.opener.is_none() && source.seek(0) {
                self.source = Some(source);
            }
        }
        self.current = None;
    }

    fn clear_schema(&mut self) {
        self.schema = BoundSchema::default();
        self.date_formats.clear();
        self.header.clear();
        self.data_start = None;
        self.dropped_trailing = false;
    }

    fn restart_pass(&mut self) {
        self.pending.clear();
        self.current = None;
        self.position = RecordPosition::default();
        self.records_returned = 0;
        self.empty_run = 0;
        self.end_of_input = false;
        self.finish_reported = false;
        self.notifier.reset();
        self.realigner = self
            .options
            .try_to_solve_more_columns
            .then(|| RowRealigner::new(self.schema.len(), self.options.delimiter));
    }

    // === Header and schema ===

    fn read_header(&mut self) -> Result<()> {
        let has_header = self.options.has_header;
        let mut first = None;
        let mut before_first = None;
        loop {
            let mark = self.tokenizer.as_ref().map(Tokenizer::mark);
            let Some(row) = self.next_raw_row() else { break };
            if self.is_empty_row(&row) {
                continue;
            }
            before_first = mark;
            first = Some(row);
            break;
        }

        let mut header_issues = Vec::new();
        let (names, header_lines) = match first {
            None => (Vec::new(), (1, 1)),
            Some(row) if has_header => {
                let lines = (row.start_line, row.end_line);
                let mut raw = row.fields;
                if raw.len() > 1
                    && raw.last().is_some_and(|name| name.trim().is_empty())
                    && self.trailing_column_unused(raw.len())
                {
                    raw.pop();
                    self.dropped_trailing = true;
                    header_issues.push((
                        WarningScope::Trailer,
                        FieldIssue {
                            column: None,
                            kind: WarningKind::EmptyTrailingColumns,
                            message: "The last column has no name and no data; it was removed"
                                .to_string(),
                        },
                    ));
                }
                let normalized = normalize_column_names(&raw, raw.len());
                header_issues.extend(normalized.issues.into_iter().map(|issue| {
                    let scope = issue.column.map_or(WarningScope::Row, WarningScope::Column);
                    (scope, issue)
                }));
                self.header = raw.iter().map(|name| name.trim().to_string()).collect();
                (normalized.names, lines)
            }
            Some(row) => {
                let lines = (row.start_line, row.end_line);
                let names = (0..row.fields.len()).map(default_column_name).collect();
                self.pending.push_back(row);
                (names, lines)
            }
        };

        self.schema = bind_schema(&names, &self.definitions, has_header)?;
        let schema_issues = std::mem::take(&mut self.schema.issues);
        header_issues.extend(schema_issues.into_iter().map(|issue| {
            let scope = issue.column.map_or(WarningScope::Row, WarningScope::Column);
            (scope, issue)
        }));
        for (scope, issue) in header_issues {
            self.warn(scope, issue.kind, issue.message, 0, header_lines.0, header_lines.1);
        }

        self.date_formats = self
            .schema
            .columns
            .iter()
            .map(|bound| {
                (bound.column.data_type() == DataType::DateTime)
                    .then(|| DateFormat::new(&bound.column.value_format))
            })
            .collect();
        self.data_start = if has_header {
            self.tokenizer.as_ref().map(Tokenizer::mark)
        } else {
            before_first.or_else(|| self.tokenizer.as_ref().map(Tokenizer::mark))
        };
        self.realigner = self
            .options
            .try_to_solve_more_columns
            .then(|| RowRealigner::new(self.schema.len(), self.options.delimiter));

        let columns = self.schema.column_list();
        self.notifier.events.on_schema_finalized(&columns);
        Ok(())
    }

    /// Peeks at the rows after the header to see whether column `count`
    /// ever holds data. Only possible on a rewindable source.
    fn trailing_column_unused(&mut self, count: usize) -> bool {
        let Some(tokenizer) = self.tokenizer.as_mut() else {
            return false;
        };
        if !tokenizer.is_rewindable() {
            return false;
        }
        let mark = tokenizer.mark();
        let mut used = false;
        for _ in 0..DISCOVERY_ROWS {
            let Some(row) = tokenizer.read_row() else { break };
            if row.get(count - 1).is_some_and(|value| !value.trim().is_empty()) {
                used = true;
                break;
            }
        }
        tokenizer.rewind(mark) && !used
    }

    // === Rows ===

    /// Advances to the next record.
    ///
    /// Returns false at end of input, after cancellation, or once the
    /// record limit is reached.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotOpen`] before `open`.
    pub fn read(&mut self) -> Result<bool> {
        if self.tokenizer.is_none() {
            return Err(IngestError::NotOpen);
        }
        self.current = None;
        self.notifier.current.clear();
        if self.end_of_input {
            return Ok(false);
        }
        if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            tracing::info!(
                source = %self.description,
                records = self.records_returned,
                "read cancelled"
            );
            self.finish();
            return Ok(false);
        }
        if let Some(limit) = self.options.record_limit
            && self.records_returned >= limit
        {
            tracing::debug!(limit, "record limit reached");
            self.finish();
            return Ok(false);
        }

        loop {
            let Some(mut row) = self.next_raw_row() else {
                self.finish();
                return Ok(false);
            };
            let record_number = self.position.record_number + 1;

            if self.is_empty_row(&row) {
                self.empty_run += 1;
                let limit = self.options.consecutive_empty_rows;
                if limit > 0 && self.empty_run >= limit {
                    tracing::debug!(
                        rows = self.empty_run,
                        line = row.start_line,
                        "consecutive empty rows; treating as end of input"
                    );
                    self.finish();
                    return Ok(false);
                }
                if self.options.skip_empty_lines {
                    continue;
                }
                row.fields = vec![String::new(); self.schema.len().max(1)];
                row.issues.clear();
                self.accept(row, record_number);
                return Ok(true);
            }
            self.empty_run = 0;

            if self.is_header_repeat(&row) {
                tracing::debug!(line = row.start_line, "skipping repeated header");
                continue;
            }

            let clean = self.schema_fields(&row.fields).len() == self.schema.len();
            let Some(row) = self.shape_row(row, record_number) else {
                self.finish();
                return Ok(false);
            };
            if clean && let Some(realigner) = self.realigner.as_mut() {
                realigner.observe(&row.fields);
            }
            self.accept(row, record_number);
            return Ok(true);
        }
    }

    fn accept(&mut self, mut row: ScannedRow, record_number: u64) {
        for issue in std::mem::take(&mut row.issues) {
            self.emit_issue(issue, record_number, row.start_line, row.end_line);
        }
        self.position = RecordPosition {
            start_line: row.start_line,
            end_line: row.end_line,
            record_number,
        };
        self.current = Some(row.fields);
        self.records_returned += 1;
    }

    fn finish(&mut self) {
        self.end_of_input = true;
        if let Some(tokenizer) = self.tokenizer.as_mut() {
            tokenizer.force_end_of_input();
        }
        if !self.finish_reported {
            self.finish_reported = true;
            tracing::info!(
                source = %self.description,
                records = self.records_returned,
                "read finished"
            );
            self.notifier.events.on_read_finished();
        }
    }

    fn next_raw_row(&mut self) -> Option<ScannedRow> {
        if let Some(row) = self.pending.pop_front() {
            return Some(row);
        }
        let tokenizer = self.tokenizer.as_mut()?;
        let fields = tokenizer.read_row();
        if let Some(error) = tokenizer.take_error() {
            tokenizer.force_end_of_input();
            let line = tokenizer.line();
            let record_number = self.position.record_number;
            self.warn(
                WarningScope::Row,
                WarningKind::Scan,
                format!("Reading stopped after an error: {error}"),
                record_number,
                line,
                line,
            );
            return None;
        }
        let fields = fields?;
        Some(ScannedRow {
            fields,
            start_line: tokenizer.start_line(),
            end_line: tokenizer.end_line(),
            raw_text: tokenizer.record_text().to_string(),
            issues: tokenizer.take_issues(),
        })
    }

    /// A row whose text is only delimiters and whitespace.
    fn is_empty_row(&self, row: &ScannedRow) -> bool {
        let delimiter = self.options.delimiter;
        row.fields.iter().all(String::is_empty)
            && row
                .raw_text
                .chars()
                .all(|ch| ch == delimiter || ch.is_whitespace())
    }

    /// `fields` without the blank value under a dropped trailing header
    /// column.
    fn schema_fields<'f>(&self, fields: &'f [String]) -> &'f [String] {
        match fields.split_last() {
            Some((last, rest))
                if self.dropped_trailing
                    && rest.len() == self.schema.len()
                    && last.trim().is_empty() =>
            {
                rest
            }
            _ => fields,
        }
    }

    fn is_header_repeat(&self, row: &ScannedRow) -> bool {
        let fields = self.schema_fields(&row.fields);
        self.options.has_header
            && self.options.skip_duplicate_header
            && !self.header.is_empty()
            && fields.len() == self.header.len()
            && fields
                .iter()
                .zip(&self.header)
                .all(|(value, name)| value.trim().to_lowercase() == name.to_lowercase())
    }

    fn at_last_row(&mut self) -> bool {
        self.pending.is_empty() && self.tokenizer.as_mut().is_none_or(Tokenizer::at_end)
    }

    /// Brings a row to the schema width. `None` means the row was an
    /// end-of-file marker.
    fn shape_row(&mut self, mut row: ScannedRow, record_number: u64) -> Option<ScannedRow> {
        let expected = self.schema.len();
        if expected == 0 {
            return Some(row);
        }

        if row.fields.len() < expected {
            if row.fields.len() == 1
                && row.fields[0].chars().count() <= self.options.eof_marker_max_len
                && self.at_last_row()
            {
                tracing::debug!(
                    text = %row.fields[0],
                    line = row.start_line,
                    "dropping end-of-file marker"
                );
                return None;
            }
            if self.options.allow_row_combining {
                row = self.combine_rows(row, expected, record_number);
            } else {
                self.warn(
                    WarningScope::Row,
                    WarningKind::RowShape,
                    format!(
                        "Line has fewer columns than expected ({} of {expected})",
                        row.fields.len()
                    ),
                    record_number,
                    row.start_line,
                    row.end_line,
                );
            }
            if row.fields.len() < expected {
                row.fields.resize(expected, String::new());
            }
        }

        if row.fields.len() > expected {
            self.shorten_row(&mut row, expected, record_number);
        }
        Some(row)
    }

    /// Joins following lines onto a short row while the result stays
    /// within [`COMBINE_SLACK`] of the expected width.
    fn combine_rows(
        &mut self,
        mut row: ScannedRow,
        expected: usize,
        record_number: u64,
    ) -> ScannedRow {
        let original = row.fields.len();
        while row.fields.len() < expected {
            let Some(next) = self.next_raw_row() else { break };
            if row.fields.len() + next.fields.len() - 1 > expected + COMBINE_SLACK {
                self.pending.push_front(next);
                break;
            }
            let offset = row.fields.len() - 1;
            let mut rest = next.fields.into_iter();
            if let (Some(last), Some(first)) = (row.fields.last_mut(), rest.next()) {
                last.push('\n');
                last.push_str(&first);
            }
            row.fields.extend(rest);
            row.issues.extend(next.issues.into_iter().map(|mut issue| {
                issue.column = issue.column.map(|column| column + offset);
                issue
            }));
            row.end_line = next.end_line;
            row.raw_text.push_str(&next.raw_text);
        }

        let message = if row.fields.len() >= expected {
            format!(
                "Line had fewer columns than expected ({original} of {expected}) and was joined with the following line; check the result"
            )
        } else {
            format!(
                "Line has fewer columns than expected ({original} of {expected}) and could not be joined with the following line"
            )
        };
        self.warn(
            WarningScope::Row,
            WarningKind::RowShape,
            message,
            record_number,
            row.start_line,
            row.end_line,
        );
        row
    }

    fn shorten_row(&mut self, row: &mut ScannedRow, expected: usize, record_number: u64) {
        let actual = row.fields.len();
        let extra_blank = row.fields[expected..]
            .iter()
            .all(|value| value.trim().is_empty());
        let (start_line, end_line) = (row.start_line, row.end_line);

        if self.dropped_trailing && actual == expected + 1 && extra_blank {
            row.fields.truncate(expected);
            return;
        }

        if let Some(realigner) = &self.realigner {
            let result = realigner.realign(std::mem::take(&mut row.fields), &row.raw_text);
            tracing::debug!(
                line = start_line,
                resolved = result.resolved,
                rows_seen = realigner.rows_seen(),
                "realigned over-wide row"
            );
            self.warn(
                WarningScope::Row,
                WarningKind::Realign,
                format!(
                    "Line has more columns than expected ({actual} of {expected}); trying to realign"
                ),
                record_number,
                start_line,
                end_line,
            );
            row.fields = result.row;
            for issue in result.issues {
                self.emit_issue(issue, record_number, start_line, end_line);
            }
            row.fields.truncate(expected);
            return;
        }

        if extra_blank {
            if self.options.warnings.empty_trailing_columns {
                self.warn(
                    WarningScope::Row,
                    WarningKind::EmptyTrailingColumns,
                    format!(
                        "Line has more columns than expected ({actual} of {expected}); all additional columns were empty"
                    ),
                    record_number,
                    start_line,
                    end_line,
                );
            }
        } else {
            let dropped = row.fields[expected..].join(&self.options.delimiter.to_string());
            self.warn(
                WarningScope::Row,
                WarningKind::RowShape,
                format!(
                    "Line has more columns than expected ({actual} of {expected}); extra data '{dropped}' is ignored"
                ),
                record_number,
                start_line,
                end_line,
            );
        }
        row.fields.truncate(expected);
    }

    // === Warnings ===

    fn warn(
        &mut self,
        scope: WarningScope,
        kind: WarningKind,
        message: String,
        record_number: u64,
        start_line: u64,
        end_line: u64,
    ) {
        let column_name = match scope {
            WarningScope::Column(ordinal) => self
                .schema
                .get(ordinal)
                .map(|bound| bound.column.name.clone()),
            WarningScope::Row | WarningScope::Trailer => None,
        };
        self.notifier.warn(Warning {
            record_number,
            scope,
            kind,
            message,
            start_line,
            end_line,
            column_name,
        });
    }

    fn emit_issue(
        &mut self,
        issue: FieldIssue,
        record_number: u64,
        start_line: u64,
        end_line: u64,
    ) {
        let scope = issue.column.map_or(WarningScope::Row, WarningScope::Column);
        self.warn(scope, issue.kind, issue.message, record_number, start_line, end_line);
    }

    // === Accessors ===

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.tokenizer.is_some()
    }

    /// True once input is exhausted, cancelled, or limited.
    pub fn end_of_input(&self) -> bool {
        self.end_of_input
    }

    pub fn schema(&self) -> &BoundSchema {
        &self.schema
    }

    /// Resolved columns in ordinal order.
    pub fn columns(&self) -> Vec<Column> {
        self.schema.column_list()
    }

    pub fn schema_description(&self) -> SchemaDescription {
        self.schema.description()
    }

    /// Header text as read, trimmed, before name normalization.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Raw fields of the current record.
    pub fn fields(&self) -> Option<&[String]> {
        self.current.as_deref()
    }

    /// Lines and number of the current record.
    pub fn record_position(&self) -> RecordPosition {
        self.position
    }

    pub fn record_number(&self) -> u64 {
        self.position.record_number
    }

    /// Fraction of the source consumed, when the size is known.
    pub fn progress(&self) -> Option<f64> {
        if self.end_of_input {
            return Some(1.0);
        }
        self.tokenizer.as_ref().and_then(Tokenizer::progress)
    }

    /// Warnings raised for the current record, by ordinal.
    pub fn current_errors(&self) -> &ColumnErrors {
        &self.notifier.current
    }
}

impl TypedAccess for DelimitedReader<'_> {
    fn field_count(&self) -> usize {
        self.schema.len()
    }

    fn bound_column(&self, ordinal: usize) -> Result<&BoundColumn> {
        self.schema
            .get(ordinal)
            .ok_or(IngestError::ColumnOutOfRange {
                ordinal,
                field_count: self.schema.len(),
            })
    }

    fn raw_text(&self, ordinal: usize) -> Result<&str> {
        let fields = self.current.as_ref().ok_or(IngestError::NoCurrentRecord)?;
        fields
            .get(ordinal)
            .map(String::as_str)
            .ok_or(IngestError::ColumnOutOfRange {
                ordinal,
                field_count: fields.len(),
            })
    }

    fn value_format(&self, ordinal: usize) -> &ValueFormat {
        self.schema
            .get(ordinal)
            .map_or(&self.default_format, |bound| &bound.column.value_format)
    }

    fn date_format(&self, ordinal: usize) -> Option<&DateFormat> {
        self.date_formats.get(ordinal)?.as_ref()
    }

    fn convert_time_zone(
        &self,
        value: NaiveDateTime,
        source_zone: &str,
    ) -> std::result::Result<NaiveDateTime, ConversionError> {
        self.zone_adjust
            .adjust(value, source_zone, &self.options.destination_time_zone)
    }

    fn report(&mut self, ordinal: usize, kind: WarningKind, message: String) {
        let position = self.position;
        self.warn(
            WarningScope::Column(ordinal),
            kind,
            message,
            position.record_number,
            position.start_line,
            position.end_line,
        );
    }
}
