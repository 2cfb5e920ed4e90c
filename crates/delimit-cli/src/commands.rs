use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use delimit_ingest::{
    DataTable, DelimitedReader, ReaderOptions, TrimmingOption, WarningCollector,
    encoding_for_label,
};
use delimit_model::{Column, SchemaDescription, Warning};

use crate::cli::{ReaderArgs, RowsArgs, SchemaArgs, TrimArg};

/// Records and warnings of one `rows` run.
#[derive(Debug)]
pub struct RowsResult {
    pub table: DataTable,
    pub warnings: Vec<Warning>,
}

/// Schema and header warnings of one `schema` run.
#[derive(Debug)]
pub struct SchemaResult {
    pub description: SchemaDescription,
    pub warnings: Vec<Warning>,
}

pub fn run_rows(args: &RowsArgs) -> Result<RowsResult> {
    let source = &args.reader.file;
    let span = info_span!("rows", file = %source.display());
    let _guard = span.enter();

    let options = reader_options(&args.reader)?.with_record_limit(args.limit);
    let columns = load_columns(args.reader.columns.as_deref())?;
    let encoding = encoding_for_label(&args.reader.encoding)
        .with_context(|| format!("resolve encoding '{}'", args.reader.encoding))?;

    let mut collector = WarningCollector::new();
    let table = {
        let mut reader = DelimitedReader::from_path(source, encoding, options)
            .context("configure reader")?
            .with_columns(columns)
            .with_events(&mut collector);
        reader
            .read_all()
            .with_context(|| format!("read {}", source.display()))?
    };
    info!(
        records = table.len(),
        warnings = collector.warnings.len(),
        "rows read"
    );
    Ok(RowsResult {
        table,
        warnings: collector.warnings,
    })
}

pub fn run_schema(args: &SchemaArgs) -> Result<SchemaResult> {
    let source = &args.reader.file;
    let span = info_span!("schema", file = %source.display());
    let _guard = span.enter();

    let options = reader_options(&args.reader)?;
    let columns = load_columns(args.reader.columns.as_deref())?;
    let encoding = encoding_for_label(&args.reader.encoding)
        .with_context(|| format!("resolve encoding '{}'", args.reader.encoding))?;

    let mut collector = WarningCollector::new();
    let description = {
        let mut reader = DelimitedReader::from_path(source, encoding, options)
            .context("configure reader")?
            .with_columns(columns)
            .with_events(&mut collector);
        reader
            .open()
            .with_context(|| format!("open {}", source.display()))?;
        let description = reader.schema_description();
        reader.close();
        description
    };
    Ok(SchemaResult {
        description,
        warnings: collector.warnings,
    })
}

/// Reader options from the optional config file with flag overrides applied.
pub fn reader_options(args: &ReaderArgs) -> Result<ReaderOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str::<ReaderOptions>(&text)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => ReaderOptions::default(),
    };
    if let Some(delimiter) = args.delimiter {
        options.delimiter = delimiter;
    }
    if args.no_qualifier {
        options.qualifier = None;
    } else if let Some(qualifier) = args.qualifier {
        options.qualifier = Some(qualifier);
    }
    if let Some(escape) = args.escape {
        options.escape_prefix = Some(escape);
    }
    if let Some(prefix) = &args.comment {
        options.comment_prefix.clone_from(prefix);
    }
    if args.no_header {
        options.has_header = false;
    }
    if let Some(trim) = args.trim {
        options.trimming = match trim {
            TrimArg::None => TrimmingOption::None,
            TrimArg::Unquoted => TrimmingOption::Unquoted,
            TrimArg::All => TrimmingOption::All,
        };
    }
    if args.combine_rows {
        options.allow_row_combining = true;
    }
    if args.realign {
        options.try_to_solve_more_columns = true;
    }
    if let Some(rows) = args.skip_rows {
        options.skip_rows = rows;
    }
    if let Some(text) = &args.treat_as_null {
        options.treat_text_as_null.clone_from(text);
    }
    options.validate().context("invalid reader options")?;
    Ok(options)
}

/// Column definitions from a JSON array, or none.
pub fn load_columns(path: Option<&Path>) -> Result<Vec<Column>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("read columns {}", path.display()))?;
    let columns: Vec<Column> = serde_json::from_str(&text)
        .with_context(|| format!("parse columns {}", path.display()))?;
    for column in &columns {
        column
            .value_format
            .validate()
            .with_context(|| format!("column '{}'", column.name))?;
    }
    Ok(columns)
}
