//! Delimited-text ingestion.
//!
//! This crate reads delimited text (CSV, TSV, and relatives) from a
//! character source into typed values, reporting recoverable problems as
//! warnings instead of failing the read.
//!
//! # Features
//!
//! - **Row tokenizer**: qualifiers, escape prefixes, comments, placeholders,
//!   trimming, and multi-line fields with accurate line numbers
//! - **Row shape handling**: short rows are padded or combined, long rows are
//!   truncated or realigned from column statistics
//! - **Typed access**: nullable and strict getters per column ordinal
//! - **Warnings**: per-kind throttling, delivered through [`ReaderEvents`]
//!
//! # Example
//!
//! ```ignore
//! use delimit_ingest::{DelimitedReader, ReaderOptions, TypedAccess, WarningCollector};
//! use delimit_model::{Column, DataType};
//!
//! let mut warnings = WarningCollector::new();
//! let mut reader = DelimitedReader::from_path("orders.csv", encoding_rs::UTF_8, ReaderOptions::default())?
//!     .with_columns(vec![Column::typed("Qty", DataType::Integer)])
//!     .with_events(&mut warnings);
//! reader.open()?;
//! while reader.read()? {
//!     let qty = reader.get_int64(0)?;
//! }
//! ```

mod access;
mod convert;
mod error;
mod events;
mod field;
mod names;
mod options;
mod reader;
mod realign;
mod schema;
mod source;
mod table;
mod throttle;
mod timezone;
mod tokenizer;

// === Error Types ===
pub use error::{IngestError, Result};

// === Configuration ===
pub use options::{ReaderOptions, TrimmingOption, WarningOptions};

// === Character Sources ===
pub use source::{
    CharSource, DecodingSource, SeekableSource, TextSource, encoding_for_label, open_file,
};

// === Tokenizer ===
pub use field::{FieldIssue, has_dense_unknown_characters};
pub use tokenizer::{Mark, Tokenizer, split_rows};

// === Schema ===
pub use names::{ColumnNames, MAX_COLUMN_NAME_LEN, default_column_name, normalize_column_names};
pub use schema::{BoundColumn, BoundSchema, ZoneBinding, bind_schema};

// === Conversion ===
pub use convert::{
    ConversionError, DateFormat, DatePattern, DateTimeParse, MAX_YEAR, MIN_YEAR, base_date,
    convert_text, is_blank, narrow_i32, parse_binary, parse_boolean, parse_decimal, parse_guid,
    parse_integer,
};
pub use timezone::{FixedOffsetAdjust, TimeZoneAdjust, parse_fixed_offset};

// === Row Reconciliation ===
pub use realign::{CellKind, MIN_PROFILE_ROWS, Realignment, RowRealigner};

// === Reading ===
pub use access::TypedAccess;
pub use events::{CancelFlag, ColumnErrors, ReaderEvents, WarningCollector};
pub use reader::{BoxedSource, COMBINE_SLACK, DISCOVERY_ROWS, DelimitedReader};
pub use table::{DataTable, RecordCursor, collect_table};
pub use throttle::{Admission, WarningThrottle};
