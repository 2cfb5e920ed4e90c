//! Schema and value types shared by every delimit reader.
//!
//! This crate holds the immutable description of a reader's output
//! (columns and their value formats), the typed values produced by the
//! typed-getter contract, and the warning records raised while reading.

pub mod column;
pub mod data_type;
pub mod error;
pub mod position;
pub mod value;
pub mod value_format;
pub mod warning;

pub use column::{Column, SchemaColumn, SchemaDescription, TimeZoneSource};
pub use data_type::DataType;
pub use error::{ModelError, Result};
pub use position::RecordPosition;
pub use value::Value;
pub use value_format::ValueFormat;
pub use warning::{Warning, WarningKind, WarningScope};
