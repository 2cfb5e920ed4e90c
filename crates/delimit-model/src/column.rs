//! Column definitions and schema descriptions.

use serde::{Deserialize, Serialize};

use crate::data_type::DataType;
use crate::value_format::ValueFormat;

/// Where a date-time column takes its source time zone from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeZoneSource {
    /// Zone text is read per row from the named column.
    Column(String),
    /// The same zone applies to every row.
    Constant(String),
}

/// Description of one output field.
///
/// Caller-supplied columns act as type hints and are matched to discovered
/// header names case-insensitively; the ordinal is assigned when the schema
/// is bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Column {
    pub name: String,
    pub ordinal: usize,
    pub value_format: ValueFormat,
    /// Column is read but excluded from results.
    pub ignore: bool,
    /// Attempt typed conversion; otherwise values pass through as text.
    pub convert: bool,
    /// Name of a column holding the time belonging to this date column.
    pub time_part: Option<String>,
    pub time_zone: Option<TimeZoneSource>,
}

impl Default for Column {
    fn default() -> Self {
        Self::new("")
    }
}

impl Column {
    /// A string column with default format.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal: 0,
            value_format: ValueFormat::default(),
            ignore: false,
            convert: true,
            time_part: None,
            time_zone: None,
        }
    }

    /// A column of the given type with default format parameters.
    pub fn typed(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name).with_format(ValueFormat::new(data_type))
    }

    #[must_use]
    pub fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.value_format = format;
        self
    }

    #[must_use]
    pub fn with_ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    #[must_use]
    pub fn with_convert(mut self, convert: bool) -> Self {
        self.convert = convert;
        self
    }

    #[must_use]
    pub fn with_time_part(mut self, column: impl Into<String>) -> Self {
        self.time_part = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_time_zone(mut self, source: TimeZoneSource) -> Self {
        self.time_zone = Some(source);
        self
    }

    pub fn data_type(&self) -> DataType {
        self.value_format.data_type
    }

    /// Type reported to consumers: text when conversion is disabled.
    pub fn effective_type(&self) -> DataType {
        if self.convert {
            self.value_format.data_type
        } else {
            DataType::String
        }
    }

    /// Case-insensitive name comparison.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.name.eq_ignore_ascii_case(name) || self.name.to_lowercase() == name.to_lowercase()
    }
}

/// One entry of a schema description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    pub ordinal: usize,
    pub data_type: DataType,
    pub hidden: bool,
}

/// Schema of a reader without reading rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub columns: Vec<SchemaColumn>,
}

impl SchemaDescription {
    /// Builds the description from bound columns.
    pub fn from_columns(columns: &[Column]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|column| SchemaColumn {
                    name: column.name.clone(),
                    ordinal: column.ordinal,
                    data_type: column.effective_type(),
                    hidden: column.ignore,
                })
                .collect(),
        }
    }

    /// Columns that are not hidden.
    pub fn visible(&self) -> impl Iterator<Item = &SchemaColumn> {
        self.columns.iter().filter(|column| !column.hidden)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
