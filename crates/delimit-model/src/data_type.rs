//! Target data types for column values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Type a column's raw text is converted to on typed access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    /// Text passed through unchanged.
    #[default]
    String,
    /// Whole number (64-bit signed).
    Integer,
    /// Decimal number honoring decimal and group separators.
    Numeric,
    /// Floating point number.
    Double,
    /// Boolean matched against true/false tokens.
    Boolean,
    /// Date and time, optionally combined with a separate time column.
    DateTime,
    /// Binary content encoded as hex text.
    Binary,
    /// Globally unique identifier.
    Guid,
}

impl DataType {
    /// Returns the canonical name used in schema descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "String",
            DataType::Integer => "Integer",
            DataType::Numeric => "Numeric",
            DataType::Double => "Double",
            DataType::Boolean => "Boolean",
            DataType::DateTime => "DateTime",
            DataType::Binary => "Binary",
            DataType::Guid => "Guid",
        }
    }

    /// Human-readable noun, as shown in schema listings.
    pub fn describe(&self) -> &'static str {
        match self {
            DataType::String => "text",
            DataType::Integer => "integer",
            DataType::Numeric => "decimal",
            DataType::Double => "double",
            DataType::Boolean => "boolean",
            DataType::DateTime => "date",
            DataType::Binary => "binary",
            DataType::Guid => "guid",
        }
    }

    /// The noun with its indefinite article ("an integer", "a date").
    pub fn with_article(&self) -> &'static str {
        match self {
            DataType::String => "text",
            DataType::Integer => "an integer",
            DataType::Numeric => "a decimal",
            DataType::Double => "a double",
            DataType::Boolean => "a boolean",
            DataType::DateTime => "a date",
            DataType::Binary => "binary data",
            DataType::Guid => "a guid",
        }
    }

    /// Returns true for types whose text is parsed as a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Numeric | DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    /// Parse a type name (case-insensitive), accepting common aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "string" | "text" => Ok(DataType::String),
            "integer" | "int" | "long" => Ok(DataType::Integer),
            "numeric" | "decimal" | "money" => Ok(DataType::Numeric),
            "double" | "float" => Ok(DataType::Double),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "datetime" | "date" => Ok(DataType::DateTime),
            "binary" => Ok(DataType::Binary),
            "guid" | "uuid" => Ok(DataType::Guid),
            _ => Err(ModelError::UnknownDataType {
                name: s.to_string(),
            }),
        }
    }
}
