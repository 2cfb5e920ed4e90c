//! Per-column format parameters.

use serde::{Deserialize, Serialize};

use crate::data_type::DataType;
use crate::error::{ModelError, Result};

/// Default date pattern, .NET style (`/` stands for the date separator).
pub const DEFAULT_DATE_FORMAT: &str = "MM/dd/yyyy";
/// Default pattern for a separate time-part column.
pub const DEFAULT_TIME_PART_FORMAT: &str = "HH:mm:ss";
/// Separator between alternative true/false tokens.
pub const TOKEN_SEPARATOR: char = '|';

/// Type tag plus the parameters needed to convert raw text to that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueFormat {
    /// Target type.
    pub data_type: DataType,
    /// Date pattern(s); several patterns may be separated by `;`.
    pub date_format: String,
    /// Replaces `/` in the date pattern.
    pub date_separator: String,
    /// Replaces `:` in the date and time patterns.
    pub time_separator: String,
    /// Pattern used to parse an associated time-part column.
    pub time_part_format: String,
    /// Decimal separator for numeric parsing.
    pub decimal_separator: Option<char>,
    /// Thousands separator for numeric parsing.
    pub group_separator: Option<char>,
    /// Literal(s) meaning true, separated by `|`.
    pub true_values: String,
    /// Literal(s) meaning false, separated by `|`.
    pub false_values: String,
    /// Text shown for a value that is null.
    pub display_null: String,
}

impl Default for ValueFormat {
    fn default() -> Self {
        Self {
            data_type: DataType::String,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_separator: "/".to_string(),
            time_separator: ":".to_string(),
            time_part_format: DEFAULT_TIME_PART_FORMAT.to_string(),
            decimal_separator: Some('.'),
            group_separator: None,
            true_values: "True".to_string(),
            false_values: "False".to_string(),
            display_null: String::new(),
        }
    }
}

impl ValueFormat {
    /// Default parameters for the given type.
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    #[must_use]
    pub fn with_date_separator(mut self, separator: impl Into<String>) -> Self {
        self.date_separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_time_separator(mut self, separator: impl Into<String>) -> Self {
        self.time_separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_time_part_format(mut self, format: impl Into<String>) -> Self {
        self.time_part_format = format.into();
        self
    }

    #[must_use]
    pub fn with_decimal_separator(mut self, separator: Option<char>) -> Self {
        self.decimal_separator = separator;
        self
    }

    #[must_use]
    pub fn with_group_separator(mut self, separator: Option<char>) -> Self {
        self.group_separator = separator;
        self
    }

    #[must_use]
    pub fn with_true_values(mut self, values: impl Into<String>) -> Self {
        self.true_values = values.into();
        self
    }

    #[must_use]
    pub fn with_false_values(mut self, values: impl Into<String>) -> Self {
        self.false_values = values.into();
        self
    }

    #[must_use]
    pub fn with_display_null(mut self, text: impl Into<String>) -> Self {
        self.display_null = text.into();
        self
    }

    /// Iterates the non-empty true literals.
    pub fn true_tokens(&self) -> impl Iterator<Item = &str> {
        split_tokens(&self.true_values)
    }

    /// Iterates the non-empty false literals.
    pub fn false_tokens(&self) -> impl Iterator<Item = &str> {
        split_tokens(&self.false_values)
    }

    /// Iterates the date patterns.
    pub fn date_patterns(&self) -> impl Iterator<Item = &str> {
        self.date_format
            .split(';')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
    }

    /// Checks the format invariants.
    ///
    /// # Errors
    ///
    /// Returns an error when the decimal and group separators collide, or a
    /// date-time format has no usable date pattern.
    pub fn validate(&self) -> Result<()> {
        if let (Some(decimal), Some(group)) = (self.decimal_separator, self.group_separator)
            && decimal == group
        {
            return Err(ModelError::SeparatorConflict { separator: decimal });
        }
        if self.data_type == DataType::DateTime
            && !self.date_format.chars().any(|ch| "yMdHhms".contains(ch))
        {
            return Err(ModelError::EmptyDateFormat {
                format: self.date_format.clone(),
            });
        }
        Ok(())
    }
}

fn split_tokens(values: &str) -> impl Iterator<Item = &str> {
    values
        .split(TOKEN_SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
