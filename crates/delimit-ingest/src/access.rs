//! Typed value access over the current record.
//!
//! Implementors provide raw text, column metadata, and a warning sink; the
//! getters are shared. Each type has a nullable getter that reports a
//! conversion warning and returns `None`, and a strict getter that turns the
//! same failure into [`IngestError::Format`].

use chrono::NaiveDateTime;
use uuid::Uuid;

use delimit_model::{DataType, Value, ValueFormat, WarningKind};

use crate::convert::{
    ConversionError, DateFormat, is_blank, narrow_i32, parse_binary, parse_boolean,
    parse_decimal, parse_guid, parse_integer,
};
use crate::error::{IngestError, Result};
use crate::schema::{BoundColumn, ZoneBinding};

/// Per-ordinal typed access to a record.
pub trait TypedAccess {
    /// Number of columns in the schema.
    fn field_count(&self) -> usize;

    /// Column bound at `ordinal`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::ColumnOutOfRange`] for an unknown ordinal.
    fn bound_column(&self, ordinal: usize) -> Result<&BoundColumn>;

    /// Raw text of the current record at `ordinal`.
    ///
    /// # Errors
    ///
    /// Fails without a current record or for an unknown ordinal.
    fn raw_text(&self, ordinal: usize) -> Result<&str>;

    /// Format parameters used for `ordinal`.
    fn value_format(&self, ordinal: usize) -> &ValueFormat;

    /// Compiled date patterns for `ordinal`, if cached.
    fn date_format(&self, _ordinal: usize) -> Option<&DateFormat> {
        None
    }

    /// Converts a value read in `source_zone` to the destination zone.
    ///
    /// # Errors
    ///
    /// Fails for zones the adjuster cannot resolve.
    fn convert_time_zone(
        &self,
        value: NaiveDateTime,
        source_zone: &str,
    ) -> std::result::Result<NaiveDateTime, ConversionError>;

    /// Reports a problem with the value at `ordinal`.
    fn report(&mut self, ordinal: usize, kind: WarningKind, message: String);

    fn get_string(&self, ordinal: usize) -> Result<String> {
        self.raw_text(ordinal).map(str::to_string)
    }

    /// True when the value at `ordinal` is no value.
    ///
    /// Date-time columns with a separate time part are null only when both
    /// parts are blank. Ignored columns are always null.
    ///
    /// # Errors
    ///
    /// Fails without a current record or for an unknown ordinal.
    fn is_null(&self, ordinal: usize) -> Result<bool> {
        let bound = self.bound_column(ordinal)?;
        if bound.column.ignore {
            return Ok(true);
        }
        if !is_blank(self.raw_text(ordinal)?) {
            return Ok(false);
        }
        if bound.column.effective_type() == DataType::DateTime
            && let Some(time_part) = bound.time_part
        {
            return Ok(is_blank(self.raw_text(time_part)?));
        }
        Ok(true)
    }

    // === Nullable getters ===

    fn get_boolean_null(&mut self, text: &str, ordinal: usize) -> Option<bool> {
        let parsed = parse_boolean(text, self.value_format(ordinal));
        self.checked(parsed, text, ordinal, DataType::Boolean)
    }

    fn get_int64_null(&mut self, text: &str, ordinal: usize) -> Option<i64> {
        let parsed = parse_integer(text, self.value_format(ordinal));
        self.checked(parsed, text, ordinal, DataType::Integer)
    }

    fn get_int32_null(&mut self, text: &str, ordinal: usize) -> Option<i32> {
        let wide = self.get_int64_null(text, ordinal)?;
        let narrow = narrow_i32(wide);
        if narrow.is_none() {
            let error = ConversionError::OutOfRange {
                text: text.trim().to_string(),
                target: "Int32",
            };
            self.report(ordinal, WarningKind::Conversion, error.to_string());
        }
        narrow
    }

    fn get_decimal_null(&mut self, text: &str, ordinal: usize) -> Option<f64> {
        let parsed = parse_decimal(text, self.value_format(ordinal));
        self.checked(parsed, text, ordinal, DataType::Numeric)
    }

    fn get_double_null(&mut self, text: &str, ordinal: usize) -> Option<f64> {
        let parsed = parse_decimal(text, self.value_format(ordinal));
        self.checked(parsed, text, ordinal, DataType::Double)
    }

    fn get_guid_null(&mut self, text: &str, ordinal: usize) -> Option<Uuid> {
        let parsed = parse_guid(text);
        self.checked(parsed, text, ordinal, DataType::Guid)
    }

    fn get_binary_null(&mut self, text: &str, ordinal: usize) -> Option<Vec<u8>> {
        let parsed = parse_binary(text);
        self.checked(parsed, text, ordinal, DataType::Binary)
    }

    /// Converts date text, adding the column's time part and applying its
    /// time zone.
    fn get_date_time_null(&mut self, text: &str, ordinal: usize) -> Option<NaiveDateTime> {
        match self.parse_date_time_at(text, ordinal) {
            Ok(value) => value,
            Err(error) => {
                self.report(ordinal, WarningKind::Conversion, error.to_string());
                None
            }
        }
    }

    /// Date conversion shared by the nullable and strict getters.
    ///
    /// `Ok(None)` means both the date and its time part are blank. Truncation
    /// and time-zone problems are reported here and do not fail.
    fn parse_date_time_at(
        &mut self,
        text: &str,
        ordinal: usize,
    ) -> std::result::Result<Option<NaiveDateTime>, ConversionError> {
        let (time_text, zone) = match self.bound_column(ordinal) {
            Ok(bound) => {
                let time_part = bound.time_part;
                let zone_binding = bound.time_zone.clone();
                let time_text = time_part
                    .and_then(|part| self.raw_text(part).ok())
                    .map(str::to_string);
                let zone = match zone_binding {
                    Some(ZoneBinding::Column(column)) => {
                        self.raw_text(column).ok().map(|text| text.trim().to_string())
                    }
                    Some(ZoneBinding::Constant(zone)) => Some(zone),
                    None => None,
                };
                (time_text, zone)
            }
            Err(_) => (None, None),
        };
        if is_blank(text) && time_text.as_deref().is_none_or(is_blank) {
            return Ok(None);
        }

        let parsed = match self.date_format(ordinal) {
            Some(format) => format.parse_date_time(text, time_text.as_deref()),
            None => DateFormat::new(self.value_format(ordinal))
                .parse_date_time(text, time_text.as_deref()),
        }?;
        if parsed.truncated_to.is_some() {
            self.report(
                ordinal,
                WarningKind::Conversion,
                format!("'{}' was truncated to match the format", text.trim()),
            );
        }

        let value = match zone.filter(|zone| !zone.is_empty()) {
            Some(zone) => match self.convert_time_zone(parsed.value, &zone) {
                Ok(value) => value,
                Err(error) => {
                    self.report(ordinal, WarningKind::Conversion, error.to_string());
                    parsed.value
                }
            },
            None => parsed.value,
        };
        Ok(Some(value))
    }

    // === Strict getters ===

    fn get_boolean(&mut self, ordinal: usize) -> Result<bool> {
        let text = self.raw_text(ordinal)?.to_string();
        let value = self.get_boolean_null(&text, ordinal);
        self.required(value, &text, ordinal, DataType::Boolean)
    }

    fn get_int64(&mut self, ordinal: usize) -> Result<i64> {
        let text = self.raw_text(ordinal)?.to_string();
        let value = self.get_int64_null(&text, ordinal);
        self.required(value, &text, ordinal, DataType::Integer)
    }

    fn get_int32(&mut self, ordinal: usize) -> Result<i32> {
        let text = self.raw_text(ordinal)?.to_string();
        if let Some(value) = self.get_int32_null(&text, ordinal) {
            return Ok(value);
        }
        let message = match parse_integer(&text, self.value_format(ordinal)) {
            Some(_) => ConversionError::OutOfRange {
                text: text.trim().to_string(),
                target: "Int32",
            },
            None => ConversionError::not_a(text.trim(), DataType::Integer),
        };
        Err(self.format_error(ordinal, message.to_string()))
    }

    fn get_decimal(&mut self, ordinal: usize) -> Result<f64> {
        let text = self.raw_text(ordinal)?.to_string();
        let value = self.get_decimal_null(&text, ordinal);
        self.required(value, &text, ordinal, DataType::Numeric)
    }

    fn get_double(&mut self, ordinal: usize) -> Result<f64> {
        let text = self.raw_text(ordinal)?.to_string();
        let value = self.get_double_null(&text, ordinal);
        self.required(value, &text, ordinal, DataType::Double)
    }

    fn get_guid(&mut self, ordinal: usize) -> Result<Uuid> {
        let text = self.raw_text(ordinal)?.to_string();
        let value = self.get_guid_null(&text, ordinal);
        self.required(value, &text, ordinal, DataType::Guid)
    }

    fn get_binary(&mut self, ordinal: usize) -> Result<Vec<u8>> {
        let text = self.raw_text(ordinal)?.to_string();
        let value = self.get_binary_null(&text, ordinal);
        self.required(value, &text, ordinal, DataType::Binary)
    }

    fn get_date_time(&mut self, ordinal: usize) -> Result<NaiveDateTime> {
        let text = self.raw_text(ordinal)?.to_string();
        let error = match self.parse_date_time_at(&text, ordinal) {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => ConversionError::not_a(text.trim(), DataType::DateTime),
            Err(error) => {
                self.report(ordinal, WarningKind::Conversion, error.to_string());
                error
            }
        };
        Err(self.format_error(ordinal, error.to_string()))
    }

    /// Value at `ordinal` converted to the column's type.
    ///
    /// Failed conversions give [`Value::Null`] plus a warning. Columns with
    /// conversion disabled return their text.
    ///
    /// # Errors
    ///
    /// Fails without a current record or for an unknown ordinal.
    fn get_value(&mut self, ordinal: usize) -> Result<Value> {
        let bound = self.bound_column(ordinal)?;
        if bound.column.ignore {
            return Ok(Value::Null);
        }
        let data_type = bound.column.effective_type();
        if self.is_null(ordinal)? {
            return Ok(Value::Null);
        }
        let text = self.raw_text(ordinal)?.to_string();
        let value = match data_type {
            DataType::String => Some(Value::String(text)),
            DataType::Integer => self.get_int64_null(&text, ordinal).map(Value::Integer),
            DataType::Numeric => self.get_decimal_null(&text, ordinal).map(Value::Numeric),
            DataType::Double => self.get_double_null(&text, ordinal).map(Value::Double),
            DataType::Boolean => self.get_boolean_null(&text, ordinal).map(Value::Boolean),
            DataType::DateTime => self.get_date_time_null(&text, ordinal).map(Value::DateTime),
            DataType::Binary => self.get_binary_null(&text, ordinal).map(Value::Binary),
            DataType::Guid => self.get_guid_null(&text, ordinal).map(Value::Guid),
        };
        Ok(value.unwrap_or(Value::Null))
    }

    // === Helpers ===

    /// Reports a failed parse of non-blank text.
    fn checked<T>(
        &mut self,
        parsed: Option<T>,
        text: &str,
        ordinal: usize,
        data_type: DataType,
    ) -> Option<T> {
        if parsed.is_none() && !is_blank(text) {
            let error = ConversionError::not_a(text.trim(), data_type);
            self.report(ordinal, WarningKind::Conversion, error.to_string());
        }
        parsed
    }

    fn required<T>(
        &self,
        value: Option<T>,
        text: &str,
        ordinal: usize,
        data_type: DataType,
    ) -> Result<T> {
        value.ok_or_else(|| {
            let error = ConversionError::not_a(text.trim(), data_type);
            self.format_error(ordinal, error.to_string())
        })
    }

    fn format_error(&self, ordinal: usize, message: String) -> IngestError {
        let column = self
            .bound_column(ordinal)
            .map(|bound| bound.column.name.clone())
            .unwrap_or_default();
        IngestError::Format {
            ordinal,
            column,
            message,
        }
    }
}
