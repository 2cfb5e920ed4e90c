//! Typed values produced by the typed-getter contract.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::data_type::DataType;

/// A converted field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Numeric(f64),
    Double(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Binary(Vec<u8>),
    Guid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type of the contained value, `None` for null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::String(_) => Some(DataType::String),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Numeric(_) => Some(DataType::Numeric),
            Value::Double(_) => Some(DataType::Double),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::DateTime(_) => Some(DataType::DateTime),
            Value::Binary(_) => Some(DataType::Binary),
            Value::Guid(_) => Some(DataType::Guid),
        }
    }

    /// Renders the value, using `null_text` for null.
    pub fn display_with<'a>(&'a self, null_text: &'a str) -> DisplayValue<'a> {
        DisplayValue {
            value: self,
            null_text,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_with("").fmt(f)
    }
}

/// Display adapter returned by [`Value::display_with`].
pub struct DisplayValue<'a> {
    value: &'a Value,
    null_text: &'a str,
}

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Null => f.write_str(self.null_text),
            Value::String(text) => f.write_str(text),
            Value::Integer(number) => write!(f, "{number}"),
            Value::Numeric(number) | Value::Double(number) => write!(f, "{number}"),
            Value::Boolean(flag) => write!(f, "{flag}"),
            Value::DateTime(stamp) => {
                if stamp.nanosecond() == 0 {
                    write!(f, "{}", stamp.format("%Y-%m-%d %H:%M:%S"))
                } else {
                    write!(f, "{}", stamp.format("%Y-%m-%d %H:%M:%S%.3f"))
                }
            }
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Guid(guid) => write!(f, "{guid}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn null_uses_display_text() {
        assert_eq!(Value::Null.display_with("(null)").to_string(), "(null)");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn date_time_display_drops_zero_fraction() {
        let stamp = NaiveDate::from_ymd_opt(2024, 2, 29)
            .and_then(|date| date.and_hms_opt(13, 5, 0))
            .expect("valid date");
        assert_eq!(Value::DateTime(stamp).to_string(), "2024-02-29 13:05:00");
    }
}
