//! Text to typed value conversion.
//!
//! Conversions never fail a read: callers turn a [`ConversionError`] into a
//! warning and a null value, or into [`IngestError::Format`] on the strict
//! path.
//!
//! [`IngestError::Format`]: crate::error::IngestError::Format

mod datetime;
mod number;

pub use datetime::{DateFormat, DatePattern, DateTimeParse, MAX_YEAR, MIN_YEAR, base_date};
pub use number::{narrow_i32, parse_decimal, parse_integer};

use delimit_model::{DataType, Value, ValueFormat};
use thiserror::Error;
use uuid::Uuid;

/// Why a text value did not convert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("'{text}' is not {}", .expected.with_article())]
    NotA { text: String, expected: DataType },

    #[error("'{text}' is not a time")]
    NotATime { text: String },

    #[error("'{text}' is out of range for {target}")]
    OutOfRange { text: String, target: &'static str },

    #[error("'{text}' has year {year}, outside {MIN_YEAR}-{MAX_YEAR}")]
    YearOutOfRange { text: String, year: i32 },

    #[error("unknown time zone '{zone}'")]
    UnknownTimeZone { zone: String },
}

impl ConversionError {
    pub fn not_a(text: &str, expected: DataType) -> Self {
        Self::NotA {
            text: text.to_string(),
            expected,
        }
    }

    pub(crate) fn not_a_date(text: &str) -> Self {
        Self::not_a(text, DataType::DateTime)
    }
}

const BUILTIN_TRUE: &[&str] = &["true", "yes", "y", "1", "on"];
const BUILTIN_FALSE: &[&str] = &["false", "no", "n", "0", "off"];

/// True when the text counts as no value.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Parses a boolean using the configured tokens, then the built-in set.
pub fn parse_boolean(text: &str, format: &ValueFormat) -> Option<bool> {
    let text = text.trim();
    let matches = |token: &str| token.to_lowercase() == text.to_lowercase();
    if format.true_tokens().any(matches) {
        return Some(true);
    }
    if format.false_tokens().any(matches) {
        return Some(false);
    }
    if BUILTIN_TRUE.iter().any(|token| token.eq_ignore_ascii_case(text)) {
        return Some(true);
    }
    if BUILTIN_FALSE.iter().any(|token| token.eq_ignore_ascii_case(text)) {
        return Some(false);
    }
    None
}

/// Decodes hex text, with or without a `0x` prefix.
pub fn parse_binary(text: &str) -> Option<Vec<u8>> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits).ok()
}

pub fn parse_guid(text: &str) -> Option<Uuid> {
    Uuid::parse_str(text.trim()).ok()
}

/// Converts text to `data_type`; date-time columns go through
/// [`DateFormat`] instead because they may combine several columns.
///
/// # Errors
///
/// Returns [`ConversionError::NotA`] when the text does not parse.
pub fn convert_text(
    text: &str,
    data_type: DataType,
    format: &ValueFormat,
) -> Result<Value, ConversionError> {
    if is_blank(text) {
        return Ok(Value::Null);
    }
    let value = match data_type {
        DataType::String => Some(Value::String(text.to_string())),
        DataType::Integer => parse_integer(text, format).map(Value::Integer),
        DataType::Numeric => parse_decimal(text, format).map(Value::Numeric),
        DataType::Double => parse_decimal(text, format).map(Value::Double),
        DataType::Boolean => parse_boolean(text, format).map(Value::Boolean),
        DataType::Binary => parse_binary(text).map(Value::Binary),
        DataType::Guid => parse_guid(text).map(Value::Guid),
        DataType::DateTime => DateFormat::new(format)
            .parse_date(text)
            .map(|parsed| Value::DateTime(parsed.value)),
    };
    value.ok_or_else(|| ConversionError::not_a(text, data_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_use_configured_then_builtin_tokens() {
        let format = ValueFormat::new(DataType::Boolean)
            .with_true_values("Ja|X")
            .with_false_values("Nein");
        assert_eq!(parse_boolean("ja", &format), Some(true));
        assert_eq!(parse_boolean(" x ", &format), Some(true));
        assert_eq!(parse_boolean("NEIN", &format), Some(false));
        assert_eq!(parse_boolean("yes", &format), Some(true));
        assert_eq!(parse_boolean("Off", &format), Some(false));
        assert_eq!(parse_boolean("maybe", &format), None);
    }

    #[test]
    fn binary_from_hex() {
        assert_eq!(parse_binary("0xCAFE"), Some(vec![0xca, 0xfe]));
        assert_eq!(parse_binary("00ff"), Some(vec![0x00, 0xff]));
        assert_eq!(parse_binary("abc"), None);
    }

    #[test]
    fn guid_forms() {
        let plain = parse_guid("67e55044-10b1-426f-9247-bb680e5fe0c8").expect("guid");
        let braced = parse_guid("{67e55044-10b1-426f-9247-bb680e5fe0c8}").expect("braced");
        assert_eq!(plain, braced);
        assert_eq!(parse_guid("not-a-guid"), None);
    }

    #[test]
    fn convert_text_reports_failures() {
        let format = ValueFormat::new(DataType::Integer);
        assert_eq!(
            convert_text("42", DataType::Integer, &format),
            Ok(Value::Integer(42))
        );
        assert_eq!(convert_text("  ", DataType::Integer, &format), Ok(Value::Null));
        let error = convert_text("abc", DataType::Integer, &format).expect_err("not a number");
        assert_eq!(error.to_string(), "'abc' is not an integer");
    }
}
