//! Numeric text parsing with culture-style separators.

use delimit_model::ValueFormat;

/// Number text rewritten into Rust float syntax, plus the divisor implied
/// by a trailing percent or per-mille sign.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Normalized {
    text: String,
    divisor: u32,
}

fn normalize(text: &str, format: &ValueFormat) -> Option<Normalized> {
    let mut body = text.trim();
    if body.is_empty() {
        return None;
    }

    let mut negative = false;
    if let Some(inner) = body.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        negative = true;
        body = inner.trim();
    }

    let mut divisor = 1;
    if let Some(rest) = body.strip_suffix('%') {
        divisor = 100;
        body = rest.trim_end();
    } else if let Some(rest) = body.strip_suffix('\u{2030}') {
        divisor = 1000;
        body = rest.trim_end();
    }

    if let Some(rest) = body.strip_prefix('-') {
        if negative {
            return None;
        }
        negative = true;
        body = rest;
    } else if let Some(rest) = body.strip_prefix('+') {
        body = rest;
    }

    let decimal = format.decimal_separator.unwrap_or('.');
    let group = format.group_separator;
    let mut out = String::with_capacity(body.len() + 1);
    if negative {
        out.push('-');
    }
    let mut seen_digit = false;
    let mut seen_decimal = false;
    let mut seen_exponent = false;
    let mut previous = '\0';

    for ch in body.chars() {
        if ch.is_ascii_digit() {
            seen_digit = true;
            out.push(ch);
        } else if ch == decimal && !seen_decimal && !seen_exponent {
            seen_decimal = true;
            out.push('.');
        } else if is_group(ch, group) && seen_digit && !seen_decimal && !seen_exponent {
            // group separators carry no value
        } else if matches!(ch, 'e' | 'E') && seen_digit && !seen_exponent {
            seen_exponent = true;
            out.push('e');
        } else if matches!(ch, '+' | '-') && matches!(previous, 'e' | 'E') {
            out.push(ch);
        } else {
            return None;
        }
        previous = ch;
    }

    if !seen_digit || out.ends_with('e') || out.ends_with(['+', '-']) {
        return None;
    }
    Some(Normalized { text: out, divisor })
}

/// A space group separator also matches the non-breaking variants.
fn is_group(ch: char, group: Option<char>) -> bool {
    match group {
        Some(' ') => matches!(ch, ' ' | '\u{a0}' | '\u{202f}'),
        Some(group) => ch == group,
        None => false,
    }
}

/// Parses a whole number.
///
/// Accepts group separators and integral decimal text (`"12.0"`). Fails on
/// fractions and values outside `i64`.
pub fn parse_integer(text: &str, format: &ValueFormat) -> Option<i64> {
    let normalized = normalize(text, format)?;
    if normalized.divisor == 1 && !normalized.text.contains(['.', 'e']) {
        return normalized.text.parse().ok();
    }
    let value = normalized.text.parse::<f64>().ok()? / f64::from(normalized.divisor);
    if !value.is_finite()
        || value.fract() != 0.0
        || value < i64::MIN as f64
        || value >= i64::MAX as f64
    {
        return None;
    }
    Some(value as i64)
}

/// Parses a decimal number.
pub fn parse_decimal(text: &str, format: &ValueFormat) -> Option<f64> {
    let normalized = normalize(text, format)?;
    let value = normalized.text.parse::<f64>().ok()? / f64::from(normalized.divisor);
    value.is_finite().then_some(value)
}

/// Narrows to `i32`, `None` when out of range.
pub fn narrow_i32(value: i64) -> Option<i32> {
    i32::try_from(value).ok()
}
