//! Time-zone adjustment of date-time values.
//!
//! Zone conversion is delegated through [`TimeZoneAdjust`] so callers with a
//! zone database can plug one in. [`FixedOffsetAdjust`] understands UTC and
//! fixed offsets only.

use chrono::{FixedOffset, NaiveDateTime, TimeZone};

use crate::convert::ConversionError;

/// Converts a local date-time from one zone to another.
pub trait TimeZoneAdjust {
    /// Converts `value`, read as local time in `source`, to local time in
    /// `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::UnknownTimeZone`] for a zone it cannot
    /// resolve.
    fn adjust(
        &self,
        value: NaiveDateTime,
        source: &str,
        destination: &str,
    ) -> Result<NaiveDateTime, ConversionError>;
}

/// Adjuster for `UTC`, `GMT`, `Z`, and fixed offsets such as `+02:00`,
/// `-0530`, `+7`, or `UTC+01:00`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOffsetAdjust;

impl TimeZoneAdjust for FixedOffsetAdjust {
    fn adjust(
        &self,
        value: NaiveDateTime,
        source: &str,
        destination: &str,
    ) -> Result<NaiveDateTime, ConversionError> {
        let from = parse_fixed_offset(source).ok_or_else(|| ConversionError::UnknownTimeZone {
            zone: source.to_string(),
        })?;
        let to = parse_fixed_offset(destination).ok_or_else(|| {
            ConversionError::UnknownTimeZone {
                zone: destination.to_string(),
            }
        })?;
        if from == to {
            return Ok(value);
        }
        from.from_local_datetime(&value)
            .single()
            .map(|local| local.with_timezone(&to).naive_local())
            .ok_or_else(|| ConversionError::UnknownTimeZone {
                zone: source.to_string(),
            })
    }
}

/// Parses a zone name or fixed offset.
pub fn parse_fixed_offset(zone: &str) -> Option<FixedOffset> {
    let zone = zone.trim();
    let upper = zone.to_ascii_uppercase();
    let offset = ["UTC", "GMT"]
        .iter()
        .find_map(|prefix| upper.strip_prefix(prefix))
        .unwrap_or(upper.as_str())
        .trim();
    if offset.is_empty() || offset == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, digits) = match offset.as_bytes().first() {
        Some(b'+') => (1, &offset[1..]),
        Some(b'-') => (-1, &offset[1..]),
        _ => return None,
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };
    if hours.is_empty()
        || !hours.chars().chain(minutes.chars()).all(|ch| ch.is_ascii_digit())
    {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|date| date.and_hms_opt(h, m, 0))
            .expect("valid")
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_fixed_offset("UTC"), FixedOffset::east_opt(0));
        assert_eq!(parse_fixed_offset("z"), FixedOffset::east_opt(0));
        assert_eq!(parse_fixed_offset("+02:00"), FixedOffset::east_opt(7200));
        assert_eq!(parse_fixed_offset("-0530"), FixedOffset::east_opt(-19800));
        assert_eq!(parse_fixed_offset("UTC+1"), FixedOffset::east_opt(3600));
        assert_eq!(parse_fixed_offset("GMT-03:30"), FixedOffset::east_opt(-12600));
        assert_eq!(parse_fixed_offset("Europe/Berlin"), None);
        assert_eq!(parse_fixed_offset("+25:00"), None);
    }

    #[test]
    fn converts_between_offsets() {
        let adjust = FixedOffsetAdjust;
        assert_eq!(adjust.adjust(at(12, 0), "+02:00", "UTC"), Ok(at(10, 0)));
        assert_eq!(adjust.adjust(at(12, 0), "UTC", "-01:30"), Ok(at(10, 30)));
        assert_eq!(adjust.adjust(at(12, 0), "UTC", "GMT"), Ok(at(12, 0)));
    }

    #[test]
    fn unknown_zone_is_error() {
        let adjust = FixedOffsetAdjust;
        assert!(matches!(
            adjust.adjust(at(12, 0), "Mars/Olympus", "UTC"),
            Err(ConversionError::UnknownTimeZone { .. })
        ));
    }
}
