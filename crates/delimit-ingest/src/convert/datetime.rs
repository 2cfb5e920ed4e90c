//! Date and time parsing for .NET-style patterns.
//!
//! Patterns such as `MM/dd/yyyy HH:mm:ss` are compiled once into chrono
//! format strings. `/` in a pattern stands for the column's date separator
//! and `:` for its time separator. Several patterns may be listed, separated
//! by `;`, and ISO 8601 text is always accepted as a fallback.

use chrono::format::{Item, Parsed, StrftimeItems, parse};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use delimit_model::ValueFormat;

use super::ConversionError;

/// Earliest year accepted for a date value.
pub const MIN_YEAR: i32 = 1752;
/// Latest year accepted for a date value.
pub const MAX_YEAR: i32 = 9999;

const ISO_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
];

/// Date used when only a time is given.
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Samples that between them render every field at its widest.
///
/// December 31 has the widest numbers; September is the longest month name
/// and 2000-09-27 is a Wednesday, the longest day name.
fn samples() -> [NaiveDateTime; 2] {
    let at = |month, day| {
        NaiveDate::from_ymd_opt(2000, month, day)
            .and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999))
            .unwrap_or_default()
    };
    [at(12, 31), at(9, 27)]
}

/// Length of the longest text a chrono format renders to.
fn rendered_len(format: &str) -> usize {
    let samples = samples();
    StrftimeItems::new(format)
        .map(|item| {
            samples
                .iter()
                .map(|sample| {
                    sample
                        .format_with_items(std::iter::once(&item))
                        .to_string()
                        .chars()
                        .count()
                })
                .max()
                .unwrap_or(0)
        })
        .sum()
}

/// One compiled date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    chrono: String,
    expected_len: usize,
    has_date: bool,
    has_time: bool,
}

impl DatePattern {
    /// Compiles a .NET-style pattern, substituting the given separators.
    ///
    /// Returns `None` when the result is not a usable chrono format.
    pub fn compile(pattern: &str, date_separator: &str, time_separator: &str) -> Option<Self> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut out = String::new();
        let mut has_date = false;
        let mut has_time = false;
        let mut index = 0;

        while index < chars.len() {
            let ch = chars[index];
            if ch == '\'' || ch == '"' {
                let end = chars[index + 1..]
                    .iter()
                    .position(|&c| c == ch)
                    .map_or(chars.len(), |offset| index + 1 + offset);
                for &literal in &chars[index + 1..end] {
                    push_literal(&mut out, literal);
                }
                index = end + 1;
                continue;
            }
            if ch == '\\' {
                if let Some(&literal) = chars.get(index + 1) {
                    push_literal(&mut out, literal);
                }
                index += 2;
                continue;
            }

            let run = chars[index..].iter().take_while(|&&c| c == ch).count();
            match ch {
                'y' => {
                    has_date = true;
                    out.push_str(if run >= 3 { "%Y" } else { "%y" });
                }
                'M' => {
                    has_date = true;
                    out.push_str(match run {
                        1 => "%-m",
                        2 => "%m",
                        3 => "%b",
                        _ => "%B",
                    });
                }
                'd' => {
                    out.push_str(match run {
                        1 => "%-d",
                        2 => "%d",
                        3 => "%a",
                        _ => "%A",
                    });
                    has_date |= run <= 2;
                }
                'H' => {
                    has_time = true;
                    out.push_str(if run == 1 { "%-H" } else { "%H" });
                }
                'h' => {
                    has_time = true;
                    out.push_str(if run == 1 { "%-I" } else { "%I" });
                }
                'm' => {
                    has_time = true;
                    out.push_str(if run == 1 { "%-M" } else { "%M" });
                }
                's' => {
                    has_time = true;
                    out.push_str(if run == 1 { "%-S" } else { "%S" });
                }
                'f' | 'F' => {
                    has_time = true;
                    if out.ends_with('.') && !out.ends_with("%.") {
                        out.pop();
                        out.push_str("%.f");
                    } else {
                        out.push_str(match run {
                            1..=3 => "%3f",
                            4..=6 => "%6f",
                            _ => "%9f",
                        });
                    }
                }
                't' => out.push_str("%p"),
                '/' => (0..run).for_each(|_| push_str_literal(&mut out, date_separator)),
                ':' => (0..run).for_each(|_| push_str_literal(&mut out, time_separator)),
                _ => (0..run).for_each(|_| push_literal(&mut out, ch)),
            }
            index += run;
        }

        if out.is_empty() || StrftimeItems::new(&out).any(|item| matches!(item, Item::Error)) {
            return None;
        }
        Some(Self {
            expected_len: rendered_len(&out),
            chrono: out,
            has_date,
            has_time,
        })
    }

    /// The chrono format string.
    pub fn chrono_format(&self) -> &str {
        &self.chrono
    }

    /// Length in characters of the longest text this pattern produces.
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Parses the full text.
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let mut parsed = Parsed::new();
        parse(&mut parsed, text, StrftimeItems::new(&self.chrono)).ok()?;
        let date = if self.has_date {
            parsed.to_naive_date().ok()?
        } else {
            base_date()
        };
        let time = if self.has_time {
            parsed.to_naive_time().ok()?
        } else {
            NaiveTime::MIN
        };
        Some(date.and_time(time))
    }

    /// Parses only a time of day.
    pub fn parse_time(&self, text: &str) -> Option<NaiveTime> {
        if !self.has_time {
            return None;
        }
        self.parse(text).map(|value| value.time())
    }
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

fn push_str_literal(out: &mut String, text: &str) {
    text.chars().for_each(|ch| push_literal(out, ch));
}

/// A parsed date-time, with the text actually used when it had to be cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParse {
    pub value: NaiveDateTime,
    /// Prefix the value was parsed from, when the full text did not match.
    pub truncated_to: Option<String>,
}

/// Compiled date and time-part patterns of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    patterns: Vec<DatePattern>,
    time_patterns: Vec<DatePattern>,
}

impl DateFormat {
    pub fn new(format: &ValueFormat) -> Self {
        let compile = |pattern: &str| {
            DatePattern::compile(pattern, &format.date_separator, &format.time_separator)
        };
        let patterns = format.date_patterns().filter_map(compile).collect();
        let time_patterns = format
            .time_part_format
            .split(';')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .chain(["H:mm:ss", "H:mm"])
            .filter_map(compile)
            .collect();
        Self {
            patterns,
            time_patterns,
        }
    }

    pub fn patterns(&self) -> &[DatePattern] {
        &self.patterns
    }

    /// Parses date text, falling back to ISO 8601 and then to a prefix of
    /// the text matching a pattern's length.
    pub fn parse_date(&self, text: &str) -> Option<DateTimeParse> {
        let text = text.trim();
        let full = self
            .patterns
            .iter()
            .find_map(|pattern| pattern.parse(text))
            .or_else(|| parse_iso(text));
        if let Some(value) = full {
            return Some(DateTimeParse {
                value,
                truncated_to: None,
            });
        }

        let length = text.chars().count();
        self.patterns.iter().find_map(|pattern| {
            let expected = pattern.expected_len();
            if expected == 0 || length <= expected {
                return None;
            }
            let prefix: String = text.chars().take(expected).collect();
            pattern.parse(&prefix).map(|value| DateTimeParse {
                value,
                truncated_to: Some(prefix),
            })
        })
    }

    /// Parses time-part text, either as a time pattern or a fraction of a day.
    pub fn parse_time_part(&self, text: &str) -> Option<NaiveTime> {
        let text = text.trim();
        if let Some(time) = self
            .time_patterns
            .iter()
            .find_map(|pattern| pattern.parse_time(text))
        {
            return Some(time);
        }
        let fraction: f64 = text.parse().ok()?;
        if !(0.0..1.0).contains(&fraction) {
            return None;
        }
        let seconds = (fraction * 86_400.0).round() as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)
    }

    /// Combines date text with optional separate time text.
    ///
    /// Empty date text with a time gives the time on the base date.
    ///
    /// # Errors
    ///
    /// Fails when either part does not parse or the year is outside
    /// [`MIN_YEAR`]..=[`MAX_YEAR`].
    pub fn parse_date_time(
        &self,
        date_text: &str,
        time_text: Option<&str>,
    ) -> Result<DateTimeParse, ConversionError> {
        let date_text = date_text.trim();
        let time_text = time_text.map(str::trim).filter(|text| !text.is_empty());

        let mut result = if date_text.is_empty() {
            if time_text.is_none() {
                return Err(ConversionError::not_a_date(date_text));
            }
            DateTimeParse {
                value: base_date().and_time(NaiveTime::MIN),
                truncated_to: None,
            }
        } else {
            self.parse_date(date_text)
                .ok_or_else(|| ConversionError::not_a_date(date_text))?
        };

        if let Some(time_text) = time_text {
            let time = self
                .parse_time_part(time_text)
                .ok_or_else(|| ConversionError::NotATime {
                    text: time_text.to_string(),
                })?;
            result.value = result.value.date().and_time(time);
        }

        let year = result.value.year();
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) && !date_text.is_empty() {
            return Err(ConversionError::YearOutOfRange {
                text: date_text.to_string(),
                year,
            });
        }
        Ok(result)
    }
}

fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    ISO_PATTERNS.iter().find_map(|pattern| {
        NaiveDateTime::parse_from_str(text, pattern)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, pattern)
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use delimit_model::DataType;

    fn format(pattern: &str) -> DateFormat {
        DateFormat::new(&ValueFormat::new(DataType::DateTime).with_date_format(pattern))
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .expect("valid date")
    }

    #[test]
    fn compiles_dotnet_tokens() {
        let pattern = DatePattern::compile("MM/dd/yyyy HH:mm:ss", "/", ":").expect("pattern");
        assert_eq!(pattern.chrono_format(), "%m/%d/%Y %H:%M:%S");
        assert_eq!(pattern.expected_len(), 19);

        let pattern = DatePattern::compile("d.M.yy h:mm tt", "/", ":").expect("pattern");
        assert_eq!(pattern.chrono_format(), "%-d.%-m.%y %-I:%M %p");

        let pattern = DatePattern::compile("yyyy/MM/dd", "-", ":").expect("pattern");
        assert_eq!(pattern.chrono_format(), "%Y-%m-%d");

        let pattern = DatePattern::compile("HH:mm:ss.fff", "/", ":").expect("pattern");
        assert_eq!(pattern.chrono_format(), "%H:%M:%S%.f");

        let pattern = DatePattern::compile("'Day' d MMMM yyyy", "/", ":").expect("pattern");
        assert_eq!(pattern.chrono_format(), "Day %-d %B %Y");
    }

    #[test]
    fn parses_with_default_pattern() {
        let parsed = format("MM/dd/yyyy").parse_date("12/24/2023").expect("date");
        assert_eq!(parsed.value, at(2023, 12, 24, 0, 0, 0));
        assert_eq!(parsed.truncated_to, None);
    }

    #[test]
    fn tries_each_listed_pattern_then_iso() {
        let format = format("dd.MM.yyyy;yyyyMMdd");
        assert_eq!(
            format.parse_date("20240102").expect("date").value,
            at(2024, 1, 2, 0, 0, 0)
        );
        assert_eq!(
            format.parse_date("2024-03-04T05:06:07").expect("iso").value,
            at(2024, 3, 4, 5, 6, 7)
        );
    }

    #[test]
    fn retries_on_truncated_prefix() {
        let parsed = format("MM/dd/yyyy").parse_date("12/24/2023 trailing").expect("date");
        assert_eq!(parsed.value, at(2023, 12, 24, 0, 0, 0));
        assert_eq!(parsed.truncated_to.as_deref(), Some("12/24/2023"));
    }

    #[test]
    fn names_are_measured_at_their_longest() {
        let pattern = DatePattern::compile("dddd MMMM dd yyyy", "/", ":").expect("pattern");
        assert_eq!(pattern.expected_len(), "Wednesday September 27 2023".len());

        let parsed = format("dddd MMMM dd yyyy")
            .parse_date("Wednesday September 27 2023 note")
            .expect("date");
        assert_eq!(parsed.value, at(2023, 9, 27, 0, 0, 0));
        assert_eq!(
            parsed.truncated_to.as_deref(),
            Some("Wednesday September 27 2023")
        );
    }

    #[test]
    fn combines_separate_time_part() {
        let format = format("MM/dd/yyyy");
        let parsed = format
            .parse_date_time("01/02/2024", Some("13:45:10"))
            .expect("date time");
        assert_eq!(parsed.value, at(2024, 1, 2, 13, 45, 10));

        let fraction = format
            .parse_date_time("01/02/2024", Some("0.5"))
            .expect("fraction");
        assert_eq!(fraction.value, at(2024, 1, 2, 12, 0, 0));

        let time_only = format.parse_date_time("", Some("06:00")).expect("time only");
        assert_eq!(time_only.value, at(1899, 12, 30, 6, 0, 0));
    }

    #[test]
    fn rejects_out_of_range_years_and_bad_text() {
        let format = format("MM/dd/yyyy");
        assert!(matches!(
            format.parse_date_time("01/01/1700", None),
            Err(ConversionError::YearOutOfRange { year: 1700, .. })
        ));
        assert!(matches!(
            format.parse_date_time("not a date", None),
            Err(ConversionError::NotA { .. })
        ));
        assert!(matches!(
            format.parse_date_time("01/02/2024", Some("later")),
            Err(ConversionError::NotATime { .. })
        ));
    }

    #[test]
    fn custom_separators_apply() {
        let value_format = ValueFormat::new(DataType::DateTime)
            .with_date_format("dd/MM/yyyy HH:mm")
            .with_date_separator(".")
            .with_time_separator(".");
        let format = DateFormat::new(&value_format);
        assert_eq!(
            format.parse_date("31.01.2024 10.30").expect("date").value,
            at(2024, 1, 31, 10, 30, 0)
        );
    }
}
