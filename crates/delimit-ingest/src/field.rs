//! Post-processing of a finished field.
//!
//! Runs once the raw text of a field is known: trimming, placeholder
//! substitution, per-field checks, and treat-as-null blanking.

use delimit_model::WarningKind;

use crate::options::{ReaderOptions, TrimmingOption};

/// Character produced by decoders for unmappable bytes.
pub const REPLACEMENT_CHAR: char = '\u{fffd}';
pub const NBSP: char = '\u{a0}';

/// An issue found while scanning, before it is bound to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Column index, `None` for the whole row.
    pub column: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

impl FieldIssue {
    pub fn column(column: usize, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            column: Some(column),
            kind,
            message: message.into(),
        }
    }
}

/// Field rules derived from the reader options.
#[derive(Debug, Clone)]
pub(crate) struct FieldRules {
    delimiter: char,
    qualifier: Option<char>,
    trimming: TrimmingOption,
    delimiter_placeholder: String,
    qualifier_placeholder: String,
    newline_placeholder: String,
    treat_text_as_null: String,
    unknown_as_space: bool,
    nbsp_as_space: bool,
    warn_delimiter: bool,
    warn_qualifier: bool,
    warn_line_feed: bool,
    warn_unknown: bool,
    warn_nbsp: bool,
}

impl FieldRules {
    pub(crate) fn new(options: &ReaderOptions) -> Self {
        Self {
            delimiter: options.delimiter,
            qualifier: options.qualifier,
            trimming: options.trimming,
            delimiter_placeholder: options.delimiter_placeholder.clone(),
            qualifier_placeholder: options.qualifier_placeholder.clone(),
            newline_placeholder: options.newline_placeholder.clone(),
            treat_text_as_null: options.treat_text_as_null.trim().to_string(),
            unknown_as_space: options.treat_unknown_character_as_space,
            nbsp_as_space: options.treat_nbsp_as_space,
            warn_delimiter: options.warnings.delimiter_in_value,
            warn_qualifier: options.warnings.qualifier_in_value,
            warn_line_feed: options.warnings.line_feed,
            warn_unknown: options.warnings.unknown_character,
            warn_nbsp: options.warnings.non_breaking_space,
        }
    }

    /// Turns scanned text into the final field value, recording issues.
    pub(crate) fn finish(
        &self,
        raw: &str,
        quoted: bool,
        column: usize,
        issues: &mut Vec<FieldIssue>,
    ) -> String {
        let trimmed = match (self.trimming, quoted) {
            (TrimmingOption::All, _) | (TrimmingOption::Unquoted, false) => raw.trim(),
            _ => raw,
        };
        let mut text = self.substitute_placeholders(trimmed);
        if text.is_empty() {
            return text;
        }

        if self.warn_qualifier
            && let Some(qualifier) = self.qualifier
            && text.contains(qualifier)
        {
            issues.push(FieldIssue::column(
                column,
                WarningKind::Qualifier,
                format!("Field contains the qualifier {qualifier:?}"),
            ));
        }
        if self.warn_delimiter && text.contains(self.delimiter) {
            issues.push(FieldIssue::column(
                column,
                WarningKind::Delimiter,
                format!("Field contains the delimiter {:?}", self.delimiter),
            ));
        }
        if text.contains(REPLACEMENT_CHAR) {
            if self.warn_unknown && has_dense_unknown_characters(&text) {
                issues.push(FieldIssue::column(
                    column,
                    WarningKind::UnknownCharacter,
                    "Field contains unknown characters; the encoding may be wrong",
                ));
            }
            if self.unknown_as_space {
                text = text.replace(REPLACEMENT_CHAR, " ");
            }
        }
        if text.contains(NBSP) {
            if self.nbsp_as_space {
                text = text.replace(NBSP, " ");
            } else if self.warn_nbsp {
                issues.push(FieldIssue::column(
                    column,
                    WarningKind::NonBreakingSpace,
                    "Field contains a non-breaking space",
                ));
            }
        }
        if self.warn_line_feed && text.contains(['\r', '\n']) {
            issues.push(FieldIssue::column(
                column,
                WarningKind::LineFeed,
                "Field contains a line break",
            ));
        }
        if !self.treat_text_as_null.is_empty()
            && text.trim().eq_ignore_ascii_case(&self.treat_text_as_null)
        {
            text.clear();
        }
        text
    }

    fn substitute_placeholders(&self, text: &str) -> String {
        let mut result = text.to_string();
        if !self.newline_placeholder.is_empty() {
            result = result.replace(&self.newline_placeholder, "\n");
        }
        if !self.delimiter_placeholder.is_empty() {
            let mut buffer = [0u8; 4];
            result = result.replace(
                &self.delimiter_placeholder,
                self.delimiter.encode_utf8(&mut buffer),
            );
        }
        if !self.qualifier_placeholder.is_empty()
            && let Some(qualifier) = self.qualifier
        {
            let mut buffer = [0u8; 4];
            result = result.replace(
                &self.qualifier_placeholder,
                qualifier.encode_utf8(&mut buffer),
            );
        }
        result
    }
}

/// True when replacement characters look like an encoding problem rather
/// than a stray byte: three within any four-character window, or more than
/// a quarter of the field.
pub fn has_dense_unknown_characters(text: &str) -> bool {
    let mut total = 0usize;
    let mut positions = Vec::new();
    for (index, ch) in text.chars().enumerate() {
        total += 1;
        if ch == REPLACEMENT_CHAR {
            positions.push(index);
        }
    }
    if positions.is_empty() {
        return false;
    }
    if positions.len() * 4 > total {
        return true;
    }
    positions.windows(3).any(|window| window[2] - window[0] < 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WarningOptions;

    fn rules(options: ReaderOptions) -> FieldRules {
        FieldRules::new(&options)
    }

    #[test]
    fn placeholders_are_replaced_once_per_occurrence() {
        let rules = rules(ReaderOptions::default().with_placeholders("{d}", "{q}", "{n}"));
        let mut issues = Vec::new();
        let text = rules.finish("a{d}b{n}c{q}{q}", false, 0, &mut issues);
        assert_eq!(text, "a,b\nc\"\"");
    }

    #[test]
    fn trims_by_policy() {
        let mut issues = Vec::new();
        let unquoted = rules(ReaderOptions::default());
        assert_eq!(unquoted.finish("  a ", false, 0, &mut issues), "a");
        assert_eq!(unquoted.finish("  a ", true, 0, &mut issues), "  a ");
        let all = rules(ReaderOptions::default().with_trimming(TrimmingOption::All));
        assert_eq!(all.finish("  a ", true, 0, &mut issues), "a");
        let none = rules(ReaderOptions::default().with_trimming(TrimmingOption::None));
        assert_eq!(none.finish("  a ", false, 0, &mut issues), "  a ");
    }

    #[test]
    fn treat_text_as_null_blanks_field() {
        let rules = rules(ReaderOptions::default().with_treat_text_as_null("NULL"));
        let mut issues = Vec::new();
        assert_eq!(rules.finish("NULL", false, 0, &mut issues), "");
        assert_eq!(rules.finish("null", true, 0, &mut issues), "");
        assert_eq!(rules.finish("NULLS", false, 0, &mut issues), "NULLS");
    }

    #[test]
    fn embedded_delimiter_and_qualifier_warn_when_enabled() {
        let options = ReaderOptions::default().with_warnings(WarningOptions {
            delimiter_in_value: true,
            qualifier_in_value: true,
            ..WarningOptions::default()
        });
        let rules = rules(options);
        let mut issues = Vec::new();
        rules.finish("a,\"b", true, 3, &mut issues);
        let kinds: Vec<WarningKind> = issues.iter().map(|issue| issue.kind).collect();
        assert_eq!(kinds, vec![WarningKind::Qualifier, WarningKind::Delimiter]);
        assert!(issues.iter().all(|issue| issue.column == Some(3)));
    }

    #[test]
    fn dense_unknown_heuristic() {
        assert!(!has_dense_unknown_characters("plain"));
        assert!(!has_dense_unknown_characters("a long value with one \u{fffd} in it"));
        assert!(has_dense_unknown_characters("x\u{fffd}"));
        assert!(has_dense_unknown_characters(
            "some text M\u{fffd}\u{fffd}\u{fffd}ller and more text here"
        ));
        assert!(has_dense_unknown_characters(
            "a long prefix of text \u{fffd}a\u{fffd}\u{fffd} more text after it"
        ));
    }

    #[test]
    fn unknown_characters_replaced_when_configured() {
        let rules = rules(ReaderOptions::default().with_treat_unknown_character_as_space(true));
        let mut issues = Vec::new();
        let text = rules.finish("M\u{fffd}\u{fffd}ller", false, 0, &mut issues);
        assert_eq!(text, "M  ller");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, WarningKind::UnknownCharacter);
    }

    #[test]
    fn nbsp_replaced_or_reported() {
        let mut issues = Vec::new();
        let keep = rules(ReaderOptions::default());
        assert_eq!(keep.finish("a\u{a0}b", false, 1, &mut issues), "a\u{a0}b");
        assert_eq!(issues[0].kind, WarningKind::NonBreakingSpace);

        let mut issues = Vec::new();
        let replace = rules(ReaderOptions::default().with_treat_nbsp_as_space(true));
        assert_eq!(replace.finish("a\u{a0}b", false, 1, &mut issues), "a b");
        assert!(issues.is_empty());
    }
}
