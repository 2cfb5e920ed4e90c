//! Column name normalization.

use std::collections::HashSet;

use delimit_model::WarningKind;

use crate::field::FieldIssue;

/// Longest column name kept; longer names are cut.
pub const MAX_COLUMN_NAME_LEN: usize = 128;

/// Result of normalizing a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnNames {
    /// Unique, trimmed, length-capped names, one per column.
    pub names: Vec<String>,
    /// One entry per adjustment made.
    pub issues: Vec<FieldIssue>,
}

impl ColumnNames {
    /// Returns the number of names that had to be adjusted.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Positional default for a column without a usable name.
pub fn default_column_name(ordinal: usize) -> String {
    format!("Column{}", ordinal + 1)
}

/// Normalizes raw header names into `count` unique names.
///
/// Missing or empty names become `ColumnN`, names are trimmed and cut at
/// [`MAX_COLUMN_NAME_LEN`] characters, and a name already taken (ignoring
/// case) gets the lowest free numeric suffix.
pub fn normalize_column_names(raw: &[String], count: usize) -> ColumnNames {
    let mut result = ColumnNames::default();
    let mut taken: HashSet<String> = HashSet::with_capacity(count);

    for ordinal in 0..count {
        let original = raw.get(ordinal).map(String::as_str).unwrap_or_default();
        let mut name = original.trim().to_string();

        if name.is_empty() {
            name = default_column_name(ordinal);
            result.issues.push(FieldIssue::column(
                ordinal,
                WarningKind::ColumnName,
                format!("Column name was empty; using '{name}'"),
            ));
        } else if name.chars().count() > MAX_COLUMN_NAME_LEN {
            name = name.chars().take(MAX_COLUMN_NAME_LEN).collect();
            result.issues.push(FieldIssue::column(
                ordinal,
                WarningKind::ColumnName,
                format!("Column name was longer than {MAX_COLUMN_NAME_LEN} characters and was cut"),
            ));
        }

        if taken.contains(&name.to_lowercase()) {
            let base = name;
            let mut suffix = 2usize;
            name = format!("{base}{suffix}");
            while taken.contains(&name.to_lowercase()) {
                suffix += 1;
                name = format!("{base}{suffix}");
            }
            result.issues.push(FieldIssue::column(
                ordinal,
                WarningKind::ColumnName,
                format!("Column name '{base}' is used more than once; renamed to '{name}'"),
            ));
        }

        taken.insert(name.to_lowercase());
        result.names.push(name);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn clean_names_pass_through() {
        let names = normalize_column_names(&raw(&["Id", " Name ", "Qty"]), 3);
        assert_eq!(names.names, vec!["Id", "Name", "Qty"]);
        assert_eq!(names.issue_count(), 0);
    }

    #[test]
    fn empty_and_missing_names_get_defaults() {
        let names = normalize_column_names(&raw(&["Id", "  "]), 3);
        assert_eq!(names.names, vec!["Id", "Column2", "Column3"]);
        assert_eq!(names.issue_count(), 2);
        assert_eq!(names.issues[0].column, Some(1));
    }

    #[test]
    fn duplicates_get_suffixes() {
        let names = normalize_column_names(&raw(&["Value", "value", "VALUE", "Value2"]), 4);
        assert_eq!(names.names, vec!["Value", "value2", "VALUE3", "Value22"]);
        assert_eq!(names.issue_count(), 3);
    }

    #[test]
    fn long_names_are_cut() {
        let long = "x".repeat(200);
        let names = normalize_column_names(&[long], 1);
        assert_eq!(names.names[0].chars().count(), MAX_COLUMN_NAME_LEN);
        assert_eq!(names.issues[0].kind, WarningKind::ColumnName);
    }

    #[test]
    fn default_name_can_collide() {
        let names = normalize_column_names(&raw(&["Column2", ""]), 2);
        assert_eq!(names.names, vec!["Column2", "Column22"]);
    }
}
