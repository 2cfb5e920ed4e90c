//! Repair of rows with too many columns.
//!
//! An unescaped delimiter inside free text splits one value into two. The
//! realigner keeps a per-column profile of the rows that had the expected
//! width and merges adjacent cells of an over-wide row until it fits,
//! choosing at each step the merge whose cells best match those profiles.
//! Before enough rows have been profiled, merges are scored on the cell
//! kinds and on whether the joined text occurs in the raw record.

use delimit_model::WarningKind;

use crate::field::FieldIssue;

/// Rows of the expected width needed before the column profiles are used.
pub const MIN_PROFILE_ROWS: usize = 2;

const LENGTH_WEIGHT: f64 = 0.2;
const RAW_TEXT_BONUS: f64 = 0.1;

/// Coarse shape of a cell's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Integer,
    Decimal,
    Date,
    Boolean,
    Text,
}

impl CellKind {
    const COUNT: usize = 6;

    fn index(self) -> usize {
        match self {
            CellKind::Empty => 0,
            CellKind::Integer => 1,
            CellKind::Decimal => 2,
            CellKind::Date => 3,
            CellKind::Boolean => 4,
            CellKind::Text => 5,
        }
    }

    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return CellKind::Empty;
        }
        if ["true", "false", "yes", "no"]
            .iter()
            .any(|word| word.eq_ignore_ascii_case(text))
        {
            return CellKind::Boolean;
        }
        let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
        if unsigned.chars().all(|ch| ch.is_ascii_digit()) && !unsigned.is_empty() {
            return CellKind::Integer;
        }
        if unsigned.chars().all(|ch| ch.is_ascii_digit() || ch == '.' || ch == ',')
            && unsigned.chars().filter(|ch| matches!(ch, '.' | ',')).count() == 1
            && unsigned.chars().any(|ch| ch.is_ascii_digit())
        {
            return CellKind::Decimal;
        }
        let parts: Vec<&str> = text
            .split(['/', '-', '.', ' ', ':', 'T'])
            .filter(|part| !part.is_empty())
            .collect();
        if parts.len() >= 3
            && parts
                .iter()
                .all(|part| part.chars().all(|ch| ch.is_ascii_digit()))
        {
            return CellKind::Date;
        }
        CellKind::Text
    }
}

#[derive(Debug, Clone, Default)]
struct ColumnProfile {
    kinds: [u32; CellKind::COUNT],
    rows: u32,
    max_len: usize,
}

impl ColumnProfile {
    fn observe(&mut self, text: &str) {
        self.kinds[CellKind::classify(text).index()] += 1;
        self.rows += 1;
        self.max_len = self.max_len.max(text.chars().count());
    }

    /// Share of observed cells that had `kind`.
    fn share(&self, kind: CellKind) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        f64::from(self.kinds[kind.index()]) / f64::from(self.rows)
    }

    /// 1.0 when `len` is within what was seen, decreasing beyond it.
    fn length_fit(&self, len: usize) -> f64 {
        if len <= self.max_len {
            1.0
        } else if self.max_len == 0 {
            0.0
        } else {
            self.max_len as f64 / len as f64
        }
    }
}

/// Result of a realign attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Realignment {
    pub row: Vec<String>,
    pub issues: Vec<FieldIssue>,
    /// The row now has the expected width.
    pub resolved: bool,
}

/// Learns column shapes and repairs over-wide rows.
#[derive(Debug, Clone)]
pub struct RowRealigner {
    expected: usize,
    delimiter: char,
    profiles: Vec<ColumnProfile>,
    rows_seen: usize,
}

impl RowRealigner {
    pub fn new(expected: usize, delimiter: char) -> Self {
        Self {
            expected,
            delimiter,
            profiles: vec![ColumnProfile::default(); expected],
            rows_seen: 0,
        }
    }

    /// Rows that contributed to the profiles.
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Adds a row to the profiles; rows of another width are ignored.
    pub fn observe(&mut self, row: &[String]) {
        if row.len() != self.expected {
            return;
        }
        for (profile, cell) in self.profiles.iter_mut().zip(row) {
            profile.observe(cell);
        }
        self.rows_seen += 1;
    }

    /// Merges cells of `row` until it has the expected width.
    ///
    /// `raw_text` is the source text of the record; a merge whose joined
    /// text occurs there verbatim is preferred.
    pub fn realign(&self, row: Vec<String>, raw_text: &str) -> Realignment {
        if row.len() <= self.expected {
            return Realignment {
                row,
                issues: Vec::new(),
                resolved: true,
            };
        }
        let overflow = row.len() - self.expected;
        if overflow > self.expected {
            let tail = row[self.expected..].join(&self.delimiter.to_string());
            return Realignment {
                row,
                issues: vec![FieldIssue {
                    column: None,
                    kind: WarningKind::Realign,
                    message: format!(
                        "Could not realign {overflow} extra columns; unresolved text '{tail}'"
                    ),
                }],
                resolved: false,
            };
        }

        let profiled = self.rows_seen >= MIN_PROFILE_ROWS;
        let mut cells = row;
        let mut absorbed = vec![false; cells.len()];
        while cells.len() > self.expected {
            let limit = self.expected.min(cells.len() - 1);
            let mut best: Option<(usize, f64)> = None;
            for index in 0..limit {
                let joined = self.join(&cells[index], &cells[index + 1]);
                let score = if profiled {
                    self.score(&cells, index, &joined, raw_text)
                } else {
                    kind_score(&cells[index], &cells[index + 1], &joined, raw_text)
                };
                if best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((index, score));
                }
            }
            let Some((index, _)) = best else { break };
            let next = cells.remove(index + 1);
            cells[index] = self.join(&cells[index], &next);
            let next_absorbed = absorbed.remove(index + 1);
            absorbed[index] = true;
            absorbed[index] |= next_absorbed;
        }

        let mut issues: Vec<FieldIssue> = absorbed
            .iter()
            .enumerate()
            .filter(|(_, absorbed)| **absorbed)
            .map(|(column, _)| {
                FieldIssue::column(
                    column,
                    WarningKind::Realign,
                    format!(
                        "Column absorbed an extra delimiter; value is now '{}'",
                        cells[column]
                    ),
                )
            })
            .collect();
        let resolved = cells.len() == self.expected;
        if !resolved {
            let tail = cells[self.expected..].join(&self.delimiter.to_string());
            issues.push(FieldIssue {
                column: None,
                kind: WarningKind::Realign,
                message: format!("Could not realign columns; unresolved text '{tail}'"),
            });
        }
        Realignment {
            resolved,
            row: cells,
            issues,
        }
    }

    fn join(&self, left: &str, right: &str) -> String {
        let mut joined = String::with_capacity(left.len() + right.len() + 1);
        joined.push_str(left);
        joined.push(self.delimiter);
        joined.push_str(right);
        joined
    }

    /// Fit of the row that results from merging `index` and `index + 1`.
    fn score(&self, cells: &[String], index: usize, joined: &str, raw_text: &str) -> f64 {
        let candidate = cells[..index]
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(joined))
            .chain(cells[index + 2..].iter().map(String::as_str));
        let mut score: f64 = candidate
            .zip(&self.profiles)
            .map(|(cell, profile)| {
                profile.share(CellKind::classify(cell))
                    + LENGTH_WEIGHT * profile.length_fit(cell.chars().count())
            })
            .sum();
        if raw_text.contains(joined) {
            score += RAW_TEXT_BONUS;
        }
        score
    }
}

/// Merge score without column history: text next to text is the likely
/// split, numbers and dates rarely contain a delimiter.
fn kind_score(left: &str, right: &str, joined: &str, raw_text: &str) -> f64 {
    let free_text =
        |cell: &str| matches!(CellKind::classify(cell), CellKind::Text | CellKind::Empty);
    let mut score = match (free_text(left), free_text(right)) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.5,
        (false, false) => 0.0,
    };
    if raw_text.contains(joined) {
        score += RAW_TEXT_BONUS;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| (*f).to_string()).collect()
    }

    fn trained(rows: &[&[&str]]) -> RowRealigner {
        let mut realigner = RowRealigner::new(rows[0].len(), ',');
        for fields in rows {
            realigner.observe(&row(fields));
        }
        realigner
    }

    #[test]
    fn classifies_cells() {
        assert_eq!(CellKind::classify(""), CellKind::Empty);
        assert_eq!(CellKind::classify("-12"), CellKind::Integer);
        assert_eq!(CellKind::classify("3.5"), CellKind::Decimal);
        assert_eq!(CellKind::classify("2024-01-02"), CellKind::Date);
        assert_eq!(CellKind::classify("Yes"), CellKind::Boolean);
        assert_eq!(CellKind::classify("hello world"), CellKind::Text);
    }

    #[test]
    fn merges_free_text_column() {
        let realigner = trained(&[
            &["1", "red apple", "2.5"],
            &["2", "green pear", "1.25"],
            &["3", "plum", "0.75"],
        ]);
        let result = realigner.realign(row(&["4", "apples", " pears", "3.5"]), "4,apples, pears,3.5");
        assert!(result.resolved);
        assert_eq!(result.row, row(&["4", "apples, pears", "3.5"]));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].column, Some(1));
        assert_eq!(result.issues[0].kind, WarningKind::Realign);
    }

    #[test]
    fn two_column_row_absorbs_into_text_column() {
        let realigner = trained(&[&["alpha", "10"], &["beta", "20"], &["gamma", "30"]]);
        let result = realigner.realign(row(&["a", "b", "c", "40"]), "a,b,c,40");
        assert!(result.resolved);
        assert_eq!(result.row, row(&["a,b,c", "40"]));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].column, Some(0));
    }

    #[test]
    fn merges_without_history() {
        let realigner = RowRealigner::new(2, ',');
        let result = realigner.realign(row(&["a", "b", "c", "d"]), "a,b,c,d");
        assert!(result.resolved);
        assert_eq!(result.row, row(&["a,b,c", "d"]));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].column, Some(0));
        assert!(result.issues[0].message.contains("'a,b,c'"));
    }

    #[test]
    fn sparse_history_keeps_numbers_apart() {
        let realigner = trained(&[&["a", "1"]]);
        let result = realigner.realign(row(&["x", "y", "2"]), "x,y,2");
        assert!(result.resolved);
        assert_eq!(result.row, row(&["x,y", "2"]));
    }

    #[test]
    fn gives_up_on_large_overflow() {
        let realigner = trained(&[&["a", "1"], &["b", "2"]]);
        let result = realigner.realign(row(&["a", "b", "c", "d", "e"]), "a,b,c,d,e");
        assert!(!result.resolved);
        assert_eq!(result.issues[0].column, None);
        assert!(result.issues[0].message.contains("c,d,e"));
    }

    #[test]
    fn deterministic_for_same_history() {
        let realigner = trained(&[&["1", "x", "y"], &["2", "x", "y"]]);
        let input = row(&["3", "p", "q", "r"]);
        let first = realigner.realign(input.clone(), "3,p,q,r");
        let second = realigner.realign(input, "3,p,q,r");
        assert_eq!(first, second);
    }
}
