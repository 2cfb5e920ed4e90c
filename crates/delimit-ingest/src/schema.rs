//! Schema binding.
//!
//! Combines header names with caller-supplied column definitions and
//! resolves cross-column references (time part, time zone) to ordinals.

use delimit_model::{Column, SchemaDescription, TimeZoneSource, WarningKind};

use crate::error::{IngestError, Result};
use crate::field::FieldIssue;

/// Where a column takes its time zone from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneBinding {
    /// Zone text is read from another column of the same record.
    Column(usize),
    /// Fixed zone for every record.
    Constant(String),
}

/// A column with its references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn {
    pub column: Column,
    /// Ordinal of the column holding the time of day.
    pub time_part: Option<usize>,
    pub time_zone: Option<ZoneBinding>,
}

/// Columns of an open reader, by ordinal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundSchema {
    pub columns: Vec<BoundColumn>,
    /// Definitions that could not be applied.
    pub issues: Vec<FieldIssue>,
}

impl BoundSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&BoundColumn> {
        self.columns.get(ordinal)
    }

    /// Plain column definitions in ordinal order.
    pub fn column_list(&self) -> Vec<Column> {
        self.columns.iter().map(|bound| bound.column.clone()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|bound| bound.column.name.as_str())
    }

    /// Case-insensitive lookup of a column ordinal by name.
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|bound| bound.column.matches_name(name))
    }

    pub fn description(&self) -> SchemaDescription {
        SchemaDescription::from_columns(&self.column_list())
    }
}

/// Builds the schema for `names`.
///
/// With a header, caller definitions are matched to header names ignoring
/// case. Without one, a definition is matched by name first and otherwise
/// by position. Unmatched positions become text columns.
///
/// # Errors
///
/// Returns [`IngestError::Model`] when a definition carries an invalid
/// value format.
pub fn bind_schema(
    names: &[String],
    definitions: &[Column],
    has_header: bool,
) -> Result<BoundSchema> {
    let mut schema = BoundSchema::default();
    let mut used = vec![false; definitions.len()];

    for (ordinal, name) in names.iter().enumerate() {
        let matched = definitions
            .iter()
            .position(|definition| definition.matches_name(name))
            .or_else(|| {
                (!has_header && ordinal < definitions.len() && !used[ordinal]).then_some(ordinal)
            });

        let column = match matched {
            Some(index) => {
                used[index] = true;
                let definition = &definitions[index];
                definition
                    .value_format
                    .validate()
                    .map_err(|source| IngestError::Model {
                        column: definition.name.clone(),
                        source,
                    })?;
                let mut column = definition.clone();
                if has_header {
                    column.name = name.clone();
                }
                column.ordinal = ordinal;
                column
            }
            None => Column::new(name.clone()).with_ordinal(ordinal),
        };
        schema.columns.push(BoundColumn {
            column,
            time_part: None,
            time_zone: None,
        });
    }

    for (index, definition) in definitions.iter().enumerate() {
        if !used[index] {
            schema.issues.push(FieldIssue {
                column: None,
                kind: WarningKind::Schema,
                message: format!(
                    "Column '{}' is defined but not present in the file",
                    definition.name
                ),
            });
        }
    }

    resolve_references(&mut schema);
    Ok(schema)
}

fn resolve_references(schema: &mut BoundSchema) {
    for ordinal in 0..schema.columns.len() {
        let column = schema.columns[ordinal].column.clone();

        if let Some(time_part) = column.time_part.as_deref() {
            match schema.ordinal_of(time_part) {
                Some(target) if target != ordinal => {
                    schema.columns[ordinal].time_part = Some(target);
                }
                _ => schema.issues.push(FieldIssue::column(
                    ordinal,
                    WarningKind::Schema,
                    format!("Time part column '{time_part}' was not found"),
                )),
            }
        }

        match &column.time_zone {
            Some(TimeZoneSource::Constant(zone)) => {
                schema.columns[ordinal].time_zone = Some(ZoneBinding::Constant(zone.clone()));
            }
            Some(TimeZoneSource::Column(name)) => match schema.ordinal_of(name) {
                Some(target) if target != ordinal => {
                    schema.columns[ordinal].time_zone = Some(ZoneBinding::Column(target));
                }
                _ => schema.issues.push(FieldIssue::column(
                    ordinal,
                    WarningKind::Schema,
                    format!("Time zone column '{name}' was not found"),
                )),
            },
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delimit_model::{DataType, ValueFormat};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn unmatched_columns_are_text() {
        let schema = bind_schema(&names(&["A", "B"]), &[], true).expect("bind");
        assert_eq!(schema.len(), 2);
        assert!(schema.columns.iter().all(|b| b.column.data_type() == DataType::String));
        assert_eq!(schema.columns[1].column.ordinal, 1);
    }

    #[test]
    fn definitions_match_by_name_ignoring_case() {
        let definitions = vec![Column::typed("qty", DataType::Integer)];
        let schema = bind_schema(&names(&["Id", "QTY"]), &definitions, true).expect("bind");
        let qty = &schema.columns[1].column;
        assert_eq!(qty.data_type(), DataType::Integer);
        assert_eq!(qty.name, "QTY");
        assert_eq!(qty.ordinal, 1);
        assert!(schema.issues.is_empty());
    }

    #[test]
    fn headerless_definitions_match_by_position() {
        let definitions = vec![
            Column::typed("Id", DataType::Integer),
            Column::typed("Price", DataType::Numeric),
        ];
        let schema =
            bind_schema(&names(&["Column1", "Column2"]), &definitions, false).expect("bind");
        assert_eq!(schema.columns[0].column.name, "Id");
        assert_eq!(schema.columns[1].column.data_type(), DataType::Numeric);
    }

    #[test]
    fn resolves_time_part_and_zone_columns() {
        let definitions = vec![
            Column::typed("Date", DataType::DateTime)
                .with_time_part("Time")
                .with_time_zone(TimeZoneSource::Column("Zone".into())),
            Column::typed("Stamp", DataType::DateTime)
                .with_time_zone(TimeZoneSource::Constant("+02:00".into())),
        ];
        let schema =
            bind_schema(&names(&["Date", "Time", "Zone", "Stamp"]), &definitions, true).expect("bind");
        assert_eq!(schema.columns[0].time_part, Some(1));
        assert_eq!(schema.columns[0].time_zone, Some(ZoneBinding::Column(2)));
        assert_eq!(
            schema.columns[3].time_zone,
            Some(ZoneBinding::Constant("+02:00".into()))
        );
    }

    #[test]
    fn missing_references_and_definitions_are_reported() {
        let definitions = vec![
            Column::typed("Date", DataType::DateTime).with_time_part("Clock"),
            Column::new("Missing"),
        ];
        let schema = bind_schema(&names(&["Date"]), &definitions, true).expect("bind");
        assert_eq!(schema.columns[0].time_part, None);
        assert_eq!(schema.issues.len(), 2);
        assert!(schema.issues.iter().all(|issue| issue.kind == WarningKind::Schema));
    }

    #[test]
    fn invalid_format_is_an_error() {
        let format = ValueFormat::new(DataType::Numeric)
            .with_decimal_separator(Some(','))
            .with_group_separator(Some(','));
        let definitions = vec![Column::new("Amount").with_format(format)];
        let result = bind_schema(&names(&["Amount"]), &definitions, true);
        assert!(matches!(result, Err(IngestError::Model { .. })));
    }
}
