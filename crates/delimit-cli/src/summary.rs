use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use delimit_model::{SchemaDescription, Value, Warning, WarningKind, WarningScope};

use crate::commands::{RowsResult, SchemaResult};

pub fn print_rows(result: &RowsResult, null_text: &str) {
    println!("{}", rows_table(result, null_text));
    println!(
        "{} records, {} warnings",
        result.table.len(),
        result.warnings.len()
    );
    print_warnings(&result.warnings);
}

pub fn print_schema(result: &SchemaResult) {
    println!("{}", schema_table(&result.description));
    print_warnings(&result.warnings);
}

pub fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("Warnings:");
    println!("{}", warning_table(warnings));
}

pub fn rows_table(result: &RowsResult, null_text: &str) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("#")];
    header.extend(result.table.column_names().map(header_cell));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, row) in result.table.rows.iter().enumerate() {
        let mut cells = vec![dim_cell(index + 1)];
        cells.extend(row.iter().map(|value| value_cell(value, null_text)));
        table.add_row(cells);
    }
    table
}

pub fn schema_table(description: &SchemaDescription) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Ordinal"),
        header_cell("Name"),
        header_cell("Type"),
        header_cell("Hidden"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for column in &description.columns {
        let name = if column.hidden {
            dim_cell(&column.name)
        } else {
            Cell::new(&column.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            Cell::new(column.ordinal),
            name,
            Cell::new(column.data_type.describe()),
            if column.hidden {
                Cell::new("yes").fg(Color::Yellow)
            } else {
                dim_cell("-")
            },
        ]);
    }
    table
}

pub fn warning_table(warnings: &[Warning]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Record"),
        header_cell("Lines"),
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    for warning in warnings {
        let lines = if warning.start_line == warning.end_line {
            warning.start_line.to_string()
        } else {
            format!("{}-{}", warning.start_line, warning.end_line)
        };
        table.add_row(vec![
            Cell::new(warning.record_number),
            Cell::new(lines),
            scope_cell(warning),
            kind_cell(warning.kind),
            Cell::new(&warning.message),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn value_cell(value: &Value, null_text: &str) -> Cell {
    match value {
        Value::Null => dim_cell(null_text),
        Value::Integer(_) | Value::Numeric(_) | Value::Double(_) => {
            Cell::new(value).set_alignment(CellAlignment::Right)
        }
        _ => Cell::new(value),
    }
}

fn scope_cell(warning: &Warning) -> Cell {
    match (&warning.column_name, warning.scope) {
        (Some(name), _) => Cell::new(name),
        (None, WarningScope::Column(ordinal)) => Cell::new(ordinal),
        (None, WarningScope::Row) => dim_cell("row"),
        (None, WarningScope::Trailer) => dim_cell("trailer"),
    }
}

fn kind_cell(kind: WarningKind) -> Cell {
    let color = match kind {
        WarningKind::Scan | WarningKind::Schema => Color::Red,
        WarningKind::RowShape | WarningKind::Realign | WarningKind::Conversion => Color::Yellow,
        _ => Color::DarkGrey,
    };
    Cell::new(kind).fg(color)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use delimit_ingest::DataTable;
    use delimit_model::{Column, DataType};

    fn result() -> RowsResult {
        let columns = vec![
            Column::typed("Id", DataType::Integer).with_ordinal(0),
            Column::new("Name").with_ordinal(1),
        ];
        RowsResult {
            table: DataTable {
                schema: SchemaDescription::from_columns(&columns),
                rows: vec![
                    vec![Value::Integer(1), Value::String("Ada".to_string())],
                    vec![Value::Integer(2), Value::Null],
                ],
            },
            warnings: Vec::new(),
        }
    }

    #[test]
    fn rows_table_has_index_and_columns() {
        let mut table = rows_table(&result(), "(null)");
        assert_eq!(table.column_count(), 3);
        let rendered = table.to_string();
        assert!(rendered.contains("Ada"));
        assert!(rendered.contains("(null)"));
    }

    #[test]
    fn warning_table_shows_line_ranges() {
        let warnings = vec![Warning {
            record_number: 3,
            scope: WarningScope::Column(1),
            kind: WarningKind::LineFeed,
            message: "Value contains a line break".to_string(),
            start_line: 4,
            end_line: 5,
            column_name: Some("Note".to_string()),
        }];
        let rendered = warning_table(&warnings).to_string();
        assert!(rendered.contains("4-5"));
        assert!(rendered.contains("Note"));
    }
}
