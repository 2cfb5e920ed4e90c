//! Whole-source materialization.

use delimit_model::{SchemaColumn, SchemaDescription, Value};
use serde::Serialize;

use crate::access::TypedAccess;
use crate::error::Result;
use crate::reader::DelimitedReader;

/// Forward-only cursor over typed records.
pub trait RecordCursor: TypedAccess {
    /// Advances to the next record; false when there are no more.
    ///
    /// # Errors
    ///
    /// Fails when the cursor is not positioned on a source.
    fn read(&mut self) -> Result<bool>;
}

impl RecordCursor for DelimitedReader<'_> {
    fn read(&mut self) -> Result<bool> {
        DelimitedReader::read(self)
    }
}

/// Typed rows of a source, ignored columns excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataTable {
    pub schema: SchemaDescription,
    pub rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.columns.iter().map(|column| column.name.as_str())
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Position of `name` among the table's columns, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema
            .columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let column = self.column_index(name)?;
        self.rows.get(row)?.get(column)
    }
}

/// Reads every remaining record of `cursor` into a table.
///
/// # Errors
///
/// Propagates cursor errors; conversion failures become nulls and warnings.
pub fn collect_table(cursor: &mut impl RecordCursor) -> Result<DataTable> {
    let mut kept: Vec<usize> = Vec::new();
    let mut columns: Vec<SchemaColumn> = Vec::new();
    for ordinal in 0..cursor.field_count() {
        let bound = cursor.bound_column(ordinal)?;
        if bound.column.ignore {
            continue;
        }
        columns.push(SchemaColumn {
            name: bound.column.name.clone(),
            ordinal: columns.len(),
            data_type: bound.column.effective_type(),
            hidden: false,
        });
        kept.push(ordinal);
    }

    let mut rows = Vec::new();
    while cursor.read()? {
        let mut row = Vec::with_capacity(kept.len());
        for &ordinal in &kept {
            row.push(cursor.get_value(ordinal)?);
        }
        rows.push(row);
    }
    tracing::debug!(rows = rows.len(), columns = columns.len(), "collected table");
    Ok(DataTable {
        schema: SchemaDescription { columns },
        rows,
    })
}

impl DelimitedReader<'_> {
    /// Opens the reader if needed and reads all remaining records.
    ///
    /// # Errors
    ///
    /// Returns open errors; conversion failures become nulls and warnings.
    pub fn read_all(&mut self) -> Result<DataTable> {
        if !self.is_open() {
            self.open()?;
        }
        collect_table(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReaderOptions;
    use crate::source::TextSource;
    use delimit_model::{Column, DataType};

    #[test]
    fn read_all_converts_and_skips_ignored_columns() {
        let text = "Id,Note,Amount\n1,skip me,2.5\n2,,x\n";
        let mut reader = DelimitedReader::from_source(TextSource::new(text), ReaderOptions::default())
            .expect("options")
            .with_columns(vec![
                Column::typed("Id", DataType::Integer),
                Column::new("Note").with_ignore(true),
                Column::typed("Amount", DataType::Double),
            ]);
        let table = reader.read_all().expect("read");
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["Id", "Amount"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "amount"), Some(&Value::Double(2.5)));
        assert_eq!(table.row(1), Some(&[Value::Integer(2), Value::Null][..]));
    }
}
