//! Composite row keys for joins and duplicate detection

use super::table::{CellValue, Row, Table, NULL};
use crate::error::Result;

/// Builder for computing composite keys
///
/// A key is the ordered list of cell values at the key columns. With no key
/// columns set, the whole row is the key.
#[derive(Debug, Clone, Default)]
pub struct KeyBuilder {
    column_indices: Vec<usize>,
}

impl KeyBuilder {
    /// Key spanning every column of the row
    pub fn all_columns() -> Self {
        Self::default()
    }

    /// Resolve key columns by name, failing on the first name the table lacks
    pub fn with_column_names<S: AsRef<str>>(table: &Table, names: &[S]) -> Result<Self> {
        let column_indices = names
            .iter()
            .map(|name| table.require_column(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { column_indices })
    }

    /// Build the key of a row, borrowing its cells
    pub fn build_key<'a>(&self, row: &'a Row) -> Vec<&'a CellValue> {
        if self.column_indices.is_empty() {
            row.cells.iter().collect()
        } else {
            self.column_indices
                .iter()
                .map(|&i| row.get(i).unwrap_or(&NULL))
                .collect()
        }
    }

    /// Get the column indices
    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }
}
