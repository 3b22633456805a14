//! Table, Row, and Cell data structures

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::key::KeyBuilder;
use super::schema::{CellType, Column};
use crate::error::{Error, Result};

/// A cell value with type information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value marker, distinct from the empty string
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            // Int and Float compare equal across types, so they share one hash space
            CellValue::Int(i) => hash_number(*i as f64, state),
            CellValue::Float(f) => hash_number(*f, state),
            other => {
                std::mem::discriminant(other).hash(state);
                match other {
                    CellValue::Bool(b) => b.hash(state),
                    CellValue::String(s) => s.hash(state),
                    CellValue::Date(d) => d.hash(state),
                    CellValue::DateTime(dt) => dt.hash(state),
                    _ => {}
                }
            }
        }
    }
}

fn hash_number<H: Hasher>(n: f64, state: &mut H) {
    let canonical = if n.is_nan() {
        f64::NAN
    } else if n == 0.0 {
        0.0
    } else {
        n
    };
    state.write_u8(0xFF);
    canonical.to_bits().hash(state);
}

impl CellValue {
    /// Check if the value is the missing marker
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Inferred type of this value
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Null => CellType::Null,
            CellValue::Bool(_) => CellType::Bool,
            CellValue::Int(_) => CellType::Int,
            CellValue::Float(_) => CellType::Float,
            CellValue::String(_) => CellType::String,
            CellValue::Date(_) => CellType::Date,
            CellValue::DateTime(_) => CellType::DateTime,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Text written to a delimited file; missing values become empty fields
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            other => other.display(),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line number in the source file (1-indexed, 0 when built in memory)
    pub source_line: usize,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// Stands in for cells missing from a row shorter than the header
pub(crate) static NULL: CellValue = CellValue::Null;

/// A table containing columns and rows
///
/// Every row holds exactly one cell per column. Equality matches columns by
/// name, so column order does not count; rows are compared in order and
/// source line numbers are ignored.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        if self.column_count() != other.column_count() || self.rows.len() != other.rows.len() {
            return false;
        }
        let Some(positions) = self.matching_columns(other) else {
            return false;
        };
        self.rows.iter().zip(&other.rows).all(|(a, b)| {
            positions
                .iter()
                .enumerate()
                .all(|(i, &j)| a.get(i).unwrap_or(&NULL) == b.get(j).unwrap_or(&NULL))
        })
    }
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create an empty table from column names
    pub fn with_column_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Column::new(name, i))
            .collect();
        Self::new(columns)
    }

    /// Build a table from column names and rows of cell values, inferring column types
    pub fn from_rows<I, S>(names: I, rows: Vec<Vec<CellValue>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::with_column_names(names);
        for cells in rows {
            table.add_row(cells, 0);
        }
        table.infer_column_types();
        table
    }

    /// Add a row to the table, padding or truncating it to the column count
    pub fn add_row(&mut self, mut cells: Vec<CellValue>, source_line: usize) {
        cells.resize(self.column_count(), CellValue::Null);
        self.rows.push(Row::new(cells, source_line));
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column index by name, failing if the column does not exist
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::unknown_column(name, self.column_names()))
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All values of one column, top to bottom
    pub fn column_values(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.get(idx).unwrap_or(&NULL)).collect())
    }

    /// Cell at a row position in a named column
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Replace every column name positionally, keeping data and order.
    ///
    /// Names are not checked for uniqueness: two columns may end up sharing a
    /// name, and lookups by that name then resolve to the leftmost one.
    pub fn set_column_names(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.columns.len() {
            return Err(Error::invalid_argument(format!(
                "Expected {} column names, got {}",
                self.columns.len(),
                names.len()
            )));
        }
        for (column, name) in self.columns.iter_mut().zip(names) {
            column.name = name;
        }
        Ok(())
    }

    /// Remove every column whose name is listed, returning how many were removed
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.iter().any(|n| n.as_ref() == c.name))
            .collect();
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return 0;
        }

        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.cells.retain(|_| *flags.next().unwrap_or(&true));
        }
        self.reindex_columns();
        removed
    }

    /// Keep only the rows for which the predicate holds
    pub fn retain_rows<F>(&mut self, predicate: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(predicate);
    }

    /// Remove rows equal across all columns to an earlier row, keeping the
    /// first occurrence. Returns the number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        self.drop_duplicates_by(&KeyBuilder::all_columns())
    }

    /// Remove rows whose key equals the key of an earlier row
    pub fn drop_duplicates_by(&mut self, key: &KeyBuilder) -> usize {
        let before = self.rows.len();
        let mut seen = FxHashSet::default();
        let keep: Vec<bool> = self
            .rows
            .iter()
            .map(|row| seen.insert(key.build_key(row)))
            .collect();
        // Keys borrow the rows
        drop(seen);

        let mut flags = keep.iter();
        self.rows.retain(|_| *flags.next().unwrap_or(&true));
        before - self.rows.len()
    }

    /// Infer column types from data
    pub fn infer_column_types(&mut self) {
        for col_idx in 0..self.column_count() {
            let inferred = self
                .rows
                .iter()
                .filter_map(|row| row.cells.get(col_idx))
                .fold(CellType::Null, |acc, cell| acc.widen(cell.cell_type()));

            if let Some(col) = self.columns.get_mut(col_idx) {
                col.inferred_type = inferred;
            }
        }
    }

    /// For each of our columns, the position of the same-named column in
    /// `other`; repeated names pair up by occurrence
    fn matching_columns(&self, other: &Table) -> Option<Vec<usize>> {
        let mut used = vec![false; other.column_count()];
        self.columns
            .iter()
            .map(|column| {
                let j = other
                    .columns
                    .iter()
                    .zip(&used)
                    .position(|(c, &taken)| !taken && c.name == column.name)?;
                used[j] = true;
                Some(j)
            })
            .collect()
    }

    /// Restore column indices after columns were removed or reordered
    fn reindex_columns(&mut self) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.index = i;
        }
    }
}
