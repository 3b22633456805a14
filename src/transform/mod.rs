//! Table operations: fusion, renaming, missing-value filtering and key merging
//!
//! Every operation borrows its inputs and produces a new table. Inputs given
//! as paths are loaded with the configured separator and encoding; the result
//! is either returned or written to an export path.

mod filter;
mod fusion;
mod merge;
mod rename;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::model::Table;
use crate::output::write_table;
use crate::parser::load_table;

pub use filter::keep_not_na_values;
pub use fusion::{concat_tables, fusion_same_col_files};
pub use merge::{inner_join, merge_files_by_key, MERGE_SUFFIX};
pub use rename::rename_columns;

/// A table argument: a file to load, or a table already in memory
#[derive(Debug, Clone, Copy)]
pub enum TableSource<'a> {
    Path(&'a Path),
    Table(&'a Table),
}

impl<'a> TableSource<'a> {
    /// Load the table if needed; in-memory tables are borrowed, not copied
    pub fn load(&self, config: &Config) -> Result<Cow<'a, Table>> {
        match *self {
            TableSource::Path(path) => load_table(path, config).map(Cow::Owned),
            TableSource::Table(table) => Ok(Cow::Borrowed(table)),
        }
    }
}

impl<'a> From<&'a Table> for TableSource<'a> {
    fn from(table: &'a Table) -> Self {
        TableSource::Table(table)
    }
}

impl<'a> From<&'a Path> for TableSource<'a> {
    fn from(path: &'a Path) -> Self {
        TableSource::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for TableSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        TableSource::Path(path.as_path())
    }
}

impl<'a> From<&'a str> for TableSource<'a> {
    fn from(path: &'a str) -> Self {
        TableSource::Path(Path::new(path))
    }
}

/// Result of an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// No export path was given
    Table(Table),
    /// The table was written to `path`
    Written { path: PathBuf, rows: usize },
}

impl Output {
    /// The returned table, if the result was not exported
    pub fn into_table(self) -> Option<Table> {
        match self {
            Output::Table(table) => Some(table),
            Output::Written { .. } => None,
        }
    }

    /// Borrow the returned table, if any
    pub fn table(&self) -> Option<&Table> {
        match self {
            Output::Table(table) => Some(table),
            Output::Written { .. } => None,
        }
    }
}

/// Return the table, or write it when an export path is given
fn finish(table: Table, export: Option<&Path>, config: &Config) -> Result<Output> {
    match export {
        Some(path) => {
            write_table(&table, path, config)?;
            Ok(Output::Written {
                path: path.to_path_buf(),
                rows: table.row_count(),
            })
        }
        None => Ok(Output::Table(table)),
    }
}

/// Load every source, in order
fn load_all<'a>(sources: &[TableSource<'a>], config: &Config) -> Result<Vec<Cow<'a, Table>>> {
    sources.iter().map(|source| source.load(config)).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_source_is_borrowed() {
        let table = Table::with_column_names(["id"]);
        let loaded = TableSource::from(&table).load(&Config::default()).unwrap();
        assert!(matches!(loaded, Cow::Borrowed(_)));
    }

    #[test]
    fn test_finish_without_export_returns_table() {
        let table = Table::with_column_names(["id"]);
        let output = finish(table.clone(), None, &Config::default()).unwrap();
        assert_eq!(output.into_table(), Some(table));
    }

    #[test]
    fn test_finish_with_export_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = Table::from_rows(["id"], vec![vec![1.into()], vec![2.into()]]);

        let output = finish(table, Some(path.as_path()), &Config::default()).unwrap();
        assert_eq!(
            output,
            Output::Written {
                path: path.clone(),
                rows: 2
            }
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\n1\n2\n");
    }
}
