//! tdefile - fusion and reshaping of delimited clinical visit files
//!
//! Small, single-pass operations over CSV tables: concatenating files that
//! share a schema, renaming and dropping columns, filtering rows with missing
//! values, and merging files on key columns.

pub mod config;
pub mod entry;
pub mod error;
pub mod mapping;
pub mod model;
pub mod output;
pub mod parser;
pub mod transform;

pub use config::{Config, FileFormat, JoinMultiplicity};
pub use entry::{EdEntry, Entry, Gender};
pub use error::{Error, Result};
pub use mapping::{ColumnDropSpec, ColumnMapping};
pub use model::{CellValue, Table};
pub use output::write_table;
pub use parser::load_table;
pub use transform::{
    fusion_same_col_files, keep_not_na_values, merge_files_by_key, rename_columns, Output,
    TableSource,
};
