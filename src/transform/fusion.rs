//! Fusion of tables sharing a column schema

use std::path::Path;

use indexmap::IndexSet;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{CellValue, Column, Row, Table};

use super::{finish, load_all, Output, TableSource};

/// Concatenate tables that share the same columns, then optionally remove
/// exact duplicate rows (`config.drop_duplicate`).
///
/// Columns are matched by name. Unless `config.strict_schema` is set, inputs
/// with different columns are accepted: the result holds the union of all
/// columns in order of first appearance, with missing values where an input
/// lacks a column.
pub fn fusion_same_col_files(
    sources: &[TableSource<'_>],
    export: Option<&Path>,
    config: &Config,
) -> Result<Output> {
    config.file_format()?;
    if sources.is_empty() {
        return Err(Error::EmptyInput("fusion needs at least one table".to_string()));
    }

    let tables = load_all(sources, config)?;
    let refs: Vec<&Table> = tables.iter().map(|t| &**t).collect();
    let mut table = concat_tables(&refs, config.strict_schema)?;

    if config.drop_duplicate {
        let removed = table.drop_duplicates();
        if config.verbose {
            info!(duplicates = removed, "Number of duplicated rows: {removed}");
        }
    }

    finish(table, export, config)
}

/// Stack the rows of several tables, matching columns by name
pub fn concat_tables(tables: &[&Table], strict: bool) -> Result<Table> {
    let Some(first) = tables.first() else {
        return Err(Error::EmptyInput("nothing to concatenate".to_string()));
    };

    if strict {
        let expected: IndexSet<&str> = first.column_names().into_iter().collect();
        for table in &tables[1..] {
            let found: IndexSet<&str> = table.column_names().into_iter().collect();
            if found != expected {
                return Err(Error::SchemaMismatch {
                    expected: expected.iter().map(|s| s.to_string()).collect(),
                    found: found.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
    }

    let names: IndexSet<&str> = tables
        .iter()
        .flat_map(|t| t.columns.iter().map(|c| c.name.as_str()))
        .collect();
    let columns = names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(*name, i))
        .collect();

    let mut result = Table::new(columns);
    let width = result.column_count();
    for table in tables {
        let positions: Vec<usize> = table
            .columns
            .iter()
            .filter_map(|c| names.get_index_of(c.name.as_str()))
            .collect();

        result.rows.reserve(table.row_count());
        for row in &table.rows {
            let mut cells = vec![CellValue::Null; width];
            for (cell, &pos) in row.cells.iter().zip(&positions) {
                cells[pos] = cell.clone();
            }
            result.rows.push(Row::new(cells, row.source_line));
        }
    }

    result.infer_column_types();
    Ok(result)
}
