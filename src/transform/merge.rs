//! Inner joins of several tables on shared key columns

use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::{Config, JoinMultiplicity};
use crate::error::{Error, Result};
use crate::model::{CellValue, Column, KeyBuilder, Row, Table};

use super::{finish, load_all, Output, TableSource};

/// Suffix given to right-hand columns whose name already exists on the left
pub const MERGE_SUFFIX: &str = "_merged";

/// Inner-join tables left to right on the key columns `on`.
///
/// After each join, every column whose name contains [`MERGE_SUFFIX`] is
/// dropped, so a column present on both sides keeps only its left-hand values.
/// Key groups fan out unless `config.join_multiplicity` is
/// [`JoinMultiplicity::FirstMatch`].
pub fn merge_files_by_key<S: AsRef<str>>(
    sources: &[TableSource<'_>],
    on: &[S],
    export: Option<&Path>,
    config: &Config,
) -> Result<Output> {
    config.file_format()?;
    if on.is_empty() {
        return Err(Error::invalid_argument("no key columns to merge on"));
    }

    let tables = load_all(sources, config)?;
    for table in &tables {
        KeyBuilder::with_column_names(table, on)?;
    }

    let mut tables = tables.into_iter();
    let Some(first) = tables.next() else {
        return Err(Error::EmptyInput("merging by key needs at least one table".to_string()));
    };
    let mut merged = first.into_owned();

    for right in tables {
        let mut joined = inner_join(&merged, &right, on)?;

        let duplicated: Vec<String> = joined
            .columns
            .iter()
            .filter(|c| c.name.contains(MERGE_SUFFIX))
            .map(|c| c.name.clone())
            .collect();
        if !duplicated.is_empty() {
            joined.drop_columns(&duplicated);
            debug!(columns = ?duplicated, "dropped duplicated merge columns");
        }

        if config.join_multiplicity == JoinMultiplicity::FirstMatch {
            let key = KeyBuilder::with_column_names(&joined, on)?;
            let removed = joined.drop_duplicates_by(&key);
            debug!(rows = removed, "kept first row of each key group");
        }

        merged = joined;
    }

    finish(merged, export, config)
}

/// Inner join of two tables on the key columns `on`.
///
/// Output columns are the left columns, then the right columns other than the
/// keys; a right column whose name exists on the left gets [`MERGE_SUFFIX`].
/// Rows follow left order, and each left row is paired with every matching
/// right row in right order.
pub fn inner_join<S: AsRef<str>>(left: &Table, right: &Table, on: &[S]) -> Result<Table> {
    let left_key = KeyBuilder::with_column_names(left, on)?;
    let right_key = KeyBuilder::with_column_names(right, on)?;

    let right_kept: Vec<usize> = (0..right.column_count())
        .filter(|i| !right_key.column_indices().contains(i))
        .collect();

    let mut columns = left.columns.clone();
    for &i in &right_kept {
        let source = &right.columns[i];
        let name = if left.column_index(&source.name).is_some() {
            format!("{}{MERGE_SUFFIX}", source.name)
        } else {
            source.name.clone()
        };
        columns.push(Column::with_type(name, columns.len(), source.inferred_type));
    }

    let mut index: FxHashMap<Vec<&CellValue>, Vec<usize>> = FxHashMap::default();
    for (i, row) in right.rows.iter().enumerate() {
        index.entry(right_key.build_key(row)).or_default().push(i);
    }

    let mut joined = Table::new(columns);
    for row in &left.rows {
        let Some(matches) = index.get(&left_key.build_key(row)) else {
            continue;
        };
        for &m in matches {
            let other = &right.rows[m];
            let mut cells = row.cells.clone();
            cells.resize(left.column_count(), CellValue::Null);
            cells.extend(
                right_kept
                    .iter()
                    .map(|&i| other.get(i).cloned().unwrap_or(CellValue::Null)),
            );
            joined.rows.push(Row::new(cells, row.source_line));
        }
    }

    joined.infer_column_types();
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(tables: &[&Table], on: &[&str], config: &Config) -> Result<Table> {
        let sources: Vec<TableSource<'_>> = tables.iter().map(|&t| t.into()).collect();
        merge_files_by_key(&sources, on, None, config).map(|o| o.into_table().unwrap())
    }

    #[test]
    fn test_merge_two_tables() {
        let a = Table::from_rows(
            ["id", "v"],
            vec![vec![1.into(), 10.into()], vec![2.into(), 20.into()]],
        );
        let b = Table::from_rows(
            ["id", "w"],
            vec![vec![2.into(), 200.into()], vec![3.into(), 300.into()]],
        );

        let merged = merge(&[&a, &b], &["id"], &Config::default()).unwrap();
        let expected = Table::from_rows(["id", "v", "w"], vec![vec![2.into(), 20.into(), 200.into()]]);
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_shared_column_keeps_left_values() {
        let a = Table::from_rows(["id", "site"], vec![vec![1.into(), "A".into()]]);
        let b = Table::from_rows(
            ["site", "id", "score"],
            vec![vec!["B".into(), 1.into(), 5.into()]],
        );

        let joined = inner_join(&a, &b, &["id"]).unwrap();
        assert_eq!(joined.column_names(), vec!["id", "site", "site_merged", "score"]);

        let merged = merge(&[&a, &b], &["id"], &Config::default()).unwrap();
        assert_eq!(merged.column_names(), vec!["id", "site", "score"]);
        assert_eq!(merged.cell(0, "site"), Some(&CellValue::from("A")));
        assert!(merged.column_names().iter().all(|c| !c.contains(MERGE_SUFFIX)));
    }

    #[test]
    fn test_three_way_merge_on_composite_key() {
        let a = Table::from_rows(
            ["id", "day", "a"],
            vec![
                vec![1.into(), "d1".into(), "x".into()],
                vec![1.into(), "d2".into(), "y".into()],
            ],
        );
        let b = Table::from_rows(
            ["day", "id", "b"],
            vec![
                vec!["d2".into(), 1.into(), true.into()],
                vec!["d1".into(), 1.into(), false.into()],
            ],
        );
        let c = Table::from_rows(["id", "day", "c"], vec![vec![1.into(), "d2".into(), 7.into()]]);

        let merged = merge(&[&a, &b, &c], &["id", "day"], &Config::default()).unwrap();
        assert_eq!(merged.column_names(), vec!["id", "day", "a", "b", "c"]);
        assert_eq!(merged.row_count(), 1);
        assert_eq!(
            merged.rows[0].cells,
            vec![
                CellValue::Int(1),
                "d2".into(),
                "y".into(),
                CellValue::Bool(true),
                CellValue::Int(7)
            ]
        );
    }

    #[test]
    fn test_key_groups_fan_out() {
        let a = Table::from_rows(
            ["id", "v"],
            vec![vec![1.into(), "a1".into()], vec![1.into(), "a2".into()]],
        );
        let b = Table::from_rows(
            ["id", "w"],
            vec![
                vec![1.into(), "b1".into()],
                vec![1.into(), "b2".into()],
                vec![1.into(), "b3".into()],
            ],
        );

        let fanned = merge(&[&a, &b], &["id"], &Config::default()).unwrap();
        assert_eq!(fanned.row_count(), 6);
        assert_eq!(fanned.rows[1].cells[2], CellValue::from("b2"));
        assert_eq!(fanned.rows[3].cells[1], CellValue::from("a2"));

        let config = Config::new().with_join_multiplicity(JoinMultiplicity::FirstMatch);
        let first = merge(&[&a, &b], &["id"], &config).unwrap();
        assert_eq!(first.row_count(), 1);
        assert_eq!(
            first.rows[0].cells,
            vec![CellValue::Int(1), "a1".into(), "b1".into()]
        );
    }

    #[test]
    fn test_inner_join_containment() {
        let a = Table::from_rows(
            ["id"],
            vec![vec![1.into()], vec![2.into()], vec![4.into()], vec![CellValue::Null]],
        );
        let b = Table::from_rows(["id"], vec![vec![2.0.into()], vec![3.into()], vec![4.into()]]);

        let merged = merge(&[&a, &b], &["id"], &Config::default()).unwrap();
        let a_ids = a.column_values("id").unwrap();
        let b_ids = b.column_values("id").unwrap();
        for id in merged.column_values("id").unwrap() {
            assert!(a_ids.contains(&id) && b_ids.contains(&id));
        }
        // Int and Float keys with equal values match
        assert_eq!(merged.row_count(), 2);
    }

    #[test]
    fn test_single_table_passes_through() {
        let a = Table::from_rows(["id"], vec![vec![1.into()]]);
        assert_eq!(merge(&[&a], &["id"], &Config::default()).unwrap(), a);
    }

    #[test]
    fn test_merge_errors() {
        let a = Table::from_rows(["id"], vec![vec![1.into()]]);
        let b = Table::from_rows(["ident"], vec![vec![1.into()]]);

        assert!(matches!(
            merge(&[&a, &b], &["id"], &Config::default()),
            Err(Error::UnknownColumn { .. })
        ));
        assert!(matches!(
            merge(&[], &["id"], &Config::default()),
            Err(Error::EmptyInput(_))
        ));
        assert!(matches!(
            merge(&[&a], &[], &Config::default()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_short_right_row_joins_with_missing_values() {
        let a = Table::from_rows(["id", "v"], vec![vec![1.into(), "a".into()]]);
        let mut b = Table::with_column_names(["id", "w", "z"]);
        b.rows.push(Row::new(vec![1.into(), "b".into()], 0));

        let joined = inner_join(&a, &b, &["id"]).unwrap();
        assert_eq!(
            joined.rows[0].cells,
            vec![CellValue::Int(1), "a".into(), "b".into(), CellValue::Null]
        );
    }
}
