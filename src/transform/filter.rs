//! Filtering of rows with missing values

use crate::error::Result;
use crate::model::Table;

/// Keep only the rows with a value in every one of `columns`.
///
/// Fails with `UnknownColumn` before filtering if any column is absent. A row
/// shorter than the header counts as missing in the columns it lacks.
pub fn keep_not_na_values<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table> {
    let indices = columns
        .iter()
        .map(|name| table.require_column(name.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut kept = table.clone();
    kept.retain_rows(|row| indices.iter().all(|&i| row.get(i).is_some_and(|c| !c.is_null())));
    Ok(kept)
}
