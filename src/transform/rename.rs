//! Column renaming and dropping

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::mapping::{ColumnDropSpec, ColumnMapping};

use super::{finish, Output, TableSource};

/// Rename the columns of a table through a mapping, then drop columns.
///
/// Column names are trimmed before lookup. Names absent from the mapping are
/// kept. Renaming is positional, so data and column order are unchanged, and
/// two columns mapped to the same name both keep it. Drop names are matched
/// against the renamed columns; names the table lacks are ignored.
///
/// The mapping and the drop spec are resolved before the table is loaded.
/// An in-memory source is copied, never modified.
pub fn rename_columns(
    mapping: &ColumnMapping,
    source: TableSource<'_>,
    columns_to_drop: Option<&ColumnDropSpec>,
    export: Option<&Path>,
    config: &Config,
) -> Result<Output> {
    config.file_format()?;
    let mapping = mapping.resolve()?;
    let to_drop = columns_to_drop.map(ColumnDropSpec::resolve).transpose()?;

    let mut table = source.load(config)?.into_owned();

    let names: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let name = column.name.trim();
            match mapping.get(name) {
                Some(target) => {
                    if config.verbose {
                        info!("Col '{name}' changed to '{target}'");
                    }
                    target.clone()
                }
                None => {
                    if config.verbose {
                        info!("- Col '{name}' not changed");
                    }
                    name.to_string()
                }
            }
        })
        .collect();
    table.set_column_names(names)?;

    if let Some(to_drop) = to_drop {
        let present: Vec<&str> = to_drop
            .iter()
            .map(String::as_str)
            .filter(|name| table.column_index(name).is_some())
            .collect();
        let removed = table.drop_columns(&present);
        if config.verbose && removed > 0 {
            info!(columns = ?present, "dropped {removed} columns");
        }
    }

    finish(table, export, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{CellValue, Table};
    use crate::parser::load_table;
    use crate::transform::testing::capture_logs;

    fn patients() -> Table {
        Table::from_rows(
            [" Nom ", "Age", "Sexe"],
            vec![
                vec!["Martin".into(), 34.into(), "F".into()],
                vec!["Durand".into(), 71.into(), CellValue::Null],
            ],
        )
    }

    fn rename(
        mapping: &ColumnMapping,
        table: &Table,
        drop: Option<&ColumnDropSpec>,
    ) -> Result<Table> {
        rename_columns(mapping, table.into(), drop, None, &Config::default())
            .map(|o| o.into_table().unwrap())
    }

    #[test]
    fn test_rename_and_drop() {
        let table = Table::from_rows(["Nom", "Age"], vec![vec!["Martin".into(), 34.into()]]);
        let mapping: ColumnMapping = [("Nom", "name")].into_iter().collect();
        let drop: ColumnDropSpec = ["Age"].into_iter().collect();

        let renamed = rename(&mapping, &table, Some(&drop)).unwrap();
        assert_eq!(renamed.column_names(), vec!["name"]);
        assert_eq!(renamed.cell(0, "name"), Some(&CellValue::from("Martin")));
    }

    #[test]
    fn test_empty_mapping_only_trims() {
        let table = patients();
        let renamed = rename(&ColumnMapping::default(), &table, None).unwrap();
        assert_eq!(renamed.column_names(), vec!["Nom", "Age", "Sexe"]);
        for (a, b) in renamed.rows.iter().zip(&table.rows) {
            assert_eq!(a.cells, b.cells);
        }
    }

    #[test]
    fn test_cells_stay_aligned() {
        let table = patients();
        let mapping: ColumnMapping = [("Age", "age"), ("Sexe", "gender"), ("Absent", "x")]
            .into_iter()
            .collect();
        let renamed = rename(&mapping, &table, None).unwrap();

        assert_eq!(renamed.column_names(), vec!["Nom", "age", "gender"]);
        assert_eq!(renamed.column_values("age"), table.column_values("Age"));
        assert_eq!(renamed.column_values("gender"), table.column_values("Sexe"));
    }

    #[test]
    fn test_duplicate_targets_are_kept() {
        let table = patients();
        let mapping: ColumnMapping = [("Age", "info"), ("Sexe", "info")].into_iter().collect();
        let renamed = rename(&mapping, &table, None).unwrap();
        assert_eq!(renamed.column_names(), vec!["Nom", "info", "info"]);

        // Dropping the shared name removes both
        let drop: ColumnDropSpec = ["info"].into_iter().collect();
        let renamed = rename(&mapping, &table, Some(&drop)).unwrap();
        assert_eq!(renamed.column_names(), vec!["Nom"]);
    }

    #[test]
    fn test_drop_matches_renamed_names() {
        let table = patients();
        let mapping: ColumnMapping = [("Age", "age")].into_iter().collect();

        // The pre-rename name no longer exists and is ignored
        let drop: ColumnDropSpec = ["Age", "Unknown"].into_iter().collect();
        let renamed = rename(&mapping, &table, Some(&drop)).unwrap();
        assert_eq!(renamed.column_names(), vec!["Nom", "age", "Sexe"]);
    }

    #[test]
    fn test_caller_table_is_untouched() {
        let table = patients();
        let before = table.clone();
        let mapping: ColumnMapping = [("Nom", "name")].into_iter().collect();
        let drop: ColumnDropSpec = ["Age"].into_iter().collect();

        rename(&mapping, &table, Some(&drop)).unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn test_resources_and_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("patients.csv");
        let mapping_path = dir.path().join("mapping.yaml");
        let drop_path = dir.path().join("drop.yaml");
        let out = dir.path().join("renamed.csv");
        std::fs::write(&csv, "Nom ;Age;IPP\nMartin;34;A1\n").unwrap();
        std::fs::write(&mapping_path, "Nom: name\nAge: age\n").unwrap();
        std::fs::write(&drop_path, "IPP: patient identifier\n").unwrap();

        let config = Config::default();
        let output = rename_columns(
            &ColumnMapping::from_resource(&mapping_path),
            TableSource::from(&csv),
            Some(&ColumnDropSpec::from_resource(&drop_path)),
            Some(out.as_path()),
            &config,
        )
        .unwrap();
        assert!(matches!(output, Output::Written { rows: 1, .. }));

        let written = load_table(&out, &config).unwrap();
        assert_eq!(written.column_names(), vec!["name", "age"]);
    }

    #[test]
    fn test_wrong_separator_recovers_when_detection_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("comma.csv");
        std::fs::write(&csv, "Nom,Age\nMartin,34\n").unwrap();
        let mapping: ColumnMapping = [("Nom", "name")].into_iter().collect();

        let strict = Config::default();
        let table = rename_columns(&mapping, TableSource::from(&csv), None, None, &strict)
            .unwrap()
            .into_table()
            .unwrap();
        assert_eq!(table.column_names(), vec!["Nom,Age"]);

        let lenient = Config::new().with_detect_separator(true);
        let table = rename_columns(&mapping, TableSource::from(&csv), None, None, &lenient)
            .unwrap()
            .into_table()
            .unwrap();
        assert_eq!(table.column_names(), vec!["name", "Age"]);
    }

    #[test]
    fn test_missing_source_file() {
        let mapping = ColumnMapping::default();
        let err = rename_columns(
            &mapping,
            TableSource::from("does/not/exist.csv"),
            None,
            None,
            &Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_export_keeps_cell_text() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let out = dir.path().join("out.csv");
        let text = "Nom;Score;Actif;Entree;IPP;Motif\n\
                    Martin;2.0;True;2021-06-01T08:15:00;12345678901234567890;  chute \n\
                    Durand;2.5;false;2021-06-01 09:00:00;42;\n";
        std::fs::write(&source, text).unwrap();

        let config = Config::new().with_import_encoding("utf-8");
        rename_columns(
            &ColumnMapping::default(),
            TableSource::from(&source),
            None,
            Some(out.as_path()),
            &config,
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), text);
    }

    #[test]
    fn test_rename_logs_each_column() {
        let table = patients();
        let mapping: ColumnMapping = [("Age", "age")].into_iter().collect();

        let (_, logs) = capture_logs(|| rename(&mapping, &table, None).unwrap());
        assert!(logs.contains("Col 'Age' changed to 'age'"), "{logs}");
        assert!(logs.contains("- Col 'Nom' not changed"), "{logs}");
        assert!(logs.contains("- Col 'Sexe' not changed"), "{logs}");

        let quiet = Config::new().with_verbose(false);
        let (_, logs) = capture_logs(|| {
            rename_columns(&mapping, TableSource::from(&table), None, None, &quiet).unwrap()
        });
        assert!(logs.is_empty(), "{logs}");
    }
}
