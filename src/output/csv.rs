//! CSV writer

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::Table;

use super::TableWriter;

/// Writer for delimited text files
pub struct CsvWriter;

impl TableWriter for CsvWriter {
    fn write(&self, table: &Table, path: &Path, config: &Config) -> Result<()> {
        let text = self.to_text(table, config.output_separator(), path)?;

        let encoding = config.export_encoding()?;
        let (bytes, used, unmappable) = encoding.encode(&text);
        if unmappable {
            return Err(Error::invalid_argument(format!(
                "Table contains characters not representable in {}",
                used.name()
            )));
        }

        // Stage next to the destination so a failed write leaves no partial file
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        staged
            .write_all(&bytes)
            .and_then(|()| staged.flush())
            .map_err(|e| Error::io(path, e))?;
        staged.persist(path).map_err(|e| Error::io(path, e.error))?;

        debug!(
            path = %path.display(),
            rows = table.row_count(),
            encoding = used.name(),
            "wrote table"
        );
        Ok(())
    }
}

impl CsvWriter {
    /// Render a table as delimited text: a header line, then one line per row
    pub fn to_text(&self, table: &Table, separator: u8, path: &Path) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(separator)
            .from_writer(Vec::new());

        writer
            .write_record(table.columns.iter().map(|c| c.name.as_str()))
            .map_err(|e| Error::io(path, e.into()))?;
        for row in &table.rows {
            writer
                .write_record(row.cells.iter().map(|c| c.to_field().into_owned()))
                .map_err(|e| Error::io(path, e.into()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::io(path, e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| Error::invalid_argument(e.to_string()))
    }
}
