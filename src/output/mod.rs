//! Writer: persists tables as delimited files

mod csv;

use std::path::Path;

use crate::config::{Config, FileFormat};
use crate::error::Result;
use crate::model::Table;

pub use self::csv::CsvWriter;

/// Trait for table writers
pub trait TableWriter {
    /// Write a table to a path, replacing any existing file
    fn write(&self, table: &Table, path: &Path, config: &Config) -> Result<()>;
}

/// Factory for creating writers
pub struct OutputFactory;

impl OutputFactory {
    /// Create a writer for a file format
    pub fn create(format: FileFormat) -> Box<dyn TableWriter> {
        match format {
            FileFormat::Csv => Box::new(CsvWriter),
        }
    }
}

/// Write a table in the configured format
pub fn write_table(table: &Table, path: impl AsRef<Path>, config: &Config) -> Result<()> {
    let writer = OutputFactory::create(config.file_format()?);
    writer.write(table, path.as_ref(), config)
}
