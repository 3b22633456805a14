//! Loader: reads delimited files into tables

mod csv;

use std::path::Path;

use tracing::debug;

use crate::config::{Config, FileFormat};
use crate::error::Result;
use crate::model::Table;

pub use self::csv::{detect_separator, parse_cell_value, CsvParser};

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;
}

/// Factory for creating parsers based on the configured file format
pub struct ParserFactory;

impl ParserFactory {
    /// Get a parser for a file format
    pub fn for_format(format: FileFormat) -> Box<dyn Parser> {
        match format {
            FileFormat::Csv => Box::new(CsvParser),
        }
    }

    /// Validate the configured format and parse a file with the matching parser
    pub fn parse(path: &Path, config: &Config) -> Result<Table> {
        let parser = Self::for_format(config.file_format()?);
        let table = parser.parse(path, config)?;
        debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "loaded table"
        );
        Ok(table)
    }
}

/// Load a delimited file into a table
pub fn load_table(path: impl AsRef<Path>, config: &Config) -> Result<Table> {
    ParserFactory::parse(path.as_ref(), config)
}
