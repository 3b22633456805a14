//! Configuration shared by the load, transform and export operations

use encoding_rs::Encoding;

use crate::error::{Error, Result};

/// Supported file formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileFormat {
    #[default]
    Csv,
}

impl std::str::FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(FileFormat::Csv),
            _ => Err(Error::invalid_argument(format!(
                "Unsupported file format: {s} (only \"csv\" is supported)"
            ))),
        }
    }
}

/// How key groups with several rows are combined when merging by key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinMultiplicity {
    /// Standard inner join: every matching pair of rows is kept
    #[default]
    FanOut,
    /// Only the first row of each key group survives each join step
    FirstMatch,
}

/// Options for loading, transforming and exporting tables
#[derive(Debug, Clone)]
pub struct Config {
    /// File format name, must be "csv"
    pub file_format: String,
    /// Field delimiter of input files
    pub separator: u8,
    /// Field delimiter of exported files (defaults to `separator`)
    pub export_separator: Option<u8>,
    /// Character encoding label of input files
    pub import_encoding: String,
    /// Character encoding label of exported files
    pub export_encoding: String,
    /// Re-parse with a sniffed delimiter when the declared one yields a single column
    pub detect_separator: bool,
    /// Remove exact duplicate rows when fusing files
    pub drop_duplicate: bool,
    /// Reject fusion inputs whose column sets differ
    pub strict_schema: bool,
    /// Key group handling when merging by key
    pub join_multiplicity: JoinMultiplicity,
    /// Emit informational diagnostics
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_format: "csv".to_string(),
            separator: b';',
            export_separator: None,
            import_encoding: "ISO-8859-1".to_string(),
            export_encoding: "utf-8".to_string(),
            detect_separator: false,
            drop_duplicate: true,
            strict_schema: false,
            join_multiplicity: JoinMultiplicity::default(),
            verbose: true,
        }
    }
}

impl Config {
    /// Create a Config with the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file format name
    pub fn with_file_format(mut self, format: impl Into<String>) -> Self {
        self.file_format = format.into();
        self
    }

    /// Set the input delimiter
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Set the export delimiter
    pub fn with_export_separator(mut self, separator: u8) -> Self {
        self.export_separator = Some(separator);
        self
    }

    /// Set the input encoding label
    pub fn with_import_encoding(mut self, label: impl Into<String>) -> Self {
        self.import_encoding = label.into();
        self
    }

    /// Set the export encoding label
    pub fn with_export_encoding(mut self, label: impl Into<String>) -> Self {
        self.export_encoding = label.into();
        self
    }

    /// Enable the two-pass separator fallback
    pub fn with_detect_separator(mut self, detect: bool) -> Self {
        self.detect_separator = detect;
        self
    }

    /// Enable duplicate removal in fusion
    pub fn with_drop_duplicate(mut self, drop: bool) -> Self {
        self.drop_duplicate = drop;
        self
    }

    /// Enable strict schema checking in fusion
    pub fn with_strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    /// Set key group handling for merges
    pub fn with_join_multiplicity(mut self, multiplicity: JoinMultiplicity) -> Self {
        self.join_multiplicity = multiplicity;
        self
    }

    /// Enable or silence informational diagnostics
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validate the file format option
    pub fn file_format(&self) -> Result<FileFormat> {
        self.file_format.parse()
    }

    /// Delimiter used when writing
    pub fn output_separator(&self) -> u8 {
        self.export_separator.unwrap_or(self.separator)
    }

    /// Resolve the input encoding label
    pub fn import_encoding(&self) -> Result<&'static Encoding> {
        resolve_encoding(&self.import_encoding)
    }

    /// Resolve the export encoding label
    pub fn export_encoding(&self) -> Result<&'static Encoding> {
        resolve_encoding(&self.export_encoding)
    }
}

fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::invalid_argument(format!("Unknown character encoding: {label}")))
}
