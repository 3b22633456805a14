//! CSV file parser

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{CellValue, Table};

use super::Parser;

/// Delimiters tried when the declared one yields a single column
const SEPARATOR_CANDIDATES: [u8; 4] = [b';', b',', b'\t', b'|'];

/// Field values read as the missing marker
const NA_VALUES: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let text = decode(&bytes, path, config)?;

        let table = self.parse_text(&text, path, config.separator)?;
        if !config.detect_separator || table.column_count() != 1 {
            return Ok(table);
        }

        match detect_separator(&text, config.separator) {
            Some(sep) => {
                debug!(
                    path = %path.display(),
                    declared = %char::from(config.separator),
                    detected = %char::from(sep),
                    "single column parse, retrying with detected separator"
                );
                self.parse_text(&text, path, sep)
            }
            None => Ok(table),
        }
    }

}

impl CsvParser {
    /// Parse already decoded delimited text; `path` only labels errors
    pub fn parse_text(&self, text: &str, path: &Path, separator: u8) -> Result<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(separator)
            .from_reader(text.as_bytes());

        let headers = csv_reader
            .headers()
            .map_err(|e| csv_error(path, e))?
            .clone();
        if headers.is_empty() {
            return Err(Error::parse(path, Some(1), "No columns to parse from file"));
        }

        let mut table = Table::with_column_names(unique_headers(headers.iter()));

        for result in csv_reader.records() {
            let record = result.map_err(|e| csv_error(path, e))?;
            let line = record.position().map_or(0, |p| p.line());

            if record.len() > table.column_count() {
                return Err(Error::parse(
                    path,
                    Some(line),
                    format!(
                        "Expected {} fields, saw {}",
                        table.column_count(),
                        record.len()
                    ),
                ));
            }

            // Shorter rows are padded with nulls by add_row
            let cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();
            table.add_row(cells, line as usize);
        }

        table.infer_column_types();
        Ok(table)
    }
}

/// Decode file bytes with the configured import encoding, honoring a BOM
fn decode<'a>(bytes: &'a [u8], path: &Path, config: &Config) -> Result<Cow<'a, str>> {
    let encoding = config.import_encoding()?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(Error::parse(
            path,
            None,
            format!("Invalid byte sequence for encoding {}", used.name()),
        ));
    }
    Ok(text)
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    let line = err.position().map(|p| p.line());
    Error::parse(path, line, err.to_string())
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, ...
fn unique_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for header in headers {
        let mut name = header.to_string();
        let mut n = 0;
        while names.contains(&name) {
            n += 1;
            name = format!("{header}.{n}");
        }
        names.push(name);
    }
    names
}

/// Guess the delimiter of a file from its header line.
///
/// Returns the candidate other than `declared` that occurs most often in the
/// first line, or `None` when no candidate occurs.
pub fn detect_separator(text: &str, declared: u8) -> Option<u8> {
    let header = text.lines().next()?;
    SEPARATOR_CANDIDATES
        .iter()
        .copied()
        .filter(|&sep| sep != declared)
        .map(|sep| (sep, header.bytes().filter(|&b| b == sep).count()))
        .filter(|&(_, count)| count > 0)
        .max_by_key(|&(_, count)| count)
        .map(|(sep, _)| sep)
}

/// Parse a string value into a CellValue with type inference.
///
/// A field is typed only when writing the typed value back yields the same
/// text; anything else, including surrounding whitespace, stays a string.
pub fn parse_cell_value(s: &str) -> CellValue {
    if NA_VALUES.contains(&s) {
        return CellValue::Null;
    }

    match typed_value(s) {
        Some(value) if value.to_field() == s => value,
        _ => CellValue::String(Cow::Owned(s.to_string())),
    }
}

fn typed_value(s: &str) -> Option<CellValue> {
    match s {
        "true" => return Some(CellValue::Bool(true)),
        "false" => return Some(CellValue::Bool(false)),
        _ => {}
    }

    if let Ok(i) = s.parse::<i64>() {
        return Some(CellValue::Int(i));
    }

    // Rust accepts "inf" and "nan" spellings that are text in clinical exports
    if s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.') {
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Some(CellValue::Float(f));
            }
        }
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(CellValue::Date(date));
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(CellValue::DateTime(dt));
    }

    None
}
