//! Rename and drop specifications, inline or loaded from key-value documents

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Mapping from original column name to replacement name
pub type NameMap = IndexMap<String, String>;

/// Column rename specification
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnMapping {
    /// Mapping given directly
    Inline(NameMap),
    /// YAML or JSON document holding the mapping
    FromResource(PathBuf),
}

impl ColumnMapping {
    /// Mapping document at a path
    pub fn from_resource(path: impl Into<PathBuf>) -> Self {
        Self::FromResource(path.into())
    }

    /// Resolve to a concrete mapping, reading the document if needed
    pub fn resolve(&self) -> Result<Cow<'_, NameMap>> {
        match self {
            ColumnMapping::Inline(map) => Ok(Cow::Borrowed(map)),
            ColumnMapping::FromResource(path) => {
                let document = read_document(path)?;
                mapping_from_value(document, path).map(Cow::Owned)
            }
        }
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping::Inline(NameMap::new())
    }
}

impl From<NameMap> for ColumnMapping {
    fn from(map: NameMap) -> Self {
        ColumnMapping::Inline(map)
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ColumnMapping::Inline(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Columns to drop after renaming
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDropSpec {
    /// Names given directly
    Names(Vec<String>),
    /// YAML or JSON document: a list of names, or a mapping whose keys are the names
    FromResource(PathBuf),
}

impl ColumnDropSpec {
    /// Drop-spec document at a path
    pub fn from_resource(path: impl Into<PathBuf>) -> Self {
        Self::FromResource(path.into())
    }

    /// Resolve to the list of column names, reading the document if needed
    pub fn resolve(&self) -> Result<Vec<String>> {
        match self {
            ColumnDropSpec::Names(names) => Ok(names.clone()),
            ColumnDropSpec::FromResource(path) => {
                let document = read_document(path)?;
                names_from_value(document, path)
            }
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnDropSpec {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ColumnDropSpec::Names(iter.into_iter().map(Into::into).collect())
    }
}

/// Read a key-value document; `.json` files use JSON, everything else YAML
fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&text).map_err(|e| Error::parse(path, Some(e.line() as u64), e.to_string()))
    } else {
        serde_yaml::from_str(&text).map_err(|e| {
            let line = e.location().map(|l| l.line() as u64);
            Error::parse(path, line, e.to_string())
        })
    }
}

fn mapping_from_value(value: Value, path: &Path) -> Result<NameMap> {
    match value {
        Value::Null => Ok(NameMap::new()),
        Value::Mapping(entries) => entries
            .into_iter()
            .map(|(k, v)| {
                let key = scalar_to_string(k, path)?;
                let target = scalar_to_string(v, path)?;
                Ok((key, target))
            })
            .collect(),
        _ => Err(Error::invalid_argument(format!(
            "{} does not hold a column mapping",
            path.display()
        ))),
    }
}

fn names_from_value(value: Value, path: &Path) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| scalar_to_string(item, path))
            .collect(),
        Value::Mapping(entries) => entries
            .into_iter()
            .map(|(k, _)| scalar_to_string(k, path))
            .collect(),
        scalar => Ok(vec![scalar_to_string(scalar, path)?]),
    }
}

fn scalar_to_string(value: Value, path: &Path) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::invalid_argument(format!(
            "{}: expected a column name, found {other:?}",
            path.display()
        ))),
    }
}
