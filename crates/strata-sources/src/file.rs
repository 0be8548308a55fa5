//! File-backed sources.
//!
//! The file is read again on every rebuild, so edits show up after the next
//! registration marks the tree dirty. Every format must hold a document of
//! keyed values at the top level.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use serde_yaml::Mapping;
use strata_core::BoxError;
use tracing::debug;

use crate::error::SourceError;

/// A source reading a JSON object from `path`, registered under `prefix`.
pub fn json_file(
    path: impl Into<PathBuf>,
    prefix: impl Into<String>,
) -> impl Fn() -> Result<(String, Map<String, Value>), BoxError> + Send + Sync + 'static {
    let path = path.into();
    let prefix = prefix.into();
    move || Ok((prefix.clone(), load_json(&path)?))
}

/// A source reading a TOML document from `path`, registered under `prefix`.
pub fn toml_file(
    path: impl Into<PathBuf>,
    prefix: impl Into<String>,
) -> impl Fn() -> Result<(String, toml::Table), BoxError> + Send + Sync + 'static {
    let path = path.into();
    let prefix = prefix.into();
    move || Ok((prefix.clone(), load_toml(&path)?))
}

/// A source reading a YAML mapping from `path`, registered under `prefix`.
pub fn yaml_file(
    path: impl Into<PathBuf>,
    prefix: impl Into<String>,
) -> impl Fn() -> Result<(String, Mapping), BoxError> + Send + Sync + 'static {
    let path = path.into();
    let prefix = prefix.into();
    move || Ok((prefix.clone(), load_yaml(&path)?))
}

fn read(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_json(path: &Path) -> Result<Map<String, Value>, SourceError> {
    let contents = read(path)?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded JSON layer");
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SourceError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

pub fn load_toml(path: &Path) -> Result<toml::Table, SourceError> {
    let contents = read(path)?;
    let mut table: toml::Table = toml::from_str(&contents).map_err(|source| SourceError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), keys = table.len(), "loaded TOML layer");
    table.iter_mut().for_each(|(_, v)| datetimes_to_strings(v));
    Ok(table)
}

/// Datetimes have no scalar counterpart and are kept in their TOML spelling.
fn datetimes_to_strings(value: &mut toml::Value) {
    match value {
        toml::Value::Datetime(dt) => {
            let text = dt.to_string();
            *value = toml::Value::String(text);
        }
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| datetimes_to_strings(v)),
        toml::Value::Array(items) => items.iter_mut().for_each(datetimes_to_strings),
        _ => {}
    }
}

pub fn load_yaml(path: &Path) -> Result<Mapping, SourceError> {
    let contents = read(path)?;
    let value: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(|source| SourceError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded YAML layer");
    match value {
        serde_yaml::Value::Mapping(mapping) => Ok(mapping),
        _ => Err(SourceError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}
