//! Layers given on the command line.
//!
//! Layers are registered in a fixed order: JSON files, TOML files, YAML
//! files, `--set` assignments, and the environment as a late-binding source on top.

use std::path::PathBuf;
use std::str::FromStr;

use strata_core::Config;
use strata_sources::{constant, env, json_file, toml_file, yaml_file};
use tracing::info;

use crate::error::CliError;

/// A file layer, written `FILE` or `FILE@PREFIX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLayer {
    pub path: PathBuf,
    pub prefix: String,
}

impl FromStr for FileLayer {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, prefix) = match s.rsplit_once('@') {
            Some((path, prefix)) => (path, prefix),
            None => (s, ""),
        };
        if path.is_empty() {
            return Err(CliError::Layer {
                arg: s.to_string(),
                reason: "missing file path",
            });
        }
        Ok(FileLayer {
            path: PathBuf::from(path),
            prefix: prefix.to_string(),
        })
    }
}

/// A constant layer, written `KEY=VALUE`. The value is stored as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Assignment {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(CliError::Layer {
                arg: s.to_string(),
                reason: "expected KEY=VALUE",
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layers {
    pub json: Vec<FileLayer>,
    pub toml: Vec<FileLayer>,
    pub yaml: Vec<FileLayer>,
    pub set: Vec<Assignment>,
    pub env: Option<String>,
}

impl Layers {
    /// Registers every layer on `config`, lowest precedence first.
    pub fn register(self, config: &Config) {
        for layer in self.json {
            info!(path = %layer.path.display(), prefix = %layer.prefix, "JSON layer");
            config.add_source(json_file(layer.path, layer.prefix));
        }
        for layer in self.toml {
            info!(path = %layer.path.display(), prefix = %layer.prefix, "TOML layer");
            config.add_source(toml_file(layer.path, layer.prefix));
        }
        for layer in self.yaml {
            info!(path = %layer.path.display(), prefix = %layer.prefix, "YAML layer");
            config.add_source(yaml_file(layer.path, layer.prefix));
        }
        for assignment in self.set {
            info!(key = %assignment.key, "constant layer");
            config.add_source(constant(assignment.key, assignment.value));
        }
        if let Some(prefix) = self.env {
            info!(prefix = %prefix, "environment overrides");
            config.add_late_binding_source(env(prefix));
        }
    }
}
