//! Strata - layered configuration
//!
//! Merges constants, JSON, TOML and YAML files into one configuration tree and
//! reads typed values out of it, with environment variables overriding any
//! scalar at read time. The core lives in `strata-core`; ready-made sources
//! live in `strata-sources`. This crate adds the `strata` command-line tool.

pub mod error;
pub mod layers;
pub mod logger;

pub use strata_core::{
    add_late_binding_source, add_source, build, global, must_read, read, to_lower_camel, BoxError,
    Config, Container, Engine, Error, LateBindingSource, Node, Result, Scalar,
};
pub use strata_sources as sources;

pub use error::CliError;
pub use layers::{Assignment, FileLayer, Layers};

/// Registers `layers` on a fresh [`Config`] and renders the subtree at
/// `path` as pretty JSON.
pub fn inspect(layers: Layers, path: &str) -> std::result::Result<String, CliError> {
    let config = Config::new();
    layers.register(&config);
    let subtree: Node = config.get(path)?;
    Ok(serde_json::to_string_pretty(&subtree)?)
}
