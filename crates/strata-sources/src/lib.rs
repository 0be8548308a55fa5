//! Strata Sources
//!
//! Ready-made layers for a [`strata_core::Config`]: constants, JSON, TOML and
//! YAML files, and an environment-variable late-binding source.

pub mod constant;
pub mod env;
pub mod error;
pub mod file;

pub use constant::constant;
pub use env::{env, env_var_name};
pub use error::SourceError;
pub use file::{json_file, toml_file, yaml_file};
