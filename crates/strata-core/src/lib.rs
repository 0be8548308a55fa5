//! Strata Core
//!
//! A layered configuration tree. Sources are registered in precedence order,
//! each producing a value under a dot key; values are built into a generic
//! [`Node`] tree and deep-merged, later sources winning. Reads walk a dot path
//! and populate any `serde` destination, with late-binding sources consulted
//! for every scalar leaf at read time.
//!
//! [`Engine`] is the uncached core; [`Config`] puts a per-path, per-type read
//! cache in front of it. A process-wide [`Config`] is available through
//! [`global`] and the free functions of the same names.

mod cache;
mod read;
mod source;

pub mod build;
pub mod case;
pub mod config;
pub mod engine;
pub mod error;
pub mod global;
pub mod merge;
pub mod node;
pub mod path;

pub use build::build;
pub use case::to_lower_camel;
pub use config::Config;
pub use engine::Engine;
pub use error::{BoxError, Error, Result};
pub use global::{add_late_binding_source, add_source, global, must_read, read};
pub use node::{Container, Node, Scalar};
pub use source::LateBindingSource;
