//! Error taxonomy for building, merging and reading the configuration tree.

use std::fmt::Display;

use thiserror::Error;

/// Error type returned by source callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from configuration operations.
///
/// Every operation stops at the first error; nothing is accumulated.
#[derive(Debug, Error)]
pub enum Error {
    /// The value builder met a shape it cannot represent.
    #[error("unsupported input shape: {kind}")]
    UnsupportedShape { kind: String },

    /// A `None`, unit or `null` value was handed to the value builder.
    #[error("nil input")]
    NilInput,

    /// A source registered under the empty key did not build to a container.
    #[error("invalid root type: a root source must build to a container, got {found}")]
    InvalidRootType { found: &'static str },

    /// Merging would replace a scalar with a container or the reverse.
    #[error("type conflict at `{key}`: cannot merge {incoming} into existing {existing}")]
    TypeConflict {
        key: String,
        existing: &'static str,
        incoming: &'static str,
    },

    /// A value could not be coerced into the destination's scalar kind.
    #[error("cannot convert value at `{path}` from {from} to {to}")]
    ConversionFailure {
        path: String,
        from: String,
        to: &'static str,
    },

    /// The destination has a shape reads cannot populate.
    #[error("unsupported destination at `{path}`: {kind}")]
    UnsupportedDestination { path: String, kind: String },

    /// A read path descends through a scalar.
    #[error("invalid path `{path}`: `{segment}` is not a container")]
    InvalidPath { path: String, segment: String },

    /// A source callback failed.
    #[error("{0}")]
    Source(BoxError),

    /// A late-binding source failed while resolving `path`.
    #[error("late-binding lookup for `{path}` failed: {cause}")]
    LateBinding { path: String, cause: BoxError },

    /// Message raised through serde.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Rewrites builder shape errors raised while snapshotting a destination.
    pub(crate) fn into_destination(self, path: &str) -> Self {
        match self {
            Error::UnsupportedShape { kind } => Error::UnsupportedDestination {
                path: path.to_string(),
                kind,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}
