//! CLI error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid layer `{arg}`: {reason}")]
    Layer { arg: String, reason: &'static str },

    #[error("logger: {0}")]
    Logger(String),

    #[error(transparent)]
    Config(#[from] strata_core::Error),

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}
