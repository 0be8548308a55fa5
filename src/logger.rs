//! Logging initialisation via tracing-subscriber.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence; `level` is the fallback.
pub fn init(level: &str) -> Result<(), CliError> {
    parse_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| CliError::Logger(format!("invalid log level '{level}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::Logger(format!("failed to set subscriber: {e}")))
}

pub fn parse_level(level: &str) -> Result<LevelFilter, CliError> {
    if level.is_empty() {
        return Err(CliError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| CliError::Logger(format!("unrecognised log level: '{level}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_levels_parse() {
        for l in &["off", "error", "warn", "info", "debug", "trace"] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
    }

    #[test]
    fn test_invalid_level_errors() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
        assert!(init("loud").is_err());
    }
}
