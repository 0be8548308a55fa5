//! Environment-variable overrides.
//!
//! `db.maxConns` with prefix `APP` reads `APP_DB_MAX_CONNS`.

use std::sync::OnceLock;

use regex_lite::Regex;
use strata_core::{BoxError, Scalar};
use tracing::trace;

fn first_cap() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap())
}

fn all_cap() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap())
}

/// Translates a dot path into the environment variable consulted for it.
pub fn env_var_name(prefix: &str, path: &str) -> String {
    let snake = first_cap().replace_all(path, "${1}_${2}");
    let snake = all_cap().replace_all(&snake, "${1}_${2}");
    let name = snake.replace('.', "_").to_uppercase();
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}_{name}")
    }
}

/// A late-binding source backed by the process environment.
///
/// Unset and empty variables are treated as absent; anything else is
/// returned as a string scalar and coerced at read time.
pub fn env(
    prefix: impl Into<String>,
) -> impl Fn(&str) -> Result<Option<Scalar>, BoxError> + Send + Sync + 'static {
    let prefix = prefix.into();
    move |path: &str| {
        let name = env_var_name(&prefix, path);
        match std::env::var(&name) {
            Ok(value) if !value.is_empty() => {
                trace!(variable = %name, path, "environment override");
                Ok(Some(Scalar::String(value)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use strata_core::Config;

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("", "a"), "A");
        assert_eq!(env_var_name("", "dummy.value1"), "DUMMY_VALUE1");
        assert_eq!(env_var_name("APP", "db.maxConns"), "APP_DB_MAX_CONNS");
        assert_eq!(env_var_name("APP", "httpServer.listenAddr"), "APP_HTTP_SERVER_LISTEN_ADDR");
        assert_eq!(env_var_name("X", "oauthURL"), "X_OAUTH_URL");
        assert_eq!(env_var_name("X", "a.b.c"), "X_A_B_C");
    }

    #[test]
    fn test_unset_and_empty_are_absent() {
        std::env::set_var("STRATA_ENV_TEST_EMPTY", "");
        let source = env("STRATA_ENV_TEST");
        assert_eq!(source("empty").unwrap(), None);
        assert_eq!(source("neverSet").unwrap(), None);
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Dummy {
        value1: String,
        value2: i32,
        value3: bool,
    }

    #[test]
    fn test_env_only_record() {
        std::env::set_var("STRATA_ENV_DUMMY_DUMMY_VALUE1", "a");
        std::env::set_var("STRATA_ENV_DUMMY_DUMMY_VALUE2", "2");
        std::env::set_var("STRATA_ENV_DUMMY_DUMMY_VALUE3", "true");

        let config = Config::new();
        config.add_late_binding_source(env("STRATA_ENV_DUMMY"));

        let mut dummy = Dummy::default();
        config.read("dummy", &mut dummy).unwrap();
        assert_eq!(
            dummy,
            Dummy {
                value1: "a".to_string(),
                value2: 2,
                value3: true,
            }
        );
    }

    #[test]
    fn test_env_overrides_file_value() {
        std::env::set_var("STRATA_ENV_OVERRIDE_SERVER_PORT", "9090");
        let config = Config::new();
        config.add_source(|| Ok(("server.port", 80u16)));
        config.add_late_binding_source(env("STRATA_ENV_OVERRIDE"));
        assert_eq!(config.get::<u16>("server.port").unwrap(), 9090);
    }
}
