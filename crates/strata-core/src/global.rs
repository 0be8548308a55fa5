//! Process-wide configuration instance.

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{BoxError, Result};
use crate::node::Scalar;

static GLOBAL: OnceLock<Config> = OnceLock::new();

/// The shared [`Config`], created empty on first use.
pub fn global() -> &'static Config {
    GLOBAL.get_or_init(Config::new)
}

/// [`Config::add_source`] on the global instance.
pub fn add_source<F, K, V>(source: F)
where
    F: Fn() -> std::result::Result<(K, V), BoxError> + Send + Sync + 'static,
    K: Into<String>,
    V: Serialize,
{
    global().add_source(source)
}

/// [`Config::add_late_binding_source`] on the global instance.
pub fn add_late_binding_source<F>(source: F)
where
    F: Fn(&str) -> std::result::Result<Option<Scalar>, BoxError> + Send + Sync + 'static,
{
    global().add_late_binding_source(source)
}

/// [`Config::read`] on the global instance.
pub fn read<T>(path: &str, dest: &mut T) -> Result<()>
where
    T: Serialize + DeserializeOwned + 'static,
{
    global().read(path, dest)
}

/// [`Config::must_read`] on the global instance.
pub fn must_read<T>(path: &str, dest: &mut T)
where
    T: Serialize + DeserializeOwned + 'static,
{
    global().must_read(path, dest)
}
