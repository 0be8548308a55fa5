//! Cached configuration facade.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::build::snapshot;
use crate::cache::{CacheKey, ReadCache};
use crate::engine::Engine;
use crate::error::{BoxError, Result};
use crate::node::{Node, Scalar};
use crate::read::replay;

/// Layered configuration with a read cache in front of an [`Engine`].
///
/// A successful read stores a snapshot of the populated destination under
/// its path and type; later reads of the same pair replay the snapshot
/// without touching the tree or the late-binding sources. Registering any
/// source discards every cached entry.
#[derive(Debug, Default)]
pub struct Config {
    engine: Engine,
    cache: ReadCache,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source<F, K, V>(&self, source: F)
    where
        F: Fn() -> std::result::Result<(K, V), BoxError> + Send + Sync + 'static,
        K: Into<String>,
        V: Serialize,
    {
        let mut cache = self.cache.write();
        self.engine.add_source(source);
        cache.clear();
    }

    pub fn add_late_binding_source<F>(&self, source: F)
    where
        F: Fn(&str) -> std::result::Result<Option<Scalar>, BoxError> + Send + Sync + 'static,
    {
        let mut cache = self.cache.write();
        self.engine.add_late_binding_source(source);
        cache.clear();
    }

    /// Populates `dest` from the subtree at `path`.
    ///
    /// The first read for a given path and type decides the cached result:
    /// later reads return it regardless of what `dest` held beforehand.
    pub fn read<T>(&self, path: &str, dest: &mut T) -> Result<()>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let key = CacheKey::of::<T>(path);
        {
            let cache = self.cache.read();
            if let Some(cached) = cache.get(&key) {
                trace!(path, "configuration cache hit");
                *dest = replay(path, cached.as_ref())?;
                return Ok(());
            }
        }

        let mut cache = self.cache.write();
        if let Some(cached) = cache.get(&key) {
            *dest = replay(path, cached.as_ref())?;
            return Ok(());
        }
        trace!(path, "configuration cache miss");
        self.engine.read(path, dest)?;
        let populated = snapshot(&*dest).map_err(|err| err.into_destination(path))?;
        cache.insert(key, populated);
        Ok(())
    }

    /// Like [`Config::read`], but panics on error.
    pub fn must_read<T>(&self, path: &str, dest: &mut T)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        if let Err(err) = self.read(path, dest) {
            panic!("failed to read configuration at `{path}`: {err}");
        }
    }

    /// Reads the subtree at `path` into a fresh `T::default()`.
    pub fn get<T>(&self, path: &str) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default + 'static,
    {
        let mut value = T::default();
        self.read(path, &mut value)?;
        Ok(value)
    }

    /// The merged tree, bypassing the read cache.
    pub fn tree(&self) -> Result<Arc<Node>> {
        self.engine.tree()
    }
}
