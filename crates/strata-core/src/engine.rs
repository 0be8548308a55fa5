//! The uncached configuration engine.
//!
//! Sources are registered in precedence order and merged lazily: registering
//! marks the tree dirty, and the next read rebuilds it from every source. A
//! failed rebuild keeps the previous tree and leaves the engine dirty.

use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::build::snapshot;
use crate::error::{BoxError, Result};
use crate::merge::merge_layers;
use crate::node::{Node, Scalar};
use crate::path::lookup;
use crate::read::populate;
use crate::source::{erase, share, ErasedSource, LateBindingSource};

struct State {
    sources: Vec<ErasedSource>,
    late_binding: Vec<Arc<LateBindingSource>>,
    dirty: bool,
    root: Arc<Node>,
}

/// Layered configuration without read caching.
pub struct Engine {
    state: RwLock<State>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            state: RwLock::new(State {
                sources: Vec::new(),
                late_binding: Vec::new(),
                dirty: false,
                root: Arc::new(Node::default()),
            }),
        }
    }

    /// Registers a source with higher precedence than every earlier one.
    ///
    /// The source returns a dot key and a raw value; the value is built into
    /// a node and nested under the key. An empty key places the value at the
    /// root, which then must be a container.
    pub fn add_source<F, K, V>(&self, source: F)
    where
        F: Fn() -> std::result::Result<(K, V), BoxError> + Send + Sync + 'static,
        K: Into<String>,
        V: Serialize,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.sources.push(erase(source));
        state.dirty = true;
        debug!(sources = state.sources.len(), "source registered");
    }

    /// Registers a read-time override; later registrations win.
    pub fn add_late_binding_source<F>(&self, source: F)
    where
        F: Fn(&str) -> std::result::Result<Option<Scalar>, BoxError> + Send + Sync + 'static,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.late_binding.push(share(source));
        debug!(late_binding = state.late_binding.len(), "late-binding source registered");
    }

    /// Populates `dest` from the subtree at `path`.
    ///
    /// Fields the tree does not mention keep their current value. On error
    /// `dest` is left untouched.
    pub fn read<T>(&self, path: &str, dest: &mut T) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let (root, overrides) = self.clean()?;
        let tree = lookup(&root, path)?;
        let current = snapshot(&*dest).map_err(|err| err.into_destination(path))?;
        *dest = populate(path, tree, current.as_ref(), &overrides)?;
        Ok(())
    }

    /// Like [`Engine::read`], but panics on error.
    pub fn must_read<T>(&self, path: &str, dest: &mut T)
    where
        T: Serialize + DeserializeOwned,
    {
        if let Err(err) = self.read(path, dest) {
            panic!("failed to read configuration at `{path}`: {err}");
        }
    }

    /// Reads the subtree at `path` into a fresh `T::default()`.
    pub fn get<T>(&self, path: &str) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut value = T::default();
        self.read(path, &mut value)?;
        Ok(value)
    }

    /// Returns the current merged tree, rebuilding it first if needed.
    pub fn tree(&self) -> Result<Arc<Node>> {
        self.clean().map(|(root, _)| root)
    }

    fn clean(&self) -> Result<(Arc<Node>, Vec<Arc<LateBindingSource>>)> {
        loop {
            {
                let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
                if !state.dirty {
                    return Ok((Arc::clone(&state.root), state.late_binding.clone()));
                }
            }
            self.rebuild()?;
        }
    }

    fn rebuild(&self) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.dirty {
            return Ok(());
        }
        let merged = merge_layers(state.sources.iter().map(|source| source()));
        match merged {
            Ok(root) => {
                debug!(sources = state.sources.len(), keys = root.len(), "configuration tree rebuilt");
                state.root = Arc::new(Node::Container(root));
                state.dirty = false;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "configuration rebuild failed; keeping previous tree");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Engine")
            .field("sources", &state.sources.len())
            .field("late_binding", &state.late_binding.len())
            .field("dirty", &state.dirty)
            .finish()
    }
}
