//! Read cache keyed by path and destination type.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    path: String,
    type_id: TypeId,
}

impl CacheKey {
    pub(crate) fn of<T: 'static>(path: &str) -> Self {
        CacheKey {
            path: path.to_string(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Snapshots of fully populated destinations. `None` records an absent value.
#[derive(Debug, Default)]
pub(crate) struct ReadCache {
    entries: RwLock<HashMap<CacheKey, Option<Node>>>,
}

impl ReadCache {
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Option<Node>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Option<Node>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
