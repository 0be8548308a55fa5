//! Source callback contracts.

use std::sync::Arc;

use serde::Serialize;

use crate::build::build;
use crate::error::{BoxError, Error, Result};
use crate::node::{Container, Scalar};
use crate::path::expand;

/// Read-time override: maps a fully-qualified dot path to an optional scalar.
pub type LateBindingSource = dyn Fn(&str) -> std::result::Result<Option<Scalar>, BoxError> + Send + Sync;

/// A registered source, already wired to the value builder and key expansion.
pub(crate) type ErasedSource = Box<dyn Fn() -> Result<Container> + Send + Sync>;

pub(crate) fn erase<F, K, V>(source: F) -> ErasedSource
where
    F: Fn() -> std::result::Result<(K, V), BoxError> + Send + Sync + 'static,
    K: Into<String>,
    V: Serialize,
{
    Box::new(move || {
        let (key, raw) = source().map_err(Error::Source)?;
        let key = key.into();
        expand(&key, build(&raw)?)
    })
}

pub(crate) fn share<F>(source: F) -> Arc<LateBindingSource>
where
    F: Fn(&str) -> std::result::Result<Option<Scalar>, BoxError> + Send + Sync + 'static,
{
    Arc::new(source)
}

/// Queries late-binding sources in registration order; the last hit wins.
pub(crate) fn late_bound(sources: &[Arc<LateBindingSource>], path: &str) -> Result<Option<Scalar>> {
    let mut candidate = None;
    for source in sources {
        let hit = source(path).map_err(|cause| Error::LateBinding {
            path: path.to_string(),
            cause,
        })?;
        if hit.is_some() {
            candidate = hit;
        }
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_erased_source_expands_key() {
        let source = erase(|| Ok(("a.b", 3i32)));
        let root = source().unwrap();
        assert_eq!(root["a"].get("b"), Some(&Node::from(3i32)));
    }

    #[test]
    fn test_erased_source_error_is_verbatim() {
        let source = erase(|| -> std::result::Result<(&str, i32), BoxError> { Err("no such file".into()) });
        let err = source().unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        assert_eq!(err.to_string(), "no such file");
    }

    #[test]
    fn test_late_bound_last_hit_wins() {
        let sources = vec![
            share(|path: &str| Ok((path == "a").then(|| Scalar::from("first")))),
            share(|_: &str| Ok(None)),
            share(|path: &str| Ok((path == "a").then(|| Scalar::from("second")))),
        ];
        assert_eq!(late_bound(&sources, "a").unwrap(), Some(Scalar::from("second")));
        assert_eq!(late_bound(&sources, "b").unwrap(), None);
    }

    #[test]
    fn test_late_bound_error_names_path() {
        let sources = vec![share(|_: &str| Err("lookup failed".into()))];
        match late_bound(&sources, "x.y") {
            Err(Error::LateBinding { path, cause }) => {
                assert_eq!(path, "x.y");
                assert_eq!(cause.to_string(), "lookup failed");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
