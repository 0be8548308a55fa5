//! Merge logic
//!
//! Folds one source's container into the accumulated root:
//! - Containers: deep-merge by key
//! - Scalars: override (last wins)
//! - Scalar against container, either way: conflict

use crate::error::{Error, Result};
use crate::node::{Container, Node};
use crate::path::join;

/// Merge `incoming` into `existing` and return the result.
///
/// Keys only in `incoming` are inserted verbatim; scalars present on both
/// sides take the incoming value.
pub fn merge(existing: Container, incoming: Container) -> Result<Container> {
    merge_at("", existing, incoming)
}

fn merge_at(prefix: &str, mut existing: Container, incoming: Container) -> Result<Container> {
    for (key, incoming_value) in incoming {
        let merged = match existing.remove(&key) {
            None => incoming_value,
            Some(existing_value) => merge_values(&join(prefix, &key), existing_value, incoming_value)?,
        };
        existing.insert(key, merged);
    }
    Ok(existing)
}

fn merge_values(key: &str, existing: Node, incoming: Node) -> Result<Node> {
    match (existing, incoming) {
        (Node::Container(base), Node::Container(overlay)) => {
            Ok(Node::Container(merge_at(key, base, overlay)?))
        }
        (Node::Scalar(_), overlay @ Node::Scalar(_)) => Ok(overlay),
        (existing, incoming) => Err(Error::TypeConflict {
            key: key.to_string(),
            existing: existing.kind_name(),
            incoming: incoming.kind_name(),
        }),
    }
}

/// Merge layers in order (first is base, last has highest precedence).
///
/// Layers are pulled lazily, so a failing layer stops the fold before any
/// later layer is produced.
pub fn merge_layers(layers: impl IntoIterator<Item = Result<Container>>) -> Result<Container> {
    layers
        .into_iter()
        .try_fold(Container::new(), |root, layer| merge(root, layer?))
}
