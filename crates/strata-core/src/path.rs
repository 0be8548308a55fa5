//! Dot-path handling: expanding registration keys and walking the tree.

use crate::error::{Error, Result};
use crate::node::{Container, Node};

/// Nests `node` under the dot-separated `key`.
///
/// `"a.b.c"` becomes `{a: {b: {c: node}}}`. With an empty key the node itself
/// must be a container and is returned as is.
pub fn expand(key: &str, node: Node) -> Result<Container> {
    if key.is_empty() {
        return match node {
            Node::Container(children) => Ok(children),
            other => Err(Error::InvalidRootType {
                found: other.kind_name(),
            }),
        };
    }

    let mut expanded = Container::new();
    match key.split_once('.') {
        None => {
            expanded.insert(key.to_string(), node);
        }
        Some((head, rest)) => {
            expanded.insert(head.to_string(), Node::Container(expand(rest, node)?));
        }
    }
    Ok(expanded)
}

/// Finds the node at `path`; the empty path is `root` itself.
///
/// A missing key is `Ok(None)`. Descending through a scalar is an error.
pub fn lookup<'a>(root: &'a Node, path: &str) -> Result<Option<&'a Node>> {
    if path.is_empty() {
        return Ok(Some(root));
    }

    let mut current = root;
    for segment in path.split('.') {
        let children = match current {
            Node::Container(children) => children,
            Node::Scalar(_) => {
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })
            }
        };
        match children.get(segment) {
            Some(child) => current = child,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Appends `segment` to a dot path.
pub fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Node {
        let mut c = Container::new();
        c.insert("x".to_string(), Node::from(1i32));
        let mut b = Container::new();
        b.insert("c".to_string(), Node::Container(c));
        let mut root = Container::new();
        root.insert("b".to_string(), Node::Container(b));
        root.insert("s".to_string(), Node::from("leaf"));
        Node::Container(root)
    }

    #[test]
    fn test_expand_nests_segments() {
        let expanded = expand("a.b.c", Node::from(1i32)).unwrap();
        let a = expanded.get("a").unwrap();
        let b = a.get("b").unwrap();
        assert_eq!(b.get("c"), Some(&Node::from(1i32)));
    }

    #[test]
    fn test_expand_single_segment() {
        let expanded = expand("k", Node::from("v")).unwrap();
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded.get("k"), Some(&Node::from("v")));
    }

    #[test]
    fn test_expand_empty_key_requires_container() {
        let root = expand("", Node::default()).unwrap();
        assert!(root.is_empty());

        match expand("", Node::from(3u8)) {
            Err(Error::InvalidRootType { found }) => assert_eq!(found, "scalar"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_lookup() {
        let root = tree();
        assert_eq!(lookup(&root, "").unwrap(), Some(&root));
        assert_eq!(lookup(&root, "b.c.x").unwrap(), Some(&Node::from(1i32)));
        assert_eq!(lookup(&root, "s").unwrap(), Some(&Node::from("leaf")));
        assert_eq!(lookup(&root, "b.missing.x").unwrap(), None);
    }

    #[test]
    fn test_lookup_through_scalar() {
        let root = tree();
        match lookup(&root, "s.deeper") {
            Err(Error::InvalidPath { path, segment }) => {
                assert_eq!(path, "s.deeper");
                assert_eq!(segment, "deeper");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a.b", "c"), "a.b.c");
    }
}
