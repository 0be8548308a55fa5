//! Value builder: turns any `Serialize` input into a [`Node`].
//!
//! Scalars are copied in their exact kind, string-keyed maps keep their keys,
//! and record fields are stored under their lower-camel-case names.

use serde::ser::{self, Impossible, Serialize};

use crate::case::to_lower_camel;
use crate::error::{Error, Result};
use crate::node::{Container, Node, Scalar};

/// Builds `raw` into a node.
///
/// `None`, unit and `null` inputs fail with [`Error::NilInput`]. Inside maps
/// and records such values are left out of their container.
pub fn build<T: Serialize + ?Sized>(raw: &T) -> Result<Node> {
    snapshot(raw)?.ok_or(Error::NilInput)
}

/// Builds `value` into a node, returning `None` for an absent value.
pub fn snapshot<T: Serialize + ?Sized>(value: &T) -> Result<Option<Node>> {
    value.serialize(NodeSerializer)
}

fn unsupported<T>(kind: impl Into<String>) -> Result<T> {
    Err(Error::UnsupportedShape { kind: kind.into() })
}

fn scalar(v: impl Into<Scalar>) -> Result<Option<Node>> {
    Ok(Some(Node::Scalar(v.into())))
}

#[derive(Clone, Copy)]
struct NodeSerializer;

impl ser::Serializer for NodeSerializer {
    type Ok = Option<Node>;
    type Error = Error;

    type SerializeSeq = Impossible<Option<Node>, Error>;
    type SerializeTuple = Impossible<Option<Node>, Error>;
    type SerializeTupleStruct = Impossible<Option<Node>, Error>;
    type SerializeTupleVariant = Impossible<Option<Node>, Error>;
    type SerializeMap = MapBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = Impossible<Option<Node>, Error>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        scalar(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        scalar(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
        unsupported("bytes")
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Self::Ok> {
        unsupported(format!("unit struct {name}"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        scalar(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        unsupported(format!("enum variant {name}::{variant}"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        unsupported("sequence")
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        unsupported("tuple")
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        unsupported(format!("tuple struct {name}"))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        unsupported(format!("enum variant {name}::{variant}"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapBuilder {
            entries: Container::new(),
            key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(RecordBuilder {
            fields: Container::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        unsupported(format!("enum variant {name}::{variant}"))
    }
}

/// Collects string-keyed map entries; keys are kept verbatim.
struct MapBuilder {
    entries: Container,
    key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Option<Node>;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        match key.serialize(NodeSerializer)? {
            Some(Node::Scalar(Scalar::String(key))) => {
                self.key = Some(key);
                Ok(())
            }
            Some(Node::Scalar(other)) => unsupported(format!("map key of kind {}", other.kind_name())),
            Some(Node::Container(_)) => unsupported("map key of kind container"),
            None => unsupported("empty map key"),
        }
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::Custom("map value serialized before its key".to_string()))?;
        if let Some(node) = value.serialize(NodeSerializer)? {
            self.entries.insert(key, node);
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(Node::Container(self.entries)))
    }
}

/// Collects record fields under their lower-camel-case names.
struct RecordBuilder {
    fields: Container,
}

impl ser::SerializeStruct for RecordBuilder {
    type Ok = Option<Node>;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        if let Some(node) = value.serialize(NodeSerializer)? {
            self.fields.insert(to_lower_camel(key), node);
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(Some(Node::Container(self.fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize)]
    struct Simple {
        value1: String,
        value2: i32,
        value3: bool,
    }

    #[derive(Serialize)]
    struct Nested {
        display_name: String,
        limits: Limits,
        #[serde(skip)]
        #[allow(dead_code)]
        hidden: u8,
        comment: Option<String>,
    }

    #[derive(Serialize)]
    struct Limits {
        max_conns: u16,
        ratio: f32,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "snake_case")]
    enum Mode {
        Fast,
    }

    fn container(entries: &[(&str, Node)]) -> Node {
        Node::Container(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_scalars_keep_their_kind() {
        assert_eq!(build(&"a").unwrap(), Node::from("a"));
        assert_eq!(build(&7u8).unwrap(), Node::from(7u8));
        assert_eq!(build(&-7i16).unwrap(), Node::from(-7i16));
        assert_eq!(build(&1.5f32).unwrap(), Node::from(1.5f32));
        assert_eq!(build(&true).unwrap(), Node::from(true));
        assert_eq!(build(&'x').unwrap(), Node::from("x"));
    }

    #[test]
    fn test_record_fields_are_lower_camel() {
        let node = build(&Simple {
            value1: "a".to_string(),
            value2: 2,
            value3: true,
        })
        .unwrap();
        assert_eq!(
            node,
            container(&[
                ("value1", Node::from("a")),
                ("value2", Node::from(2i32)),
                ("value3", Node::from(true)),
            ])
        );
    }

    #[test]
    fn test_nested_record() {
        let node = build(&Nested {
            display_name: "svc".to_string(),
            limits: Limits {
                max_conns: 10,
                ratio: 0.5,
            },
            hidden: 1,
            comment: None,
        })
        .unwrap();
        assert_eq!(
            node,
            container(&[
                ("displayName", Node::from("svc")),
                (
                    "limits",
                    container(&[("maxConns", Node::from(10u16)), ("ratio", Node::from(0.5f32))]),
                ),
            ])
        );
    }

    #[test]
    fn test_map_keys_are_verbatim() {
        let mut map = BTreeMap::new();
        map.insert("snake_key".to_string(), 1i64);
        let node = build(&map).unwrap();
        assert_eq!(node, container(&[("snake_key", Node::from(1i64))]));
    }

    #[test]
    fn test_json_object() {
        let json = serde_json::json!({"a": {"b": "c"}, "n": 2});
        let node = build(&json).unwrap();
        assert_eq!(
            node,
            container(&[
                ("a", container(&[("b", Node::from("c"))])),
                ("n", Node::from(2u64)),
            ])
        );
    }

    #[test]
    fn test_option_is_transparent() {
        assert_eq!(build(&Some(3u32)).unwrap(), Node::from(3u32));
        assert_eq!(build(&Box::new("x")).unwrap(), Node::from("x"));
    }

    #[test]
    fn test_none_is_nil_input() {
        assert!(matches!(build(&None::<u32>), Err(Error::NilInput)));
        assert!(matches!(build(&()), Err(Error::NilInput)));
        assert!(matches!(snapshot(&None::<u32>), Ok(None)));
    }

    #[test]
    fn test_unit_variant_is_string() {
        assert_eq!(build(&Mode::Fast).unwrap(), Node::from("fast"));
    }

    #[test]
    fn test_unsupported_shapes() {
        match build(&vec![1, 2, 3]) {
            Err(Error::UnsupportedShape { kind }) => assert_eq!(kind, "sequence"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(build(&(1, 2)), Err(Error::UnsupportedShape { .. })));

        let mut bad_keys = HashMap::new();
        bad_keys.insert(1u32, "x");
        match build(&bad_keys) {
            Err(Error::UnsupportedShape { kind }) => assert!(kind.contains("u32")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
