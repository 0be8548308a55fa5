//! Generic configuration tree.
//!
//! Every source is built into a [`Node`] before it is merged. A node is either
//! a [`Scalar`] leaf or a container of named children; the variant of a node is
//! fixed for its lifetime.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Children of a container node.
pub type Container = BTreeMap<String, Node>;

/// A scalar leaf, kept in the exact kind the source produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Container(Container),
}

impl Default for Node {
    fn default() -> Self {
        Node::Container(Container::new())
    }
}

impl Node {
    /// Variant name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Container(_) => "container",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            Node::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Node::Container(c) => Some(c),
            Node::Scalar(_) => None,
        }
    }

    /// Child of a container node by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_container().and_then(|c| c.get(key))
    }
}

impl Scalar {
    /// Kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Bool(_) => "bool",
            Scalar::I8(_) => "i8",
            Scalar::I16(_) => "i16",
            Scalar::I32(_) => "i32",
            Scalar::I64(_) => "i64",
            Scalar::U8(_) => "u8",
            Scalar::U16(_) => "u16",
            Scalar::U32(_) => "u32",
            Scalar::U64(_) => "u64",
            Scalar::F32(_) => "f32",
            Scalar::F64(_) => "f64",
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Scalar::I8(v) => Some(i128::from(*v)),
            Scalar::I16(v) => Some(i128::from(*v)),
            Scalar::I32(v) => Some(i128::from(*v)),
            Scalar::I64(v) => Some(i128::from(*v)),
            Scalar::U8(v) => Some(i128::from(*v)),
            Scalar::U16(v) => Some(i128::from(*v)),
            Scalar::U32(v) => Some(i128::from(*v)),
            Scalar::U64(v) => Some(i128::from(*v)),
            Scalar::F32(v) => integral(f64::from(*v)),
            Scalar::F64(v) => integral(*v),
            Scalar::String(s) => s.trim().parse::<i128>().ok(),
            Scalar::Bool(_) => None,
        }
    }

    /// Converts to an integer kind; fails when out of range or not integral.
    pub fn to_int<T: TryFrom<i128>>(&self) -> Option<T> {
        self.as_i128().and_then(|v| T::try_from(v).ok())
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Scalar::F32(v) => Some(f64::from(*v)),
            Scalar::F64(v) => Some(*v),
            Scalar::String(s) => s.trim().parse::<f64>().ok(),
            Scalar::Bool(_) => None,
            other => other.as_i128().map(|v| v as f64),
        }
    }

    pub fn to_f32(&self) -> Option<f32> {
        match self {
            Scalar::F32(v) => Some(*v),
            Scalar::String(s) => s.trim().parse::<f32>().ok(),
            other => {
                let wide = other.to_f64()?;
                let narrow = wide as f32;
                (narrow.is_finite() || !wide.is_finite()).then_some(narrow)
            }
        }
    }

    /// Accepts booleans and the usual textual spellings of them.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::String(s) => match s.trim() {
                "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
                "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

fn integral(v: f64) -> Option<i128> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < 1e38).then_some(v as i128)
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::I8(v) => write!(f, "{v}"),
            Scalar::I16(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::U8(v) => write!(f, "{v}"),
            Scalar::U16(v) => write!(f, "{v}"),
            Scalar::U32(v) => write!(f, "{v}"),
            Scalar::U64(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v)
                }
            }

            impl From<$ty> for Node {
                fn from(v: $ty) -> Self {
                    Node::Scalar(Scalar::$variant(v))
                }
            }
        )*
    };
}

scalar_from! {
    String => String,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::Scalar(Scalar::String(v.to_string()))
    }
}

impl From<Scalar> for Node {
    fn from(v: Scalar) -> Self {
        Node::Scalar(v)
    }
}

impl From<Container> for Node {
    fn from(v: Container) -> Self {
        Node::Container(v)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::String(v) => serializer.serialize_str(v),
            Scalar::Bool(v) => serializer.serialize_bool(*v),
            Scalar::I8(v) => serializer.serialize_i8(*v),
            Scalar::I16(v) => serializer.serialize_i16(*v),
            Scalar::I32(v) => serializer.serialize_i32(*v),
            Scalar::I64(v) => serializer.serialize_i64(*v),
            Scalar::U8(v) => serializer.serialize_u8(*v),
            Scalar::U16(v) => serializer.serialize_u16(*v),
            Scalar::U32(v) => serializer.serialize_u32(*v),
            Scalar::U64(v) => serializer.serialize_u64(*v),
            Scalar::F32(v) => serializer.serialize_f32(*v),
            Scalar::F64(v) => serializer.serialize_f64(*v),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(s) => s.serialize(serializer),
            Node::Container(c) => serializer.collect_map(c),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

macro_rules! visit_scalar {
    ($($method:ident: $ty:ty => $variant:ident),* $(,)?) => {
        $(
            fn $method<E: de::Error>(self, v: $ty) -> Result<Node, E> {
                Ok(Node::Scalar(Scalar::$variant(v)))
            }
        )*
    };
}

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar or a string-keyed map")
    }

    visit_scalar! {
        visit_bool: bool => Bool,
        visit_i8: i8 => I8,
        visit_i16: i16 => I16,
        visit_i32: i32 => I32,
        visit_i64: i64 => I64,
        visit_u8: u8 => U8,
        visit_u16: u16 => U16,
        visit_u32: u32 => U32,
        visit_u64: u64 => U64,
        visit_f32: f32 => F32,
        visit_f64: f64 => F64,
        visit_string: String => String,
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::from(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Node, A::Error> {
        let mut children = Container::new();
        while let Some((key, value)) = access.next_entry::<String, Node>()? {
            children.insert(key, value);
        }
        Ok(Node::Container(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_container() {
        assert_eq!(Node::default(), Node::Container(Container::new()));
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(Scalar::from(300i64).to_int::<i16>(), Some(300));
        assert_eq!(Scalar::from(300i64).to_int::<u8>(), None);
        assert_eq!(Scalar::from(-1i32).to_int::<u32>(), None);
        assert_eq!(Scalar::from("1234").to_int::<i32>(), Some(1234));
        assert_eq!(Scalar::from(" 42 ").to_int::<u64>(), Some(42));
        assert_eq!(Scalar::from(2.0f64).to_int::<i64>(), Some(2));
        assert_eq!(Scalar::from(2.5f64).to_int::<i64>(), None);
        assert_eq!(Scalar::from(true).to_int::<i64>(), None);
        assert_eq!(Scalar::from("abc").to_int::<i64>(), None);
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(Scalar::from(3u8).to_f64(), Some(3.0));
        assert_eq!(Scalar::from("1.5").to_f64(), Some(1.5));
        assert_eq!(Scalar::from(1.5f64).to_f32(), Some(1.5));
        assert_eq!(Scalar::from(1e300f64).to_f32(), None);
        assert_eq!(Scalar::from(false).to_f64(), None);
    }

    #[test]
    fn test_bool_conversions() {
        assert_eq!(Scalar::from(true).to_bool(), Some(true));
        assert_eq!(Scalar::from("TRUE").to_bool(), Some(true));
        assert_eq!(Scalar::from("0").to_bool(), Some(false));
        assert_eq!(Scalar::from("yes").to_bool(), None);
        assert_eq!(Scalar::from(1i32).to_bool(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::from("x").to_string(), "x");
        assert_eq!(Scalar::from(12u16).to_string(), "12");
        assert_eq!(Scalar::from(false).to_string(), "false");
        assert_eq!(Scalar::from(2.0f64).to_string(), "2");
    }

    #[test]
    fn test_serde_json_interop() {
        let node: Node = serde_json::from_str(r#"{"a": {"b": 1, "c": "x"}, "d": true}"#).unwrap();
        assert_eq!(node.get("a").and_then(|a| a.get("b")), Some(&Node::from(1u64)));
        assert_eq!(node.get("d"), Some(&Node::from(true)));

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["a"]["c"], "x");
    }

    #[test]
    fn test_node_rejects_sequences() {
        assert!(serde_json::from_str::<Node>("[1, 2]").is_err());
    }
}
