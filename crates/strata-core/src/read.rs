//! Populating destinations from the merged tree.
//!
//! A [`Slot`] is a `serde::Deserializer` over three inputs at one dot path:
//! the tree node (if the path exists), the destination's current contents and
//! the late-binding sources. Scalar leaves take the tree value, are overridden
//! by late-binding hits and fall back to the current value; the result is
//! coerced to whatever kind the destination asks for.

use std::sync::Arc;
use std::vec;

use serde::de::value::StringDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, Visitor};

use crate::case::to_lower_camel;
use crate::error::{Error, Result};
use crate::node::{Container, Node, Scalar};
use crate::path::join;
use crate::source::{late_bound, LateBindingSource};

/// Populates a fresh `T` from `tree`, `current` and the late-binding sources.
pub(crate) fn populate<T: DeserializeOwned>(
    path: &str,
    tree: Option<&Node>,
    current: Option<&Node>,
    overrides: &[Arc<LateBindingSource>],
) -> Result<T> {
    T::deserialize(Slot {
        path: path.to_string(),
        tree,
        current,
        overrides,
        late_binding: true,
    })
}

/// Rebuilds a `T` from a snapshot taken after an earlier read. A `None`
/// snapshot replays as an absent value.
pub(crate) fn replay<T: DeserializeOwned>(path: &str, snapshot: Option<&Node>) -> Result<T> {
    T::deserialize(Slot {
        path: path.to_string(),
        tree: snapshot,
        current: None,
        overrides: &[],
        late_binding: false,
    })
}

struct Slot<'a> {
    path: String,
    tree: Option<&'a Node>,
    current: Option<&'a Node>,
    overrides: &'a [Arc<LateBindingSource>],
    late_binding: bool,
}

impl<'a> Slot<'a> {
    fn child(&self, segment: &str, tree: Option<&'a Node>, current: Option<&'a Node>, late_binding: bool) -> Self {
        Slot {
            path: join(&self.path, segment),
            tree,
            current,
            overrides: self.overrides,
            late_binding,
        }
    }

    fn late_bound(&self) -> Result<Option<Scalar>> {
        if self.late_binding {
            late_bound(self.overrides, &self.path)
        } else {
            Ok(None)
        }
    }

    /// Candidate value for a scalar destination of kind `to`.
    fn leaf(&self, to: &'static str) -> Result<Option<Scalar>> {
        if let Some(hit) = self.late_bound()? {
            return Ok(Some(hit));
        }
        match self.tree {
            Some(Node::Scalar(stored)) => Ok(Some(stored.clone())),
            Some(Node::Container(_)) => Err(Error::ConversionFailure {
                path: self.path.clone(),
                from: "container".to_string(),
                to,
            }),
            None => Ok(self.current.and_then(Node::as_scalar).cloned()),
        }
    }

    fn coerce<T>(&self, to: &'static str, convert: impl FnOnce(&Scalar) -> Option<T>) -> Result<Option<T>> {
        match self.leaf(to)? {
            None => Ok(None),
            Some(value) => match convert(&value) {
                Some(converted) => Ok(Some(converted)),
                None => Err(Error::ConversionFailure {
                    path: self.path.clone(),
                    from: format!("{} `{}`", value.kind_name(), value),
                    to,
                }),
            },
        }
    }

    fn containers(&self) -> (Option<&'a Container>, Option<&'a Container>) {
        (
            self.tree.and_then(Node::as_container),
            self.current.and_then(Node::as_container),
        )
    }

    /// Map destinations: every tree entry, then existing entries the tree lacks.
    fn map_entries(&self) -> Vec<(String, Slot<'a>)> {
        let (tree, current) = self.containers();
        let mut entries = Vec::new();
        if let Some(tree) = tree {
            for (key, node) in tree {
                let existing = current.and_then(|c| c.get(key));
                let slot = self.child(&to_lower_camel(key), Some(node), existing, self.late_binding);
                entries.push((key.clone(), slot));
            }
        }
        if let Some(current) = current {
            for (key, node) in current {
                if tree.map_or(true, |t| !t.contains_key(key)) {
                    let slot = self.child(&to_lower_camel(key), None, Some(node), false);
                    entries.push((key.clone(), slot));
                }
            }
        }
        entries
    }

    /// Record destinations: every field, looked up by its lower-camel name.
    fn record_fields(&self, fields: &'static [&'static str]) -> Vec<(&'static str, Slot<'a>)> {
        let (tree, current) = self.containers();
        fields
            .iter()
            .map(|field| {
                let key = to_lower_camel(field);
                let slot = self.child(
                    &key,
                    tree.and_then(|t| t.get(&key)),
                    current.and_then(|c| c.get(&key)),
                    self.late_binding,
                );
                (*field, slot)
            })
            .collect()
    }

    /// Nothing stored here: no tree node and an empty current container.
    fn is_vacant(&self) -> bool {
        let empty = match self.current {
            None => true,
            Some(Node::Container(entries)) => entries.is_empty(),
            Some(Node::Scalar(_)) => false,
        };
        self.tree.is_none() && empty
    }

    fn is_container(&self) -> bool {
        match self.tree {
            Some(node) => node.as_container().is_some(),
            None => self.current.and_then(Node::as_container).is_some(),
        }
    }

    fn unsupported<T>(&self, kind: &str) -> Result<T> {
        Err(Error::UnsupportedDestination {
            path: self.path.clone(),
            kind: kind.to_string(),
        })
    }
}

fn visit_scalar<'de, V: Visitor<'de>>(value: Scalar, visitor: V) -> Result<V::Value> {
    match value {
        Scalar::String(v) => visitor.visit_string(v),
        Scalar::Bool(v) => visitor.visit_bool(v),
        Scalar::I8(v) => visitor.visit_i8(v),
        Scalar::I16(v) => visitor.visit_i16(v),
        Scalar::I32(v) => visitor.visit_i32(v),
        Scalar::I64(v) => visitor.visit_i64(v),
        Scalar::U8(v) => visitor.visit_u8(v),
        Scalar::U16(v) => visitor.visit_u16(v),
        Scalar::U32(v) => visitor.visit_u32(v),
        Scalar::U64(v) => visitor.visit_u64(v),
        Scalar::F32(v) => visitor.visit_f32(v),
        Scalar::F64(v) => visitor.visit_f64(v),
    }
}

fn single_char(value: &Scalar) -> Option<char> {
    let text = value.to_string();
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                let value = self.coerce(stringify!($ty), |s| s.to_int::<$ty>())?;
                visitor.$visit(value.unwrap_or_default())
            }
        )*
    };
}

impl<'de, 'a> de::Deserializer<'de> for Slot<'a> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.is_vacant() {
            return match self.late_bound()? {
                Some(value) => visit_scalar(value, visitor),
                None => visitor.visit_unit(),
            };
        }
        if self.is_container() {
            return self.deserialize_map(visitor);
        }
        match self.leaf("any")? {
            Some(value) => visit_scalar(value, visitor),
            None => visitor.visit_unit(),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = self.coerce("bool", Scalar::to_bool)?;
        visitor.visit_bool(value.unwrap_or_default())
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = self.coerce("f32", Scalar::to_f32)?;
        visitor.visit_f32(value.unwrap_or_default())
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = self.coerce("f64", Scalar::to_f64)?;
        visitor.visit_f64(value.unwrap_or_default())
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = self.coerce("char", single_char)?;
        visitor.visit_char(value.unwrap_or_default())
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let value = self.coerce("string", |s| Some(s.to_string()))?;
        visitor.visit_string(value.unwrap_or_default())
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        self.unsupported("bytes")
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        self.unsupported("bytes")
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.tree.is_some() || self.current.is_some() || self.late_bound()?.is_some() {
            visitor.visit_some(self)
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        self.unsupported("sequence")
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value> {
        self.unsupported("tuple")
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value> {
        self.unsupported(&format!("tuple struct {name}"))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_map(Entries::new(self.map_entries()))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_map(Entries::new(self.record_fields(fields)))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.coerce("enum", |s| Some(s.to_string()))? {
            Some(variant) => {
                let variant: StringDeserializer<Error> = variant.into_deserializer();
                visitor.visit_enum(variant)
            }
            None => Err(Error::ConversionFailure {
                path: self.path,
                from: "nothing".to_string(),
                to: name,
            }),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

struct Entries<'a, K> {
    iter: vec::IntoIter<(K, Slot<'a>)>,
    pending: Option<Slot<'a>>,
}

impl<'a, K> Entries<'a, K> {
    fn new(entries: Vec<(K, Slot<'a>)>) -> Self {
        Entries {
            iter: entries.into_iter(),
            pending: None,
        }
    }
}

impl<'de, 'a, K> MapAccess<'de> for Entries<'a, K>
where
    K: IntoDeserializer<'de, Error>,
{
    type Error = Error;

    fn next_key_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<Option<S::Value>> {
        match self.iter.next() {
            Some((key, slot)) => {
                self.pending = Some(slot);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<S::Value> {
        let slot = self
            .pending
            .take()
            .ok_or_else(|| Error::Custom("map value requested before its key".to_string()))?;
        seed.deserialize(slot)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}
