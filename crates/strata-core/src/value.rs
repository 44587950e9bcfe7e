//! Attribute values
//!
//! A [`Value`] is either plain structural data (the shapes JSON can express)
//! or a live handle: a [`Node`], a [`Group`], or an opaque host value. Live
//! handles are shared, so cloning a value never deep-copies a sub-tree and
//! equality on handles is identity.

use crate::error::{Error, Result};
use crate::group::GroupRef;
use crate::node::NodeRef;
use crate::options::Options;
use indexmap::IndexMap;
use serde_json::Number;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Flat attribute mapping of a node, in insertion order.
pub type Attributes = IndexMap<String, Value>;

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Attributes),
    /// A live node instance
    Node(NodeRef),
    /// A live group instance
    Group(GroupRef),
    /// Host value the engine never inspects
    Opaque(Rc<dyn Any>),
}

impl Value {
    /// Wraps an arbitrary host value.
    pub fn opaque<T: Any>(value: T) -> Self {
        Value::Opaque(Rc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Node(_) => "node",
            Value::Group(_) => "group",
            Value::Opaque(_) => "opaque",
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupRef> {
        match self {
            Value::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Attributes> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Downcasts an opaque value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(any) => any.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Encodes the value as JSON, serializing live nodes and groups through
    /// their own behavior stack.
    pub fn to_json(&self, options: &Options) -> Result<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json(options))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(map) => encode_attributes(map, options)?,
            Value::Node(node) => node.to_json(options)?,
            Value::Group(group) => group.to_json(options)?,
            Value::Opaque(_) => return Err(Error::Unencodable("opaque host value".into())),
        })
    }

    /// Short rendering used in diagnostics. Live handles are named, not expanded.
    pub fn describe(&self) -> String {
        self.sketch().to_string()
    }

    fn sketch(&self) -> serde_json::Value {
        match self {
            Value::Node(node) => format!("<{} node>", node.kind().name()).into(),
            Value::Group(group) => format!("<{} group>", group.kind().name()).into(),
            Value::Opaque(_) => "<opaque>".into(),
            Value::Array(items) => items.iter().map(Value::sketch).collect(),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.sketch()))
                .collect::<serde_json::Map<_, _>>()
                .into(),
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => (*b).into(),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => s.as_str().into(),
        }
    }
}

/// Encodes an attribute map as a JSON object.
pub fn encode_attributes(map: &Attributes, options: &Options) -> Result<serde_json::Value> {
    let mut out = serde_json::Map::with_capacity(map.len());
    for (name, value) in map {
        out.insert(name.clone(), value.to_json(options)?);
    }
    Ok(serde_json::Value::Object(out))
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(map) => f.debug_map().entries(map).finish(),
            Value::Node(node) => write!(f, "Node({}#{})", node.kind().name(), node.id()),
            Value::Group(group) => write!(
                f,
                "Group({}#{}, len={})",
                group.kind().name(),
                group.id(),
                group.len()
            ),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => Rc::ptr_eq(a, b),
            (Value::Group(a), Value::Group(b)) => Rc::ptr_eq(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Attributes> for Value {
    fn from(map: Attributes) -> Self {
        Value::Object(map)
    }
}

impl From<NodeRef> for Value {
    fn from(node: NodeRef) -> Self {
        Value::Node(node)
    }
}

impl From<GroupRef> for Value {
    fn from(group: GroupRef) -> Self {
        Value::Group(group)
    }
}

/// Converts a JSON object into attributes. Anything else yields `None`.
pub fn attributes_from_json(json: serde_json::Value) -> Option<Attributes> {
    match Value::from(json) {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
