//! Nested type declarations
//!
//! A declaration maps attribute names to the type each attribute should hold.
//! It comes from a [`DeclarationSource`]: either a [`Constant`] mapping or a
//! [`Computed`] one that is evaluated against the node on every call.

use crate::error::Result;
use crate::group::{Group, GroupType};
use crate::node::{Node, NodeType};
use crate::options::Options;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Attribute name to declared type, in declaration order.
pub type TypeMap = IndexMap<String, TypeDescriptor>;

/// A declared nested type.
///
/// The variant decides which raw shape is accepted: objects for
/// [`TypeDescriptor::Node`], sequences for [`TypeDescriptor::Group`].
#[derive(Clone)]
pub enum TypeDescriptor {
    Node(Rc<NodeType>),
    Group(Rc<GroupType>),
}

impl TypeDescriptor {
    pub fn name(&self) -> &str {
        match self {
            TypeDescriptor::Node(kind) => kind.name(),
            TypeDescriptor::Group(kind) => kind.name(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, TypeDescriptor::Group(_))
    }

    /// Returns `true` if `value` is a live instance of this type or a subtype.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDescriptor::Node(kind), Value::Node(node)) => node.kind().is_a(kind),
            (TypeDescriptor::Group(kind), Value::Group(group)) => group.kind().is_a(kind),
            _ => false,
        }
    }

    /// Constructs a new instance from a raw value, forwarding `options`.
    ///
    /// Callers check the shape first; a raw value of the wrong shape is
    /// reported by the underlying constructor.
    pub fn instantiate(&self, raw: Value, options: &Options) -> Result<Value> {
        match self {
            TypeDescriptor::Node(kind) => Node::from_value(kind, raw, options).map(Value::Node),
            TypeDescriptor::Group(kind) => Group::from_value(kind, raw, options).map(Value::Group),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Node(kind) => write!(f, "node {}", kind.name()),
            TypeDescriptor::Group(kind) => write!(f, "group {}", kind.name()),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({self})")
    }
}

impl From<Rc<NodeType>> for TypeDescriptor {
    fn from(kind: Rc<NodeType>) -> Self {
        TypeDescriptor::Node(kind)
    }
}

impl From<&Rc<NodeType>> for TypeDescriptor {
    fn from(kind: &Rc<NodeType>) -> Self {
        TypeDescriptor::Node(Rc::clone(kind))
    }
}

impl From<Rc<GroupType>> for TypeDescriptor {
    fn from(kind: Rc<GroupType>) -> Self {
        TypeDescriptor::Group(kind)
    }
}

impl From<&Rc<GroupType>> for TypeDescriptor {
    fn from(kind: &Rc<GroupType>) -> Self {
        TypeDescriptor::Group(Rc::clone(kind))
    }
}

/// Builds a [`TypeMap`] from `(name, type)` pairs.
pub fn declare<N, D>(entries: impl IntoIterator<Item = (N, D)>) -> TypeMap
where
    N: Into<String>,
    D: Into<TypeDescriptor>,
{
    entries
        .into_iter()
        .map(|(name, descriptor)| (name.into(), descriptor.into()))
        .collect()
}

/// Where a node's nested types come from.
pub trait DeclarationSource {
    fn resolve_declaration(&self, node: &Node) -> TypeMap;
}

/// A fixed declaration shared by every node of a type.
#[derive(Debug, Clone, Default)]
pub struct Constant(TypeMap);

impl Constant {
    pub fn new(types: TypeMap) -> Self {
        Self(types)
    }
}

impl DeclarationSource for Constant {
    fn resolve_declaration(&self, _node: &Node) -> TypeMap {
        self.0.clone()
    }
}

/// A declaration computed from the node each time it is needed.
pub struct Computed<F>(F);

impl<F> Computed<F>
where
    F: Fn(&Node) -> TypeMap,
{
    pub fn new(compute: F) -> Self {
        Self(compute)
    }
}

impl<F> DeclarationSource for Computed<F>
where
    F: Fn(&Node) -> TypeMap,
{
    fn resolve_declaration(&self, node: &Node) -> TypeMap {
        (self.0)(node)
    }
}

/// Resolves the declaration for `node`: the instance override if set,
/// otherwise the type's source. A node without either declares nothing.
pub fn resolve_declaration(node: &Node) -> TypeMap {
    match node.declaration_source() {
        Some(source) => source.resolve_declaration(node),
        None => TypeMap::new(),
    }
}
