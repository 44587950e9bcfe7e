//! Nodes and node types
//!
//! A [`NodeType`] bundles a name, an optional parent type, a declaration
//! source, a defaults producer and a behavior stack. A [`Node`] is a shared,
//! mutable attribute map bound to one node type.

use crate::chain::{Behavior, Extension, Layer, PlainBehavior};
use crate::declaration::{Computed, Constant, DeclarationSource, TypeMap};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::outcome::Outcome;
use crate::value::{Attributes, Value, encode_attributes};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Shared handle to a node.
pub type NodeRef = Rc<Node>;

type DefaultsFn = dyn Fn() -> Attributes;

pub struct NodeType {
    name: String,
    parent: Option<Rc<NodeType>>,
    declaration: Option<Rc<dyn DeclarationSource>>,
    defaults: Option<Rc<DefaultsFn>>,
    behavior: Rc<dyn Behavior>,
}

impl NodeType {
    pub fn builder(name: impl Into<String>) -> NodeTypeBuilder {
        NodeTypeBuilder {
            name: name.into(),
            parent: None,
            declaration: None,
            defaults: None,
            behavior: Rc::new(PlainBehavior),
        }
    }

    /// A node type with no declaration, no defaults and plain behavior.
    pub fn plain(name: impl Into<String>) -> Rc<Self> {
        Self::builder(name).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<NodeType>> {
        self.parent.as_ref()
    }

    /// Returns `true` if this type is `ancestor` or extends it, directly or not.
    pub fn is_a(&self, ancestor: &NodeType) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if std::ptr::eq(kind, ancestor) {
                return true;
            }
            current = kind.parent.as_deref();
        }
        false
    }

    /// Top of the behavior stack.
    pub fn behavior(&self) -> &Rc<dyn Behavior> {
        &self.behavior
    }

    pub fn declaration(&self) -> Option<&Rc<dyn DeclarationSource>> {
        self.declaration.as_ref()
    }

    /// Fresh default attributes.
    pub fn defaults(&self) -> Attributes {
        self.defaults.as_deref().map(|defaults| defaults()).unwrap_or_default()
    }

    pub fn create(self: &Rc<Self>, raw: Option<Attributes>, options: &Options) -> Result<NodeRef> {
        Node::new(self, raw, options)
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("declared", &self.declaration.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`NodeType`]. Calls apply in order; later calls override
/// earlier ones.
pub struct NodeTypeBuilder {
    name: String,
    parent: Option<Rc<NodeType>>,
    declaration: Option<Rc<dyn DeclarationSource>>,
    defaults: Option<Rc<DefaultsFn>>,
    behavior: Rc<dyn Behavior>,
}

impl NodeTypeBuilder {
    /// Makes the new type a subtype of `parent` and inherits its declaration,
    /// defaults and whole behavior stack.
    pub fn extends(mut self, parent: &Rc<NodeType>) -> Self {
        self.declaration = parent.declaration.clone();
        self.defaults = parent.defaults.clone();
        self.behavior = Rc::clone(&parent.behavior);
        self.parent = Some(Rc::clone(parent));
        self
    }

    /// Replaces the behavior stack with `behavior`.
    pub fn base(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Rc::new(behavior);
        self
    }

    /// Installs `extension` over the current stack.
    pub fn layer(mut self, extension: impl Extension + 'static) -> Self {
        self.behavior = Rc::new(Layer::new(extension, self.behavior));
        self
    }

    pub fn nested(self, types: TypeMap) -> Self {
        self.declaration(Constant::new(types))
    }

    pub fn nested_with(self, compute: impl Fn(&Node) -> TypeMap + 'static) -> Self {
        self.declaration(Computed::new(compute))
    }

    pub fn declaration(mut self, source: impl DeclarationSource + 'static) -> Self {
        self.declaration = Some(Rc::new(source));
        self
    }

    pub fn defaults(mut self, defaults: impl Fn() -> Attributes + 'static) -> Self {
        self.defaults = Some(Rc::new(defaults));
        self
    }

    pub fn build(self) -> Rc<NodeType> {
        Rc::new(NodeType {
            name: self.name,
            parent: self.parent,
            declaration: self.declaration,
            defaults: self.defaults,
            behavior: self.behavior,
        })
    }
}

pub struct Node {
    id: Uuid,
    kind: Rc<NodeType>,
    attributes: RefCell<Attributes>,
    declaration: RefCell<Option<Rc<dyn DeclarationSource>>>,
}

impl Node {
    /// Constructs a node. With `options.parse` the raw attributes go through
    /// the type's parse stack first; missing attributes are then filled from
    /// the type's defaults.
    pub fn new(kind: &Rc<NodeType>, raw: Option<Attributes>, options: &Options) -> Result<NodeRef> {
        let node = Rc::new(Node {
            id: Uuid::new_v4(),
            kind: Rc::clone(kind),
            attributes: RefCell::new(Attributes::new()),
            declaration: RefCell::new(None),
        });

        let mut attrs = raw.unwrap_or_default();
        if options.parse {
            attrs = node.parse(Some(attrs), options)?.unwrap_or_default();
        }
        for (name, value) in kind.defaults() {
            attrs.entry(name).or_insert(value);
        }

        *node.attributes.borrow_mut() = attrs;
        Ok(node)
    }

    /// Constructs a node from a raw value that must be an object or null.
    pub fn from_value(kind: &Rc<NodeType>, raw: Value, options: &Options) -> Result<NodeRef> {
        match raw {
            Value::Object(attrs) => Node::new(kind, Some(attrs), options),
            Value::Null => Node::new(kind, None, options),
            other => Err(Error::InvalidInput {
                kind: kind.name().to_string(),
                expected: "an object",
                found: other.describe(),
            }),
        }
    }

    pub fn from_json(
        kind: &Rc<NodeType>,
        json: serde_json::Value,
        options: &Options,
    ) -> Result<NodeRef> {
        Node::from_value(kind, Value::from(json), options)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &Rc<NodeType> {
        &self.kind
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.attributes.borrow().get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.attributes
            .borrow()
            .get(name)
            .is_some_and(|value| !value.is_null())
    }

    /// Sets one attribute and returns the previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.borrow_mut().insert(name.into(), value.into())
    }

    /// Merges `attrs` into the node's attributes.
    pub fn set_all(&self, attrs: Attributes) {
        self.attributes.borrow_mut().extend(attrs);
    }

    pub fn unset(&self, name: &str) -> Option<Value> {
        self.attributes.borrow_mut().shift_remove(name)
    }

    /// Snapshot of the current attributes.
    pub fn attributes(&self) -> Attributes {
        self.attributes.borrow().clone()
    }

    /// Overrides the type's declaration for this node only. `None` restores it.
    pub fn set_declaration(&self, source: Option<Rc<dyn DeclarationSource>>) {
        *self.declaration.borrow_mut() = source;
    }

    /// The declaration source in effect: the instance override, else the type's.
    pub fn declaration_source(&self) -> Option<Rc<dyn DeclarationSource>> {
        self.declaration
            .borrow()
            .clone()
            .or_else(|| self.kind.declaration.clone())
    }

    pub fn parse(&self, raw: Option<Attributes>, options: &Options) -> Result<Option<Attributes>> {
        self.kind.behavior.parse(self, raw, options)
    }

    pub fn serialize(&self, options: &Options) -> Result<Attributes> {
        self.kind.behavior.serialize(self, options)
    }

    /// Validates `attrs`, or the node's own attributes when `None`.
    pub fn validate(&self, attrs: Option<&Attributes>, options: &Options) -> Result<Outcome> {
        self.kind.behavior.validate(self, attrs, options)
    }

    pub fn is_valid(&self, options: &Options) -> Result<bool> {
        Ok(self.validate(None, options)?.is_none())
    }

    /// Serializes the node and encodes the result as a JSON object.
    pub fn to_json(&self, options: &Options) -> Result<serde_json::Value> {
        encode_attributes(&self.serialize(options)?, options)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind.name())
            .field("attributes", &*self.attributes.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(json: serde_json::Value) -> Attributes {
        crate::value::attributes_from_json(json).unwrap()
    }

    #[test]
    fn test_new_without_parse_keeps_raw_attributes() {
        let kind = NodeType::plain("Plain");
        let node = Node::new(&kind, Some(attrs(json!({"foo": "bar"}))), &Options::default()).unwrap();

        assert_eq!(node.get("foo"), Some(Value::from("bar")));
        assert_eq!(node.to_json(&Options::default()).unwrap(), json!({"foo": "bar"}));
    }

    #[test]
    fn test_defaults_fill_missing_attributes_only() {
        let kind = NodeType::builder("Defaulted")
            .defaults(|| attrs(json!({"size": 1, "color": "red"})))
            .build();
        let node = Node::new(&kind, Some(attrs(json!({"size": 5}))), &Options::default()).unwrap();

        assert_eq!(node.get("size"), Some(Value::from(5i64)));
        assert_eq!(node.get("color"), Some(Value::from("red")));
    }

    #[test]
    fn test_parse_option_runs_parse_stack() {
        struct Upper;
        impl Behavior for Upper {
            fn parse(
                &self,
                _node: &Node,
                raw: Option<Attributes>,
                _options: &Options,
            ) -> Result<Option<Attributes>> {
                Ok(raw.map(|attrs| {
                    attrs
                        .into_iter()
                        .map(|(name, value)| (name.to_uppercase(), value))
                        .collect()
                }))
            }
        }

        let kind = NodeType::builder("Upper").base(Upper).build();
        let raw = attrs(json!({"a": 1}));

        let plain = Node::new(&kind, Some(raw.clone()), &Options::default()).unwrap();
        assert!(plain.get("a").is_some());

        let parsed = Node::new(&kind, Some(raw), &Options::parsed()).unwrap();
        assert!(parsed.get("A").is_some());
        assert!(parsed.get("a").is_none());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        let kind = NodeType::plain("Strict");
        let err = Node::from_value(&kind, Value::from(3i64), &Options::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn test_extends_inherits_behavior_and_defaults() {
        let base = NodeType::builder("Base")
            .defaults(|| attrs(json!({"kind": "base"})))
            .build();
        let derived = NodeType::builder("Derived").extends(&base).build();
        let node = Node::new(&derived, None, &Options::default()).unwrap();

        assert_eq!(node.get("kind"), Some(Value::from("base")));
        assert!(derived.is_a(&base));
        assert!(!base.is_a(&derived));
    }

    #[test]
    fn test_set_and_unset() {
        let node = Node::new(&NodeType::plain("Bag"), None, &Options::default()).unwrap();
        assert_eq!(node.set("x", 1i64), None);
        assert_eq!(node.set("x", 2i64), Some(Value::from(1i64)));
        assert!(node.has("x"));
        node.set("y", Value::Null);
        assert!(!node.has("y"));
        assert_eq!(node.unset("x"), Some(Value::from(2i64)));
        assert!(!node.has("x"));
    }

    #[test]
    fn test_set_all_merges_in_order() {
        let node = Node::from_json(
            &NodeType::plain("Bag"),
            json!({"a": 1, "b": 2}),
            &Options::default(),
        )
        .unwrap();

        node.set_all(attrs(json!({"b": 20, "c": 30})));

        assert_eq!(
            node.to_json(&Options::default()).unwrap(),
            json!({"a": 1, "b": 20, "c": 30})
        );
        let keys: Vec<_> = node.attributes().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
