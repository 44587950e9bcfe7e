//! Behavior stacks
//!
//! Every node type owns a stack of behaviors. The bottom of the stack is a
//! [`Behavior`]; each [`Extension`] layered on top wraps the stack that existed
//! before it, so several independently written extensions can hook the same
//! operations.
//!
//! An extension reaches the layer below through [`Next`], a handle passed
//! into each call. `Next` is consumed by the call it makes, so an extension
//! can delegate at most once per call, and there is no dispatch state to
//! restore afterwards: re-entrant calls on the same node simply start again at
//! the top of the stack with their own handles.

use crate::error::Result;
use crate::node::Node;
use crate::options::Options;
use crate::outcome::Outcome;
use crate::value::Attributes;
use std::rc::Rc;
use tracing::trace;

/// The operations a node type supports.
///
/// The defaults describe a plain node: parse returns its input, serialize
/// returns a snapshot of the attributes, and there is no validator.
pub trait Behavior {
    fn parse(
        &self,
        node: &Node,
        raw: Option<Attributes>,
        options: &Options,
    ) -> Result<Option<Attributes>> {
        let _ = (node, options);
        Ok(raw)
    }

    fn serialize(&self, node: &Node, options: &Options) -> Result<Attributes> {
        let _ = options;
        Ok(node.attributes())
    }

    fn validate(
        &self,
        node: &Node,
        attrs: Option<&Attributes>,
        options: &Options,
    ) -> Result<Outcome> {
        let _ = (node, attrs, options);
        Ok(None)
    }
}

/// Behavior of a node type that defines nothing of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainBehavior;

impl Behavior for PlainBehavior {}

/// A layer that wraps the behavior stack below it.
///
/// Every method defaults to delegating straight down.
pub trait Extension {
    fn parse(
        &self,
        node: &Node,
        raw: Option<Attributes>,
        options: &Options,
        next: Next<'_>,
    ) -> Result<Option<Attributes>> {
        next.parse(node, raw, options)
    }

    fn serialize(&self, node: &Node, options: &Options, next: Next<'_>) -> Result<Attributes> {
        next.serialize(node, options)
    }

    fn validate(
        &self,
        node: &Node,
        attrs: Option<&Attributes>,
        options: &Options,
        next: Next<'_>,
    ) -> Result<Outcome> {
        next.validate(node, attrs, options)
    }
}

/// Handle to the behavior stack beneath an extension, valid for one call.
pub struct Next<'a> {
    inner: &'a dyn Behavior,
}

impl<'a> Next<'a> {
    pub fn parse(
        self,
        node: &Node,
        raw: Option<Attributes>,
        options: &Options,
    ) -> Result<Option<Attributes>> {
        trace!("Delegating parse for {}#{}", node.kind().name(), node.id());
        self.inner.parse(node, raw, options)
    }

    pub fn serialize(self, node: &Node, options: &Options) -> Result<Attributes> {
        trace!("Delegating serialize for {}#{}", node.kind().name(), node.id());
        self.inner.serialize(node, options)
    }

    pub fn validate(
        self,
        node: &Node,
        attrs: Option<&Attributes>,
        options: &Options,
    ) -> Result<Outcome> {
        trace!("Delegating validate for {}#{}", node.kind().name(), node.id());
        self.inner.validate(node, attrs, options)
    }
}

/// An extension installed over an existing stack.
pub struct Layer<E> {
    extension: E,
    inner: Rc<dyn Behavior>,
}

impl<E: Extension> Layer<E> {
    pub fn new(extension: E, inner: Rc<dyn Behavior>) -> Self {
        Self { extension, inner }
    }

    fn next(&self) -> Next<'_> {
        Next {
            inner: self.inner.as_ref(),
        }
    }
}

impl<E: Extension> Behavior for Layer<E> {
    fn parse(
        &self,
        node: &Node,
        raw: Option<Attributes>,
        options: &Options,
    ) -> Result<Option<Attributes>> {
        self.extension.parse(node, raw, options, self.next())
    }

    fn serialize(&self, node: &Node, options: &Options) -> Result<Attributes> {
        self.extension.serialize(node, options, self.next())
    }

    fn validate(
        &self,
        node: &Node,
        attrs: Option<&Attributes>,
        options: &Options,
    ) -> Result<Outcome> {
        self.extension.validate(node, attrs, options, self.next())
    }
}
