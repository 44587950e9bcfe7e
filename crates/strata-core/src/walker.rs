//! Nested-type walker
//!
//! [`NestedTypes`] is an [`Extension`] that gives a node type nested parsing,
//! serialization and validation driven by the node's declaration. Every
//! operation first delegates to the stack below it, then resolves the
//! declaration once, then works through one level of attributes. Deeper
//! levels are handled by the nested nodes' own stacks.

use crate::chain::{Extension, Next};
use crate::classify::{Compatibility, classify, is_instance_of};
use crate::declaration::{TypeDescriptor, resolve_declaration};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::options::Options;
use crate::outcome::{NestedReport, Outcome};
use crate::value::{Attributes, Value};
use indexmap::IndexMap;
use tracing::debug;

/// Extension that instantiates, serializes and validates declared attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedTypes;

impl Extension for NestedTypes {
    /// Converts raw declared attributes into instances of their types.
    ///
    /// All declared attributes are checked before any is converted, so a
    /// mismatch leaves nothing half-built. Null, absent and already
    /// instantiated values are left alone.
    fn parse(
        &self,
        node: &Node,
        raw: Option<Attributes>,
        options: &Options,
        next: Next<'_>,
    ) -> Result<Option<Attributes>> {
        let Some(mut attrs) = next.parse(node, raw, options)? else {
            return Ok(None);
        };
        let types = resolve_declaration(node);

        let mut pending: Vec<(&String, &TypeDescriptor)> = Vec::new();
        for (name, descriptor) in &types {
            let value = attrs.get(name.as_str());
            match (classify(value, Some(descriptor)), value) {
                (Compatibility::Convertible, _) => pending.push((name, descriptor)),
                (Compatibility::Mismatch, Some(found)) => {
                    debug!(
                        "Rejecting '{}' on {}: expected {}, found {}",
                        name,
                        node.kind().name(),
                        descriptor,
                        found.kind_name()
                    );
                    return Err(Error::type_mismatch(name.as_str(), descriptor, found));
                }
                _ => {}
            }
        }

        for (name, descriptor) in pending {
            if let Some(slot) = attrs.get_mut(name.as_str()) {
                let raw = std::mem::replace(slot, Value::Null);
                *slot = descriptor.instantiate(raw, options)?;
                debug!(
                    "Instantiated '{}' on {}#{} as {}",
                    name,
                    node.kind().name(),
                    node.id(),
                    descriptor
                );
            }
        }

        Ok(Some(attrs))
    }

    /// Replaces declared, instantiated attributes in the base output with their
    /// own serialization. Everything else passes through as the base left it.
    fn serialize(&self, node: &Node, options: &Options, next: Next<'_>) -> Result<Attributes> {
        let mut out = next.serialize(node, options)?;
        let types = resolve_declaration(node);

        for (name, value) in out.iter_mut() {
            let Some(descriptor) = types.get(name) else {
                continue;
            };
            if !is_instance_of(value, descriptor) {
                continue;
            }
            let serialized = match value {
                Value::Node(nested) => Value::Object(nested.serialize(options)?),
                Value::Group(group) => Value::Array(group.serialize(options)?),
                _ => continue,
            };
            debug!("Serialized '{}' on {} as {}", name, node.kind().name(), descriptor);
            *value = serialized;
        }

        Ok(out)
    }

    /// The stack's own error if any, otherwise the first nested error.
    fn validate(
        &self,
        node: &Node,
        attrs: Option<&Attributes>,
        options: &Options,
        next: Next<'_>,
    ) -> Result<Outcome> {
        let base = next.validate(node, attrs, options)?;
        if !options.validate_nested {
            return Ok(base);
        }

        let report = validate_report(node, attrs, options)?;
        if base.is_none() {
            if let Some(error) = report.first_error() {
                debug!("Nested validation failed on {}: {}", node.kind().name(), error);
                return Ok(Some(error.clone()));
            }
        }
        Ok(base)
    }
}

/// Validates every declared, instantiated attribute of `attrs` (or of the
/// node's attributes when `None`) and returns the full nested report.
///
/// Nested nodes are validated with no explicit target; groups validate each
/// member that way, in order. The node's own validator is not consulted.
pub fn validate_report(
    node: &Node,
    attrs: Option<&Attributes>,
    options: &Options,
) -> Result<NestedReport> {
    let target = match attrs {
        Some(attrs) => attrs.clone(),
        None => node.attributes(),
    };
    let types = resolve_declaration(node);

    let mut entries = IndexMap::new();
    for (name, value) in &target {
        let Some(descriptor) = types.get(name) else {
            continue;
        };
        if !is_instance_of(value, descriptor) {
            continue;
        }
        let entry = match value {
            Value::Node(nested) => NestedReport::Outcome(nested.validate(None, options)?),
            Value::Group(group) => NestedReport::List(
                group
                    .validate_members(options)?
                    .into_iter()
                    .map(NestedReport::Outcome)
                    .collect(),
            ),
            _ => continue,
        };
        entries.insert(name.clone(), entry);
    }

    Ok(NestedReport::Map(entries))
}
