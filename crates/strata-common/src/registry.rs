//! Config-driven type registry
//!
//! [`TypeRegistry::from_config`] turns a [`StrataConfig`] into live node and
//! group types. Every configured node type gets a [`RequiredAttributes`] base,
//! the [`NestedTypes`] layer and a declaration computed by name through the
//! registry, so types may refer to each other in any order, recursion included.
//! Nodes built from these types resolve their declarations through the
//! registry and see no nested types once it has been dropped.

use crate::config::{NodeTypeSpec, StrataConfig};
use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;
use std::rc::{Rc, Weak};
use strata_core::{
    Attributes, Behavior, GroupType, NestedTypes, Node, NodeType, Options, Outcome, TypeDescriptor,
    TypeMap, ValidationError, Value,
};
use tracing::{debug, info};

/// Base behavior of configured node types: fails validation when a required
/// attribute is missing or null.
///
/// Checks the explicit attribute target when one is given, otherwise the
/// node's own attributes. The error payload is an object naming the type and
/// the missing attributes.
#[derive(Debug, Clone, Default)]
pub struct RequiredAttributes {
    names: Vec<String>,
}

impl RequiredAttributes {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Behavior for RequiredAttributes {
    fn validate(
        &self,
        node: &Node,
        attrs: Option<&Attributes>,
        _options: &Options,
    ) -> strata_core::Result<Outcome> {
        let present = |name: &str| match attrs {
            Some(attrs) => attrs.get(name).is_some_and(|value| !value.is_null()),
            None => node.has(name),
        };
        let missing: Vec<&str> = self
            .names
            .iter()
            .map(String::as_str)
            .filter(|name| !present(name))
            .collect();

        if missing.is_empty() {
            return Ok(None);
        }
        debug!(
            "{}#{} is missing required attributes {:?}",
            node.kind().name(),
            node.id(),
            missing
        );
        Ok(Some(ValidationError::new(serde_json::json!({
            "type": node.kind().name(),
            "missing": missing,
        }))))
    }
}

/// A registered node type with its effective (inherited and own) settings.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub kind: Rc<NodeType>,
    pub extends: Option<String>,
    pub nested: IndexMap<String, String>,
    pub required: Vec<String>,
    pub defaults: serde_json::Map<String, serde_json::Value>,
}

/// Live node and group types built from a configuration.
#[derive(Debug)]
pub struct TypeRegistry {
    nodes: IndexMap<String, NodeEntry>,
    groups: IndexMap<String, Rc<GroupType>>,
    root: Option<String>,
}

impl TypeRegistry {
    /// Load a configuration file and build its types.
    pub fn load(path: &Path) -> Result<Rc<Self>> {
        let config = StrataConfig::load(path)?;
        Self::from_config(&config)
    }

    /// Builds every type in `config`.
    ///
    /// All references are checked first: unknown names, kind mismatches,
    /// names used for both a node and a group type, groups without a member
    /// type and inheritance cycles are reported before anything is built.
    pub fn from_config(config: &StrataConfig) -> Result<Rc<Self>> {
        check_references(config)?;
        let node_order = extends_order(config.nodes.keys(), |name| {
            config.nodes.get(name).and_then(|spec| spec.extends.as_deref())
        })?;
        let group_order = extends_order(config.groups.keys(), |name| {
            config.groups.get(name).and_then(|spec| spec.extends.as_deref())
        })?;

        let registry = Rc::new_cyclic(|registry: &Weak<TypeRegistry>| {
            let mut nodes: IndexMap<String, NodeEntry> = IndexMap::new();
            for name in node_order {
                let Some(spec) = config.nodes.get(name) else {
                    continue;
                };
                let parent = spec.extends.as_deref().and_then(|parent| nodes.get(parent));
                let entry = build_node(name, spec, parent, registry);
                nodes.insert(name.to_string(), entry);
            }
            // Keep configuration order rather than inheritance order
            nodes.sort_by_cached_key(|name, _| config.nodes.get_index_of(name));

            let mut groups: IndexMap<String, Rc<GroupType>> = IndexMap::new();
            for name in group_order {
                let Some(spec) = config.groups.get(name) else {
                    continue;
                };
                let member = spec
                    .member
                    .as_deref()
                    .and_then(|member| nodes.get(member))
                    .map(|entry| &entry.kind);
                let parent = spec.extends.as_deref().and_then(|parent| groups.get(parent));
                let kind = match (parent, member) {
                    (Some(parent), member) => GroupType::extending(name, parent, member),
                    (None, Some(member)) => GroupType::new(name, member),
                    // Rejected by check_references
                    (None, None) => continue,
                };
                debug!("Registered group type {} of {}", name, kind.member().name());
                groups.insert(name.to_string(), kind);
            }
            groups.sort_by_cached_key(|name, _| config.groups.get_index_of(name));

            TypeRegistry {
                nodes,
                groups,
                root: config.root.clone(),
            }
        });

        info!(
            "Built {} node types and {} group types",
            registry.nodes.len(),
            registry.groups.len()
        );
        Ok(registry)
    }

    pub fn node_type(&self, name: &str) -> Option<&Rc<NodeType>> {
        self.nodes.get(name).map(|entry| &entry.kind)
    }

    pub fn node_entry(&self, name: &str) -> Option<&NodeEntry> {
        self.nodes.get(name)
    }

    pub fn group_type(&self, name: &str) -> Option<&Rc<GroupType>> {
        self.groups.get(name)
    }

    /// Node or group type registered under `name`.
    pub fn descriptor(&self, name: &str) -> Option<TypeDescriptor> {
        self.node_type(name)
            .map(TypeDescriptor::from)
            .or_else(|| self.group_type(name).map(TypeDescriptor::from))
    }

    /// The configured root node type, if any.
    pub fn root_type(&self) -> Option<&Rc<NodeType>> {
        self.root.as_deref().and_then(|name| self.node_type(name))
    }

    pub fn root_name(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeEntry)> {
        self.nodes.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &Rc<GroupType>)> {
        self.groups.iter().map(|(name, kind)| (name.as_str(), kind))
    }

    /// Resolves attribute-to-type-name pairs into a declaration.
    fn declaration_for(&self, nested: &IndexMap<String, String>) -> TypeMap {
        nested
            .iter()
            .filter_map(|(attribute, type_name)| {
                self.descriptor(type_name)
                    .map(|descriptor| (attribute.clone(), descriptor))
            })
            .collect()
    }
}

fn build_node(
    name: &str,
    spec: &NodeTypeSpec,
    parent: Option<&NodeEntry>,
    registry: &Weak<TypeRegistry>,
) -> NodeEntry {
    let mut nested = parent.map(|p| p.nested.clone()).unwrap_or_default();
    nested.extend(spec.nested.clone());

    let mut required = parent.map(|p| p.required.clone()).unwrap_or_default();
    for attribute in &spec.required {
        if !required.contains(attribute) {
            required.push(attribute.clone());
        }
    }

    let mut defaults = parent.map(|p| p.defaults.clone()).unwrap_or_default();
    defaults.extend(spec.defaults.clone());

    let mut builder = NodeType::builder(name);
    if let Some(parent) = parent {
        builder = builder.extends(&parent.kind);
    }

    let source = Weak::clone(registry);
    let declared = nested.clone();
    let produced = defaults.clone();
    let kind = builder
        .base(RequiredAttributes::new(required.iter().cloned()))
        .layer(NestedTypes)
        .nested_with(move |_| match source.upgrade() {
            Some(registry) => registry.declaration_for(&declared),
            None => TypeMap::new(),
        })
        .defaults(move || {
            produced
                .iter()
                .map(|(attribute, value)| (attribute.clone(), Value::from(value.clone())))
                .collect()
        })
        .build();

    debug!(
        "Registered node type {} ({} nested, {} required)",
        name,
        nested.len(),
        required.len()
    );
    NodeEntry {
        kind,
        extends: spec.extends.clone(),
        nested,
        required,
        defaults,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Kind {
    Node,
    Group,
}

impl Kind {
    fn label(self) -> &'static str {
        match self {
            Kind::Node => "node",
            Kind::Group => "group",
        }
    }
}

fn check_references(config: &StrataConfig) -> Result<()> {
    let kind_of = |name: &str| {
        if config.nodes.contains_key(name) {
            Some(Kind::Node)
        } else if config.groups.contains_key(name) {
            Some(Kind::Group)
        } else {
            None
        }
    };
    let expect = |name: &str, expected: Option<Kind>, referenced_by: String| match kind_of(name) {
        None => Err(ConfigError::UnknownType {
            name: name.to_string(),
            referenced_by,
        }),
        Some(found) => match expected {
            Some(expected) if expected != found => Err(ConfigError::KindMismatch {
                name: name.to_string(),
                expected: expected.label(),
                found: found.label(),
                referenced_by,
            }),
            _ => Ok(()),
        },
    };

    if let Some(name) = config.nodes.keys().find(|name| config.groups.contains_key(*name)) {
        return Err(ConfigError::DuplicateType(name.clone()));
    }

    for (name, spec) in &config.nodes {
        if let Some(parent) = &spec.extends {
            expect(parent, Some(Kind::Node), format!("node type '{name}'"))?;
        }
        for (attribute, type_name) in &spec.nested {
            expect(type_name, None, format!("attribute '{attribute}' of '{name}'"))?;
        }
    }

    for (name, spec) in &config.groups {
        if let Some(member) = &spec.member {
            expect(member, Some(Kind::Node), format!("group type '{name}'"))?;
        }
        match &spec.extends {
            Some(parent) => expect(parent, Some(Kind::Group), format!("group type '{name}'"))?,
            None if spec.member.is_none() => {
                return Err(ConfigError::MissingMember(name.clone()));
            }
            None => {}
        }
    }

    if let Some(root) = &config.root {
        expect(root, Some(Kind::Node), "the root setting".to_string())?;
    }
    Ok(())
}

/// Orders `names` so that every type comes after the type it extends.
fn extends_order<'a>(
    names: impl Iterator<Item = &'a String>,
    parent_of: impl Fn(&str) -> Option<&'a str>,
) -> Result<Vec<&'a str>> {
    let mut order = Vec::new();
    let mut placed: HashSet<&str> = HashSet::new();

    for name in names {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = Some(name.as_str());
        while let Some(step) = current {
            if placed.contains(step) {
                break;
            }
            if chain.contains(&step) {
                return Err(ConfigError::ExtendsCycle(step.to_string()));
            }
            chain.push(step);
            current = parent_of(step);
        }
        for step in chain.into_iter().rev() {
            placed.insert(step);
            order.push(step);
        }
    }
    Ok(order)
}
