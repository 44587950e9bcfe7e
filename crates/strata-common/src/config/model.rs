use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root configuration from strata.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StrataConfig {
    /// Node type that documents are read as when no type is given
    #[serde(default)]
    pub root: Option<String>,

    /// Node types, in declaration order
    #[serde(default)]
    pub nodes: IndexMap<String, NodeTypeSpec>,

    /// Group types, in declaration order
    #[serde(default)]
    pub groups: IndexMap<String, GroupTypeSpec>,
}

impl StrataConfig {
    /// Names of every declared type, node types first.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .keys()
            .chain(self.groups.keys())
            .map(String::as_str)
    }
}

/// [nodes.<Name>] section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeTypeSpec {
    /// Parent node type. Nested attributes, required attributes and defaults
    /// are inherited and may be overridden.
    #[serde(default)]
    pub extends: Option<String>,

    /// Attribute name to node or group type name
    #[serde(default)]
    pub nested: IndexMap<String, String>,

    /// Attributes that must be present and non-null for a node to be valid
    #[serde(default)]
    pub required: Vec<String>,

    /// Default attribute values
    #[serde(default)]
    pub defaults: serde_json::Map<String, serde_json::Value>,
}

/// [groups.<Name>] section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GroupTypeSpec {
    /// Node type raw members are built as. Inherited from `extends` if omitted.
    #[serde(default)]
    pub member: Option<String>,

    /// Parent group type
    #[serde(default)]
    pub extends: Option<String>,
}
