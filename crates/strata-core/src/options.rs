//! Call options forwarded through parse, serialize and validate.

use serde::{Deserialize, Serialize};

/// Options passed to every operation and forwarded unchanged to nested calls.
///
/// Only the node constructor interprets `parse`, and only the validate walker
/// interprets `validate_nested`. Anything else travels in `extra` for base
/// behaviors to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Run the behavior stack's parse step when constructing nodes
    #[serde(default)]
    pub parse: bool,

    /// Validate nested instances after the node's own validation
    #[serde(default = "default_true")]
    pub validate_nested: bool,

    /// Free-form options for base behaviors
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            parse: false,
            validate_nested: true,
            extra: serde_json::Map::new(),
        }
    }
}

impl Options {
    /// Options with `parse` enabled.
    pub fn parsed() -> Self {
        Self {
            parse: true,
            ..Self::default()
        }
    }

    /// Disables validation of nested instances.
    pub fn skip_nested(mut self) -> Self {
        self.validate_nested = false;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}
