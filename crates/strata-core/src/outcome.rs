//! Validation outcomes
//!
//! A validator either reports nothing (`None`) or an opaque
//! [`ValidationError`] payload. Nested validation produces a
//! [`NestedReport`] whose first error is found by a depth-first search.

use indexmap::IndexMap;
use std::fmt;

/// Result of a single validation: `None` means valid.
pub type Outcome = Option<ValidationError>;

/// Opaque validation payload. The engine never looks inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError(serde_json::Value);

impl ValidationError {
    pub fn new(payload: impl Into<serde_json::Value>) -> Self {
        Self(payload.into())
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_payload(self) -> serde_json::Value {
        self.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(message) => f.write_str(message),
            other => write!(f, "{other}"),
        }
    }
}

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Value> for ValidationError {
    fn from(payload: serde_json::Value) -> Self {
        Self(payload)
    }
}

/// Deep map of nested validation outcomes, keyed by attribute.
///
/// Groups appear as positional lists of their members' outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedReport {
    Outcome(Outcome),
    List(Vec<NestedReport>),
    Map(IndexMap<String, NestedReport>),
}

impl NestedReport {
    /// First error in depth-first, insertion order. Stops at the first match.
    pub fn first_error(&self) -> Option<&ValidationError> {
        match self {
            NestedReport::Outcome(outcome) => outcome.as_ref(),
            NestedReport::List(items) => items.iter().find_map(NestedReport::first_error),
            NestedReport::Map(entries) => entries.values().find_map(NestedReport::first_error),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.first_error().is_none()
    }

    /// Every error with a path of attribute names and member indices leading to it.
    pub fn errors(&self) -> Vec<(String, &ValidationError)> {
        let mut found = Vec::new();
        self.collect_errors(String::new(), &mut found);
        found
    }

    fn collect_errors<'a>(&'a self, path: String, found: &mut Vec<(String, &'a ValidationError)>) {
        match self {
            NestedReport::Outcome(Some(error)) => found.push((path, error)),
            NestedReport::Outcome(None) => {}
            NestedReport::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    item.collect_errors(format!("{path}[{index}]"), found);
                }
            }
            NestedReport::Map(entries) => {
                for (name, entry) in entries {
                    let child = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    entry.collect_errors(child, found);
                }
            }
        }
    }
}
