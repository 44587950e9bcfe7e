//! Error types for nested-type operations
//!
//! Validation failures are not errors: they travel as [`crate::Outcome`]
//! values. Only structural problems found while parsing, and failures raised by
//! user-supplied behaviors, use this channel.

use crate::declaration::TypeDescriptor;
use crate::value::Value;
use thiserror::Error;

/// Result type alias for Strata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Strata operations
#[derive(Error, Debug)]
pub enum Error {
    /// A raw value for a declared attribute does not have the shape its type expects.
    #[error("Invalid attribute '{attribute}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Attribute name
        attribute: String,
        /// Declared type, e.g. `node Customer` or `group Lines`
        expected: String,
        /// Rendering of the offending value
        found: String,
    },

    /// A raw group element is neither a plain object nor a node.
    #[error("Invalid member #{index} for group '{group}': expected an object or node, found {found}")]
    InvalidMember {
        /// Group type name
        group: String,
        /// Position of the element in the raw sequence
        index: usize,
        /// Rendering of the offending element
        found: String,
    },

    /// Top-level input handed to a node or group constructor has the wrong shape.
    #[error("Invalid input for '{kind}': expected {expected}, found {found}")]
    InvalidInput {
        /// Type being constructed
        kind: String,
        /// Expected shape
        expected: &'static str,
        /// Rendering of the input
        found: String,
    },

    /// An opaque host value reached JSON encoding.
    #[error("Value cannot be encoded as JSON: {0}")]
    Unencodable(String),

    /// Errors raised by base behaviors and extensions, propagated unchanged
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn type_mismatch(
        attribute: impl Into<String>,
        expected: &TypeDescriptor,
        found: &Value,
    ) -> Self {
        Error::TypeMismatch {
            attribute: attribute.into(),
            expected: expected.to_string(),
            found: found.describe(),
        }
    }

    /// Returns `true` for [`Error::TypeMismatch`].
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }
}
