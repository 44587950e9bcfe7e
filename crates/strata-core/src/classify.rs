//! Shape checks between raw values and declared types.

use crate::declaration::TypeDescriptor;
use crate::value::Value;

/// How an attribute value relates to its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// No type is declared for the attribute
    Undeclared,
    /// The attribute is not set
    Absent,
    /// The attribute is explicitly null
    Null,
    /// Already a live instance of the declared type
    Instance,
    /// Raw data of the right shape to construct the declared type
    Convertible,
    /// Anything else
    Mismatch,
}

/// Returns `true` if `value` has the raw shape `descriptor` is built from:
/// a sequence for groups, a plain object for nodes.
pub fn can_become(value: &Value, descriptor: &TypeDescriptor) -> bool {
    match descriptor {
        TypeDescriptor::Group(_) => matches!(value, Value::Array(_)),
        TypeDescriptor::Node(_) => matches!(value, Value::Object(_)),
    }
}

/// Returns `true` if `value` is a live instance of `descriptor` or a subtype.
pub fn is_instance_of(value: &Value, descriptor: &TypeDescriptor) -> bool {
    descriptor.accepts(value)
}

pub fn classify(value: Option<&Value>, descriptor: Option<&TypeDescriptor>) -> Compatibility {
    let Some(descriptor) = descriptor else {
        return Compatibility::Undeclared;
    };
    match value {
        None => Compatibility::Absent,
        Some(Value::Null) => Compatibility::Null,
        Some(value) if is_instance_of(value, descriptor) => Compatibility::Instance,
        Some(value) if can_become(value, descriptor) => Compatibility::Convertible,
        Some(_) => Compatibility::Mismatch,
    }
}
