//! Strata core
//!
//! Typed attribute trees. A [`Node`] holds a flat map of attributes; some
//! attributes are declared to hold nested nodes or [`Group`]s of nodes. The
//! [`NestedTypes`] extension turns raw structural data into those nested
//! instances on parse, turns them back into plain data on serialize, and runs
//! their validators on validate.
//!
//! Node types are assembled from a base [`Behavior`] and any number of
//! [`Extension`] layers:
//!
//! ```
//! use strata_core::{NestedTypes, Node, NodeType, Options, declare};
//! use serde_json::json;
//!
//! let bottom = NodeType::plain("Bottom");
//! let top = NodeType::builder("Top")
//!     .layer(NestedTypes)
//!     .nested(declare([("bottom", &bottom)]))
//!     .build();
//!
//! let node = Node::from_json(&top, json!({"bottom": {"foo": "bar"}}), &Options::parsed()).unwrap();
//! assert!(node.get("bottom").unwrap().as_node().is_some());
//! assert_eq!(node.to_json(&Options::default()).unwrap(), json!({"bottom": {"foo": "bar"}}));
//! ```

pub mod chain;
pub mod classify;
pub mod declaration;
pub mod error;
pub mod group;
pub mod node;
pub mod options;
pub mod outcome;
pub mod value;
pub mod walker;

pub use chain::{Behavior, Extension, Layer, Next, PlainBehavior};
pub use classify::{Compatibility, can_become, classify, is_instance_of};
pub use declaration::{
    Computed, Constant, DeclarationSource, TypeDescriptor, TypeMap, declare, resolve_declaration,
};
pub use error::{Error, Result};
pub use group::{Group, GroupRef, GroupType};
pub use node::{Node, NodeRef, NodeType, NodeTypeBuilder};
pub use options::Options;
pub use outcome::{NestedReport, Outcome, ValidationError};
pub use value::{Attributes, Value, attributes_from_json};
pub use walker::{NestedTypes, validate_report};
