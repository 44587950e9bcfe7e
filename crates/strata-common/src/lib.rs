//! Strata common
//!
//! Type configuration files and the registry that turns them into live
//! [`strata_core`] node and group types.

pub mod config;
pub mod error;
pub mod registry;

pub use config::{GroupTypeSpec, NodeTypeSpec, StrataConfig};
pub use error::{ConfigError, Result};
pub use registry::{NodeEntry, RequiredAttributes, TypeRegistry};
