pub mod check;
pub mod types;

pub use check::*;
pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::rc::Rc;
use strata_common::TypeRegistry;
use tracing::debug;

/// Loads the type configuration at `path` and builds its registry.
pub(crate) fn load_registry(path: &Path) -> Result<Rc<TypeRegistry>> {
    debug!("Loading type configuration from {:?}", path);
    TypeRegistry::load(path)
        .with_context(|| format!("Failed to load type configuration {}", path.display()))
}
