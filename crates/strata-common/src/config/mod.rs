//! Configuration module
//!
//! Handles loading and parsing of type configuration files (strata.toml, strata.json).

pub mod model;

use crate::error::Result;
use std::path::Path;

pub use self::model::*;

impl StrataConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // Detect format based on extension
        if path.extension().is_some_and(|ext| ext == "json") {
            return Self::from_json_str(&content);
        }

        // Default to TOML
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
