//! Error types for configuration loading and type registration

use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown type '{name}' referenced by {referenced_by}")]
    UnknownType { name: String, referenced_by: String },

    #[error("Type '{0}' is declared both as a node type and as a group type")]
    DuplicateType(String),

    #[error("Inheritance cycle through '{0}'")]
    ExtendsCycle(String),

    #[error("'{name}' is a {found} type, but {referenced_by} needs a {expected} type")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
        referenced_by: String,
    },

    #[error("Group type '{0}' has no member type and extends no group")]
    MissingMember(String),
}
