use anyhow::{Context, Result, anyhow};
use std::io::Read;
use std::path::{Path, PathBuf};
use strata_common::TypeRegistry;
use strata_core::{Error, Node, Options, ValidationError};
use tracing::{debug, info};

/// Exit code for a document that parsed but failed validation.
pub const EXIT_INVALID: u8 = 1;
/// Exit code for a document whose shape does not fit its declared types.
pub const EXIT_REJECTED: u8 = 2;

#[derive(Debug, Clone)]
pub struct CheckArgs {
    /// Type configuration (TOML, or JSON by extension)
    pub config: PathBuf,
    /// Node type to read the document as; the configured root when `None`
    pub type_name: Option<String>,
    /// Validate only the top-level node
    pub no_nested: bool,
    /// JSON document, or `-` for stdin
    pub input: PathBuf,
}

/// Result of checking one document.
#[derive(Debug)]
pub enum CheckReport {
    /// The document is valid; holds its serialized form.
    Valid(serde_json::Value),
    /// The document parsed but a validator rejected it.
    Invalid(ValidationError),
    /// The document could not be parsed into its declared types.
    Rejected(Error),
}

impl CheckReport {
    pub fn exit_code(&self) -> Option<u8> {
        match self {
            CheckReport::Valid(_) => None,
            CheckReport::Invalid(_) => Some(EXIT_INVALID),
            CheckReport::Rejected(_) => Some(EXIT_REJECTED),
        }
    }
}

/// Parses `document` as `type_name` (or the registry's root type), validates
/// it and serializes it back.
pub fn check_document(
    registry: &TypeRegistry,
    type_name: Option<&str>,
    document: serde_json::Value,
    validate_nested: bool,
) -> Result<CheckReport> {
    let kind = match type_name {
        Some(name) => registry
            .node_type(name)
            .ok_or_else(|| anyhow!("Unknown node type '{}'", name))?,
        None => registry
            .root_type()
            .ok_or_else(|| anyhow!("No type given and the configuration declares no root"))?,
    };
    debug!("Checking document as {}", kind.name());

    let node = match Node::from_json(kind, document, &Options::parsed()) {
        Ok(node) => node,
        Err(
            err @ (Error::TypeMismatch { .. }
            | Error::InvalidMember { .. }
            | Error::InvalidInput { .. }),
        ) => return Ok(CheckReport::Rejected(err)),
        Err(err) => return Err(err.into()),
    };

    let options = if validate_nested {
        Options::default()
    } else {
        Options::default().skip_nested()
    };
    if let Some(error) = node.validate(None, &options)? {
        return Ok(CheckReport::Invalid(error));
    }

    info!("Document is a valid {}", kind.name());
    Ok(CheckReport::Valid(node.to_json(&options)?))
}

/// Runs `strata check`, printing the serialized document or the failure.
pub fn run_check(args: &CheckArgs) -> Result<Option<u8>> {
    let registry = super::load_registry(&args.config)?;
    let document = read_document(&args.input)?;

    let report = check_document(
        &registry,
        args.type_name.as_deref(),
        document,
        !args.no_nested,
    )?;
    match &report {
        CheckReport::Valid(json) => println!("{}", serde_json::to_string_pretty(json)?),
        CheckReport::Invalid(error) => eprintln!("Validation failed: {}", error),
        CheckReport::Rejected(error) => eprintln!("Document rejected: {}", error),
    }
    Ok(report.exit_code())
}

fn read_document(input: &Path) -> Result<serde_json::Value> {
    let content = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read document from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read document {}", input.display()))?
    };
    serde_json::from_str(&content).context("Document is not valid JSON")
}
