use anyhow::Result;
use std::path::Path;
use strata_common::TypeRegistry;

/// One line per type, followed by indented lines for its nested attributes
/// and required attributes.
pub fn describe_types(registry: &TypeRegistry) -> Vec<String> {
    let mut lines = Vec::new();

    for (name, entry) in registry.nodes() {
        let mut header = format!("node {name}");
        if let Some(parent) = &entry.extends {
            header.push_str(&format!(" extends {parent}"));
        }
        if registry.root_name() == Some(name) {
            header.push_str(" (root)");
        }
        lines.push(header);

        for (attribute, type_name) in &entry.nested {
            let kind = match registry.descriptor(type_name) {
                Some(descriptor) => descriptor.to_string(),
                None => type_name.clone(),
            };
            lines.push(format!("  {attribute}: {kind}"));
        }
        if !entry.required.is_empty() {
            lines.push(format!("  required: {}", entry.required.join(", ")));
        }
    }

    for (name, kind) in registry.groups() {
        let mut header = format!("group {name} of {}", kind.member().name());
        if let Some(parent) = kind.parent() {
            header.push_str(&format!(" extends {}", parent.name()));
        }
        lines.push(header);
    }

    lines
}

/// Runs `strata types`.
pub fn run_types(config: &Path) -> Result<Option<u8>> {
    let registry = super::load_registry(config)?;
    for line in describe_types(&registry) {
        println!("{line}");
    }
    Ok(None)
}
