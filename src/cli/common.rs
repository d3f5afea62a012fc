//! Helpers shared by the subcommands.

use anyhow::{Context as _, Result, anyhow};
use std::fs;
use std::path::Path;

use crate::components::{DEFAULT_ROOT, all_schemas, schema_by_name};
use crate::composer::{ResolutionTree, ResolutionType, SchemaRef};
use crate::core::suggest::{find_similar_names, format_suggestions};
pub use crate::library::is_json;

/// Look up a component type by name, defaulting to the zone.
pub fn component_schema(name: Option<&str>) -> Result<SchemaRef> {
    let name = name.unwrap_or(DEFAULT_ROOT);
    schema_by_name(name).ok_or_else(|| {
        let schemas = all_schemas();
        let suggestions = find_similar_names(name, schemas.iter().map(SchemaRef::name));
        anyhow!(
            "Unknown component type '{name}'{}",
            format_suggestions(&suggestions)
        )
    })
}

/// Read and parse a selector document, JSON or YAML by extension.
pub fn load_tree(path: &Path, ty: &ResolutionType) -> Result<ResolutionTree> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read selector document: {}", path.display()))?;

    let tree = if is_json(path) {
        ty.parse_json(&content)
    } else {
        ty.parse_yaml(&content)
    };
    tree.with_context(|| format!("Failed to parse selector document: {}", path.display()))
}

/// Parse a `KEY=VALUE` pair for `--context`.
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
