//! Resolve a selector document against a component library.
//!
//! Context values are layered, later sources winning:
//!
//! 1. `[context]` in the config file
//! 2. `--context-file` (YAML, or JSON by extension)
//! 3. `--context KEY=VALUE` flags, in order

use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::common::{component_schema, is_json, load_tree, parse_key_value};
use crate::composer::{Context, ResolutionType, ResolveOptions, Resolved};
use crate::config::ComposerConfig;
use crate::library::LibraryStore;

/// Resolve a selector document against a component library.
#[derive(Args)]
pub struct ResolveCommand {
    /// Selector document (YAML, or JSON by extension)
    #[arg(value_name = "TREE")]
    pub tree: PathBuf,

    /// Component library file; defaults to `library` from the config file
    #[arg(long, value_name = "FILE")]
    pub library: Option<PathBuf>,

    /// Context value used to construct component names
    #[arg(long = "context", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub context: Vec<(String, String)>,

    /// File with context values
    #[arg(long, value_name = "FILE")]
    pub context_file: Option<PathBuf>,

    /// Component type of the document root
    #[arg(long, value_name = "NAME")]
    pub component: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: ResolveFormat,

    /// Print the raw mapping when the root component fails validation
    #[arg(long)]
    pub allow_unvalidated: bool,
}

/// Output format of the resolved component.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ResolveFormat {
    Yaml,
    Json,
}

impl ResolveCommand {
    pub fn execute(self, config: &ComposerConfig) -> Result<()> {
        let schema = component_schema(self.component.as_deref())?;
        let ty = ResolutionType::for_schema_ref(schema, config.factory_options())?;
        let tree = load_tree(&self.tree, &ty)?;

        let library_path = self.library.clone().or_else(|| config.library_path()).ok_or_else(|| {
            anyhow!("No component library given; pass --library or set `library` in the config file")
        })?;
        let store = LibraryStore::load(&library_path)?;
        let context = self.build_context(config)?;

        let options = ResolveOptions {
            allow_unvalidated: self.allow_unvalidated,
            ..ResolveOptions::default()
        };
        let resolved = tree
            .get_component_with(&context, &store, options)
            .with_context(|| format!("Failed to resolve {}", self.tree.display()))?;

        if let Resolved::Unvalidated(_) = &resolved {
            eprintln!(
                "{}: the resolved {} did not pass validation; printing the raw mapping",
                "warning".yellow().bold(),
                schema.name()
            );
        } else {
            info!("Resolved {} from {}", schema.name(), library_path.display());
        }

        let value = Value::Object(resolved.into_mapping());
        let output = match self.format {
            ResolveFormat::Yaml => serde_yaml::to_string(&value)?,
            ResolveFormat::Json => format!("{}\n", serde_json::to_string_pretty(&value)?),
        };
        print!("{output}");
        Ok(())
    }

    fn build_context(&self, config: &ComposerConfig) -> Result<Context> {
        let mut context = config.context()?;
        if let Some(path) = &self.context_file {
            context.extend(load_context_file(path)?);
        }
        context.extend(self.context.iter().cloned().collect());
        Ok(context)
    }
}

fn load_context_file(path: &Path) -> Result<Context> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;

    let value: Value = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Context::from_value(value).with_context(|| format!("Invalid context file: {}", path.display()))
}
