//! Check a selector document for resolvability without touching a library.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

use super::common::{component_schema, load_tree};
use crate::composer::ResolutionType;
use crate::config::ComposerConfig;
use crate::core::ComposeError;

/// Check that a selector document can resolve.
#[derive(Args)]
pub struct ValidateCommand {
    /// Selector document (YAML, or JSON by extension)
    #[arg(value_name = "TREE")]
    pub tree: PathBuf,

    /// Component type of the document root
    #[arg(long, value_name = "NAME")]
    pub component: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Report format.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// A JSON object with `valid` and `errors`
    Json,
}

impl ValidateCommand {
    pub fn execute(self, config: &ComposerConfig) -> Result<()> {
        let schema = component_schema(self.component.as_deref())?;
        let ty = ResolutionType::for_schema_ref(schema, config.factory_options())?;
        let tree = load_tree(&self.tree, &ty)?;

        let (valid, errors) = tree.validate_successful_resolution(false)?;

        match self.format {
            OutputFormat::Json => {
                let report = json!({"valid": valid, "errors": errors});
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text if valid => {
                println!("{} {} can resolve", "✓".green(), self.tree.display());
            }
            OutputFormat::Text => {
                for path in &errors {
                    println!("{} {}", "✗".red(), path);
                }
            }
        }

        if valid {
            Ok(())
        } else {
            Err(ComposeError::UnresolvableTree { errors }.into())
        }
    }
}
