//! Command-line interface for sbem-compose.
//!
//! # Commands
//!
//! - `graph` - Print the schema graph of a component type
//! - `template` - Print an example selector document
//! - `validate` - Check that a selector document can resolve
//! - `resolve` - Resolve a selector document against a component library
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Enable debug logging
//! - `--quiet` / `-q` - Disable logging
//! - `--config` / `-c` - Path to a config file (see [`crate::config`])
//!
//! # Example
//!
//! ```bash
//! sbem-compose template --component Lighting
//! sbem-compose validate tree.yaml
//! sbem-compose resolve tree.yaml --library library.yaml --context typology=office
//! ```

mod common;
mod graph;
mod resolve;
mod template;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ComposerConfig;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging
    pub log_level: Option<String>,
    /// Explicit config file path
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Top-level parser.
#[derive(Parser)]
#[command(
    name = "sbem-compose",
    about = "Compose building energy model components from selector trees",
    version,
    long_about = "sbem-compose picks zone components from a library by context-driven names \
                  and patches them with more specific picks further down a selector tree."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to a config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema graph of a component type
    Graph(graph::GraphCommand),

    /// Print an example selector document
    Template(template::TemplateCommand),

    /// Check that a selector document can resolve
    Validate(validate::ValidateCommand),

    /// Resolve a selector document against a component library
    Resolve(resolve::ResolveCommand),
}

impl Cli {
    /// Run the selected command.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Derive runtime settings from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with explicit settings.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let composer_config = ComposerConfig::load(config.config_path.as_deref())?;

        match self.command {
            Commands::Graph(cmd) => cmd.execute(),
            Commands::Template(cmd) => cmd.execute(&composer_config),
            Commands::Validate(cmd) => cmd.execute(&composer_config),
            Commands::Resolve(cmd) => cmd.execute(&composer_config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_log_levels() {
        let cli = Cli::parse_from(["sbem-compose", "graph"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("info"));

        let cli = Cli::parse_from(["sbem-compose", "-v", "graph"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::parse_from(["sbem-compose", "graph", "--quiet"]);
        assert!(cli.build_config().log_level.is_none());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["sbem-compose", "-v", "-q", "graph"]).is_err());
    }

    #[test]
    fn test_config_flag() {
        let cli = Cli::parse_from(["sbem-compose", "--config", "custom.toml", "graph"]);
        assert_eq!(cli.build_config().config_path, Some(PathBuf::from("custom.toml")));
    }
}
