//! Configuration management for sbem-compose
//!
//! # Modules
//!
//! - `composer` - [`ComposerConfig`], the settings file and its lookup order
//! - `parser` - Generic TOML parsing utilities with error context
//!
//! # Configuration File (`sbem-compose.toml`)
//!
//! ```toml
//! library = "library.yaml"
//! extra_fields = "forbid"
//!
//! [context]
//! typology = "office"
//! ```
//!
//! Command-line flags always take precedence over file settings; `--context`
//! values are layered over the `[context]` table.

mod composer;
mod parser;

pub use composer::{CONFIG_ENV_VAR, ComposerConfig, PROJECT_CONFIG_FILE};
pub use parser::parse_config;
