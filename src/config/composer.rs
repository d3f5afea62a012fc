//! Composer settings shared by every CLI command.
//!
//! ```toml
//! library = "library.yaml"        # relative to this file
//! use_grouping_field = false
//! extra_fields = "forbid"         # or "ignore"
//! allow_partial = true
//!
//! [context]
//! typology = "office"
//! climate_zone = 4
//! ```

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::parser::parse_config;
use crate::composer::{Context, ExtraFields, FactoryOptions};

/// Environment variable pointing at a config file.
pub const CONFIG_ENV_VAR: &str = "SBEM_COMPOSE_CONFIG";

/// Config file name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "sbem-compose.toml";

const fn default_allow_partial() -> bool {
    true
}

/// Settings read from `sbem-compose.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComposerConfig {
    /// Component library file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,

    /// Nest child nodes under a `children` key in selector documents
    #[serde(default)]
    pub use_grouping_field: bool,

    /// Handling of unknown keys in selector documents
    #[serde(default)]
    pub extra_fields: ExtraFields,

    /// Allow selector documents to omit child nodes
    #[serde(default = "default_allow_partial")]
    pub allow_partial: bool,

    /// Default context values for name construction
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,

    /// File this config was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            library: None,
            use_grouping_field: false,
            extra_fields: ExtraFields::default(),
            allow_partial: default_allow_partial(),
            context: BTreeMap::new(),
            source: None,
        }
    }
}

impl ComposerConfig {
    /// Load the config in lookup order:
    ///
    /// 1. `explicit` (the `--config` flag), which must exist
    /// 2. [`CONFIG_ENV_VAR`], which must exist
    /// 3. [`PROJECT_CONFIG_FILE`] in the working directory
    /// 4. `~/.sbem-compose/config.toml`
    ///
    /// Falls back to defaults when no optional location exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let cwd = std::env::current_dir()?;
        let user_path = Self::default_path().ok();

        match locate(explicit, env_path.as_deref(), &cwd, user_path.as_deref())? {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load the config from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config: Self = parse_config(path)?;
        debug!("Loaded config from {}", path.display());
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Location of the per-user config file.
    ///
    /// - **Unix/macOS**: `~/.sbem-compose/config.toml`
    /// - **Windows**: `%LOCALAPPDATA%\sbem-compose\config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow!("Unable to determine local data directory"))?
                .join("sbem-compose")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow!("Unable to determine home directory"))?
                .join(".sbem-compose")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// The library path, resolved against the config file's directory.
    #[must_use]
    pub fn library_path(&self) -> Option<PathBuf> {
        let library = self.library.as_ref()?;
        match self.source.as_ref().and_then(|source| source.parent()) {
            Some(dir) if library.is_relative() => Some(dir.join(library)),
            _ => Some(library.clone()),
        }
    }

    /// Default context values as a name-construction [`Context`].
    pub fn context(&self) -> Result<Context> {
        Ok(Context::try_from(self.context.clone())?)
    }

    /// Factory options matching these settings, with the default fetcher registry.
    #[must_use]
    pub fn factory_options(&self) -> FactoryOptions {
        FactoryOptions {
            use_grouping_field: self.use_grouping_field,
            extra_fields: self.extra_fields,
            allow_partial: self.allow_partial,
            ..FactoryOptions::default()
        }
    }
}

fn locate(
    explicit: Option<&Path>,
    env_path: Option<&Path>,
    cwd: &Path,
    user_path: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(path) = env_path {
        if !path.exists() {
            return Err(anyhow!(
                "Config file from {CONFIG_ENV_VAR} not found: {}",
                path.display()
            ));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let project = cwd.join(PROJECT_CONFIG_FILE);
    if project.exists() {
        return Ok(Some(project));
    }

    Ok(user_path.filter(|path| path.exists()).map(Path::to_path_buf))
}
