//! Generic configuration parsing utilities.
//!
//! TOML parsing for any `DeserializeOwned` type, with the file path attached to
//! read and parse failures.
//!
//! ```rust,no_run
//! use sbem_compose::config::{ComposerConfig, parse_config};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config: ComposerConfig = parse_config(Path::new("sbem-compose.toml"))?;
//! println!("Library: {:?}", config.library);
//! # Ok(())
//! # }
//! ```
//!
//! Example error output:
//! ```text
//! Failed to parse config file: /path/to/sbem-compose.toml
//! Caused by:
//!     unknown variant `strict`, expected `ignore` or `forbid`
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents do not
/// deserialize into `T`. Both carry the file path as context.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        use tempfile::tempdir;

        let temp = tempdir().unwrap();
        let config_path = temp.path().join("test.toml");

        #[derive(Debug, serde::Deserialize)]
        struct TestConfig {
            library: String,
            allow_partial: bool,
        }

        let toml_content = r#"
            library = "zones.yaml"
            allow_partial = false
        "#;

        std::fs::write(&config_path, toml_content).unwrap();

        let config: TestConfig = parse_config(&config_path).unwrap();
        assert_eq!(config.library, "zones.yaml");
        assert!(!config.allow_partial);
    }

    #[test]
    fn test_parse_config_error() {
        use tempfile::tempdir;

        let temp = tempdir().unwrap();
        let config_path = temp.path().join("invalid.toml");

        #[derive(Debug, serde::Deserialize)]
        struct TestConfig {
            #[allow(dead_code)] // Only deserialized
            library: String,
        }

        let invalid_toml = "library = toml {";
        std::fs::write(&config_path, invalid_toml).unwrap();

        let result: Result<TestConfig> = parse_config(&config_path);
        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));

        let missing: Result<TestConfig> = parse_config(&temp.path().join("missing.toml"));
        assert!(missing.unwrap_err().to_string().starts_with("Failed to read config file"));
    }
}
