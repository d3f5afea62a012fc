//! In-memory component library
//!
//! A library document maps schema type names to named records:
//!
//! ```yaml
//! Lighting:
//!   office:
//!     PowerDensity: 10.0
//!     DimmingType: Continuous
//!     Schedule: office_year   # reference to a Year record
//!     IsOn: true
//! ```
//!
//! A record's `Name` defaults to its key. Nested component fields may hold the
//! name of another record of the nested type; the fetcher hydrates those
//! references, the store only hands out raw records.

use anyhow::{Context as _, Result as AnyResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::composer::{ComponentStore, NAME_FIELD};
use crate::core::{ComposeError, Result};

/// Records keyed by type name, then record name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryStore {
    records: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Check whether `path` has a `.json` extension.
#[must_use]
pub fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl LibraryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML library document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(value)
    }

    /// Parse a JSON library document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Build a store from an already parsed library document.
    ///
    /// An empty (null) document yields an empty store.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut store = Self::new();
        let sections = match value {
            Value::Object(sections) => sections,
            Value::Null => return Ok(store),
            _ => {
                return Err(ComposeError::Serialization(
                    "a library document must map component types to records".to_string(),
                ));
            }
        };

        for (type_name, section) in sections {
            let Value::Object(records) = section else {
                if section.is_null() {
                    continue;
                }
                return Err(ComposeError::InvalidRecord {
                    type_name,
                    name: "*".to_string(),
                    reason: "a component type section must map record names to records".to_string(),
                });
            };
            for (name, record) in records {
                store.insert(&type_name, &name, record)?;
            }
        }
        Ok(store)
    }

    /// Load a library file, choosing the format from its extension.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn load(path: &Path) -> AnyResult<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read library file: {}", path.display()))?;

        let store = if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .with_context(|| format!("Failed to parse library file: {}", path.display()))?;

        debug!("Loaded {} records from {}", store.len(), path.display());
        Ok(store)
    }

    /// Add a record. Its `Name` defaults to `name` when the record is a mapping.
    pub fn insert(&mut self, type_name: &str, name: &str, record: Value) -> Result<()> {
        let section = self.records.entry(type_name.to_string()).or_default();
        if section.contains_key(name) {
            return Err(ComposeError::DuplicateRecord {
                type_name: type_name.to_string(),
                name: name.to_string(),
            });
        }

        let record = match record {
            Value::Object(mut map) => {
                map.entry(NAME_FIELD).or_insert_with(|| Value::String(name.to_string()));
                Value::Object(map)
            }
            Value::Null => {
                let mut map = Map::new();
                map.insert(NAME_FIELD.to_string(), Value::String(name.to_string()));
                Value::Object(map)
            }
            other => other,
        };
        section.insert(name.to_string(), record);
        Ok(())
    }

    /// Move every record of `other` into this store.
    ///
    /// Fails on the first record both stores define; records merged before it
    /// stay in place.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        for (type_name, records) in other.records {
            for (name, record) in records {
                self.insert(&type_name, &name, record)?;
            }
        }
        Ok(())
    }

    /// The raw record, if present.
    #[must_use]
    pub fn get(&self, type_name: &str, name: &str) -> Option<&Value> {
        self.records.get(type_name).and_then(|section| section.get(name))
    }

    /// Type names with at least one record, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|(_, section)| !section.is_empty())
            .map(|(type_name, _)| type_name.as_str())
    }

    /// Record names of one type, sorted.
    pub fn record_names(&self, type_name: &str) -> Vec<&str> {
        self.records
            .get(type_name)
            .map(|section| section.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ComponentStore for LibraryStore {
    fn get_record(&self, type_name: &str, name: &str) -> Result<Option<Value>> {
        Ok(self.get(type_name, name).cloned())
    }
}
