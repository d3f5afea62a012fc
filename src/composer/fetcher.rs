//! Deep fetch of named library records.
//!
//! A [`FetcherRegistry`] hands out one [`DeepFetcher`] per schema type. Fetchers
//! read raw records from a caller-owned [`ComponentStore`] and return them fully
//! hydrated together with a validated instance dump.

use serde_json::{Map, Value};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::schema::{NAME_FIELD, SchemaRef, value_kind};
use crate::core::{ComposeError, Result};

/// Backing store of raw component records.
///
/// The composer never opens or closes stores; it only reads through this trait.
pub trait ComponentStore {
    /// Raw record of `type_name` called `name`, or `None` if there is no such record.
    fn get_record(&self, type_name: &str, name: &str) -> Result<Option<Value>>;
}

/// Result of a deep fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct DeepObject {
    /// The hydrated record as stored
    pub record: Value,
    /// Dump of the validated instance, without null fields
    pub instance: Map<String, Value>,
}

/// Fetches fully hydrated records of one schema type.
pub trait DeepFetcher: Send + Sync {
    /// The schema type this fetcher produces.
    fn schema(&self) -> SchemaRef;

    /// Fetch the record called `name`.
    ///
    /// Fails with [`ComposeError::RecordNotFound`] when no record matches.
    fn get_deep_object(&self, name: &str, store: &dyn ComponentStore) -> Result<DeepObject>;
}

/// Maps schema types to their fetchers.
pub trait FetcherRegistry: Send + Sync {
    /// The fetcher for `schema`.
    fn get_deep_fetcher(&self, schema: SchemaRef) -> Arc<dyn DeepFetcher>;
}

/// Default fetcher: reads the record and hydrates nested references.
///
/// A nested relationship field whose stored value is a string is a reference to
/// another record of the nested type and is replaced by that record, recursively.
#[derive(Debug, Clone, Copy)]
pub struct SchemaFetcher {
    schema: SchemaRef,
}

impl SchemaFetcher {
    /// Fetcher for `schema`.
    #[must_use]
    pub const fn new(schema: SchemaRef) -> Self {
        Self { schema }
    }
}

impl DeepFetcher for SchemaFetcher {
    fn schema(&self) -> SchemaRef {
        self.schema
    }

    fn get_deep_object(&self, name: &str, store: &dyn ComponentStore) -> Result<DeepObject> {
        debug!("Fetching {} record '{}'", self.schema.name(), name);

        let mut visiting = Vec::new();
        let record = Value::Object(hydrate(self.schema, name, store, &mut visiting)?);

        let instance = self.schema.construct(record.clone()).map_err(|reason| {
            ComposeError::ConstructionValidation {
                type_name: self.schema.name().to_string(),
                name: name.to_string(),
                reason,
            }
        })?;

        Ok(DeepObject { record, instance })
    }
}

fn hydrate(
    schema: SchemaRef,
    name: &str,
    store: &dyn ComponentStore,
    visiting: &mut Vec<String>,
) -> Result<Map<String, Value>> {
    let key = format!("{}:{}", schema.name(), name);
    if visiting.contains(&key) {
        let mut chain = visiting.clone();
        chain.push(key);
        return Err(ComposeError::ReferenceCycle { chain });
    }

    let record = store.get_record(schema.name(), name)?.ok_or_else(|| {
        ComposeError::RecordNotFound {
            type_name: schema.name().to_string(),
            name: name.to_string(),
        }
    })?;

    let mut record = match record {
        Value::Object(map) => map,
        other => {
            return Err(ComposeError::InvalidRecord {
                type_name: schema.name().to_string(),
                name: name.to_string(),
                reason: format!("expected a mapping, found {}", value_kind(&other)),
            });
        }
    };
    record.entry(NAME_FIELD).or_insert_with(|| Value::String(name.to_string()));

    visiting.push(key);
    for field in schema.fields() {
        let Some(child) = field.kind.relationship() else {
            continue;
        };
        if let Some(Value::String(reference)) = record.get(field.name) {
            let reference = reference.clone();
            let hydrated = hydrate(child, &reference, store, visiting)?;
            record.insert(field.name.to_string(), Value::Object(hydrated));
        }
    }
    visiting.pop();

    Ok(record)
}

/// Default registry: a [`SchemaFetcher`] for every type, unless overridden.
#[derive(Default, Clone)]
pub struct SchemaFetchers {
    overrides: HashMap<TypeId, Arc<dyn DeepFetcher>>,
}

impl SchemaFetchers {
    /// Registry with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `fetcher` for its schema type instead of the default.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn DeepFetcher>) -> Self {
        self.overrides.insert(fetcher.schema().type_id(), fetcher);
        self
    }
}

impl FetcherRegistry for SchemaFetchers {
    fn get_deep_fetcher(&self, schema: SchemaRef) -> Arc<dyn DeepFetcher> {
        self.overrides
            .get(&schema.type_id())
            .cloned()
            .unwrap_or_else(|| Arc::new(SchemaFetcher::new(schema)))
    }
}

impl std::fmt::Debug for SchemaFetchers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaFetchers").field("overrides", &self.overrides.len()).finish()
    }
}
