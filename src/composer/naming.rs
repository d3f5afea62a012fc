//! Component name construction from a resolution context.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::{ComposeError, Result};

/// Separator placed between name parts.
pub const NAME_SEPARATOR: &str = "_";

/// Caller-supplied values used to compute selector names during one resolution pass.
///
/// Values are stored as strings; numbers and booleans are accepted on input and
/// rendered with their usual textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>", into = "BTreeMap<String, String>")]
pub struct Context(BTreeMap<String, String>);

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Overlay `other` on top of this context; `other` wins on conflicts.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Build a context from a mapping of scalar values.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::try_from(map.into_iter().collect::<BTreeMap<_, _>>()),
            Value::Null => Ok(Self::new()),
            _ => Err(ComposeError::InvalidContextValue {
                field: "<root>".to_string(),
            }),
        }
    }
}

impl TryFrom<BTreeMap<String, Value>> for Context {
    type Error = ComposeError;

    fn try_from(values: BTreeMap<String, Value>) -> Result<Self> {
        values
            .into_iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => {
                        return Err(ComposeError::InvalidContextValue { field: key });
                    }
                };
                Ok((key, rendered))
            })
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Self)
    }
}

impl From<Context> for BTreeMap<String, String> {
    fn from(context: Context) -> Self {
        context.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Builds a component name from selected context fields.
///
/// The name is the prefix, the values of `source_fields` in order, and the
/// suffix, joined with `_`. Absent prefix/suffix contribute nothing.
///
/// ```
/// use sbem_compose::composer::{Context, NameConstructor};
///
/// let selector = NameConstructor::new(["typology", "age"]).with_prefix("res");
/// let context: Context = [("typology", "office"), ("age", "1980"), ("extra", "x")]
///     .into_iter()
///     .collect();
/// assert_eq!(selector.construct_name(&context).unwrap(), "res_office_1980");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameConstructor {
    /// Context keys whose values form the name, in order
    #[serde(default)]
    pub source_fields: Vec<String>,
    /// Optional leading part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Optional trailing part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl NameConstructor {
    /// Serialized keys accepted in a selector mapping.
    pub const KEYS: [&'static str; 3] = ["source_fields", "prefix", "suffix"];

    /// A constructor over the given source fields.
    pub fn new<I, S>(source_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_fields: source_fields.into_iter().map(Into::into).collect(),
            prefix: None,
            suffix: None,
        }
    }

    /// Set the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Two-field selector shown in data entry templates.
    #[must_use]
    pub fn example() -> Self {
        Self::new(["source_field_1", "source_field_2"])
    }

    /// Construct the name for `context`.
    ///
    /// Fails with [`ComposeError::MissingContextField`] naming the first absent
    /// source field; nothing is joined in that case.
    pub fn construct_name(&self, context: &Context) -> Result<String> {
        let values = self
            .source_fields
            .iter()
            .map(|field| {
                context.get(field).ok_or_else(|| ComposeError::MissingContextField {
                    field: field.clone(),
                    available: context.keys().map(str::to_string).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let parts: Vec<&str> = self
            .prefix
            .as_deref()
            .into_iter()
            .chain(values)
            .chain(self.suffix.as_deref())
            .collect();

        Ok(parts.join(NAME_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Context {
        [("typology", "office"), ("age", "1980"), ("unused", "ignored")].into_iter().collect()
    }

    #[test]
    fn test_construct_name_joins_in_source_order() {
        let selector = NameConstructor::new(["age", "typology"]);
        assert_eq!(selector.construct_name(&context()).unwrap(), "1980_office");
    }

    #[test]
    fn test_construct_name_with_prefix_and_suffix() {
        let selector = NameConstructor::new(["typology"]).with_prefix("pre").with_suffix("post");
        assert_eq!(selector.construct_name(&context()).unwrap(), "pre_office_post");
    }

    #[test]
    fn test_construct_name_is_deterministic() {
        let selector = NameConstructor::new(["typology", "age"]).with_suffix("v2");
        let first = selector.construct_name(&context()).unwrap();
        let second = selector.construct_name(&context()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_field_reports_first_absent() {
        let selector = NameConstructor::new(["typology", "missing_a", "missing_b"]);
        let err = selector.construct_name(&context()).unwrap_err();
        match err {
            ComposeError::MissingContextField { field, available } => {
                assert_eq!(field, "missing_a");
                assert_eq!(available, vec!["age", "typology", "unused"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_source_fields() {
        assert_eq!(NameConstructor::default().construct_name(&Context::new()).unwrap(), "");
        let prefixed = NameConstructor::default().with_prefix("only");
        assert_eq!(prefixed.construct_name(&Context::new()).unwrap(), "only");
    }

    #[test]
    fn test_context_accepts_scalars() {
        let context = Context::from_value(json!({"age": 10, "heated": true, "name": "a"})).unwrap();
        assert_eq!(context.get("age"), Some("10"));
        assert_eq!(context.get("heated"), Some("true"));
        assert_eq!(context.get("name"), Some("a"));
    }

    #[test]
    fn test_context_rejects_nested_values() {
        let err = Context::from_value(json!({"bad": [1, 2]})).unwrap_err();
        assert_eq!(err, ComposeError::InvalidContextValue { field: "bad".to_string() });
    }

    #[test]
    fn test_selector_deserializes_with_defaults() {
        let selector: NameConstructor =
            serde_yaml::from_str("source_fields: [weatherization]\nsuffix: tight\n").unwrap();
        assert_eq!(selector, NameConstructor::new(["weatherization"]).with_suffix("tight"));
    }
}
