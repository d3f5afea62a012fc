//! Strict recursive merge of child selections into library records.
//!
//! The base mapping always comes from a fully specified library record, so every
//! key a patch may touch already exists. A patch key missing from the base is an
//! error rather than a silent insertion.

use serde_json::{Map, Value};

use crate::core::suggest::find_similar_names;
use crate::core::{ComposeError, Result};

/// Merge `patch` into `base` in place and return `base`.
///
/// - A patch key absent from `base` fails with [`ComposeError::UnknownMergeKey`].
/// - A mapping patch value recurses into the base value; a null base value is
///   treated as an empty mapping, any other non-mapping base value fails with
///   [`ComposeError::MergeTypeMismatch`].
/// - Any other patch value overwrites the base value.
///
/// On error `base` may already contain the patch entries processed before the
/// failing key.
pub fn recursive_dict_merge(
    base: &mut Map<String, Value>,
    patch: Map<String, Value>,
) -> Result<&mut Map<String, Value>> {
    let mut path = Vec::new();
    merge_at(base, patch, &mut path)?;
    Ok(base)
}

/// Same as [`recursive_dict_merge`], with `path` naming where `base` sits
/// inside the record being patched.
pub(super) fn merge_at(
    base: &mut Map<String, Value>,
    patch: Map<String, Value>,
    path: &mut Vec<String>,
) -> Result<()> {
    for (key, value) in patch {
        path.push(key.clone());

        let Some(slot) = base.get_mut(&key) else {
            return Err(ComposeError::UnknownMergeKey {
                path: path.join(":"),
                suggestions: find_similar_names(&key, base.keys().map(String::as_str)),
            });
        };

        match value {
            Value::Object(nested) => {
                let target = mapping_slot(slot, path)?;
                merge_at(target, nested, path)?;
            }
            other => *slot = other,
        }

        path.pop();
    }
    Ok(())
}

/// The mapping held by `slot`, turning a null into an empty mapping.
pub(super) fn mapping_slot<'a>(
    slot: &'a mut Value,
    path: &[String],
) -> Result<&'a mut Map<String, Value>> {
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(target) => Ok(target),
        _ => Err(ComposeError::MergeTypeMismatch { path: path.join(":") }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_merge_overwrites_and_recurses() {
        let mut base = object(json!({
            "Name": "R1",
            "a": {"Name": "A1", "x": {"Name": "AX", "Value": 1.0}},
            "b": {"Name": "B1"}
        }));
        let patch = object(json!({"a": {"x": {"Name": "special_x"}}}));

        let merged = recursive_dict_merge(&mut base, patch).unwrap();
        assert_eq!(
            Value::Object(merged.clone()),
            json!({
                "Name": "R1",
                "a": {"Name": "A1", "x": {"Name": "special_x", "Value": 1.0}},
                "b": {"Name": "B1"}
            })
        );
        assert_eq!(base["a"]["x"]["Name"], json!("special_x"));
    }

    #[test]
    fn test_merge_rejects_unknown_top_level_key() {
        let mut base = object(json!({"Name": "R1"}));
        let err = recursive_dict_merge(&mut base, object(json!({"Nmae": "x"}))).unwrap_err();
        assert_eq!(
            err,
            ComposeError::UnknownMergeKey {
                path: "Nmae".to_string(),
                suggestions: vec!["Name".to_string()],
            }
        );
    }

    #[test]
    fn test_merge_rejects_unknown_nested_key() {
        let mut base = object(json!({"a": {"b": {"c": 1}}}));
        let err = recursive_dict_merge(&mut base, object(json!({"a": {"b": {"zzz": 2}}}))).unwrap_err();
        assert!(matches!(err, ComposeError::UnknownMergeKey { ref path, .. } if path == "a:b:zzz"));
    }

    #[test]
    fn test_merge_into_scalar_is_type_mismatch() {
        let mut base = object(json!({"a": 3}));
        let err = recursive_dict_merge(&mut base, object(json!({"a": {"b": 1}}))).unwrap_err();
        assert_eq!(err, ComposeError::MergeTypeMismatch { path: "a".to_string() });
    }

    #[test]
    fn test_merge_into_null_treats_base_as_empty() {
        let mut base = object(json!({"a": null}));
        recursive_dict_merge(&mut base, object(json!({"a": {}}))).unwrap();
        assert_eq!(base["a"], json!({}));

        let err = recursive_dict_merge(&mut base, object(json!({"a": {"b": 1}}))).unwrap_err();
        assert!(matches!(err, ComposeError::UnknownMergeKey { .. }));
    }

    #[test]
    fn test_non_mapping_patch_replaces_mapping() {
        let mut base = object(json!({"a": {"b": 1}}));
        recursive_dict_merge(&mut base, object(json!({"a": [1, 2]}))).unwrap();
        assert_eq!(base["a"], json!([1, 2]));
    }
}
