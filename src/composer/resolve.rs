//! Select-then-patch resolution of a tree into a component.
//!
//! Children resolve first. A node with a selector fetches its named library
//! record and patches the resolved children into it; a node without one
//! assembles its component from the children alone under a synthesized name.

use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use super::fetcher::ComponentStore;
use super::merge::{mapping_slot, merge_at};
use super::naming::{Context, NAME_SEPARATOR};
use super::schema::{NAME_FIELD, SchemaRef};
use super::tree::NodeView;
use crate::core::{ComposeError, Result};

/// Options for [`NodeView::get_component_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Return the raw mapping instead of failing when construction fails
    pub allow_unvalidated: bool,
    /// Run structural validation before any fetch
    pub do_validate_resolution: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            allow_unvalidated: false,
            do_validate_resolution: true,
        }
    }
}

/// Outcome of resolving a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Dump of a constructed and validated component
    Component(Map<String, Value>),
    /// Mapping that failed construction, passed through under `allow_unvalidated`
    Unvalidated(Map<String, Value>),
}

impl Resolved {
    /// The resolved mapping, validated or not.
    #[must_use]
    pub fn into_mapping(self) -> Map<String, Value> {
        match self {
            Self::Component(mapping) | Self::Unvalidated(mapping) => mapping,
        }
    }

    /// The resolved mapping, validated or not.
    #[must_use]
    pub const fn mapping(&self) -> &Map<String, Value> {
        match self {
            Self::Component(mapping) | Self::Unvalidated(mapping) => mapping,
        }
    }

    /// Check whether construction succeeded.
    #[must_use]
    pub const fn is_validated(&self) -> bool {
        matches!(self, Self::Component(_))
    }
}

pub(crate) fn resolve_node(
    view: NodeView<'_>,
    context: &Context,
    store: &dyn ComponentStore,
    options: ResolveOptions,
) -> Result<Resolved> {
    if options.do_validate_resolution {
        view.validate_successful_resolution(true)?;
    }
    Ok(resolve(view, context, store, options.allow_unvalidated)?.resolved)
}

/// A resolved node together with its resolved children, kept so a parent can
/// patch a raw mapping without flattening the components inside it.
struct Resolution {
    resolved: Resolved,
    children: Vec<(String, Resolution)>,
}

fn resolve(
    view: NodeView<'_>,
    context: &Context,
    store: &dyn ComponentStore,
    allow_unvalidated: bool,
) -> Result<Resolution> {
    let schema = view.schema();
    let component_name = view.selector().map(|selector| selector.construct_name(context)).transpose()?;

    let mut children = Vec::new();
    for (field, child) in view.children() {
        // Children always pass through unvalidated; only the root may fail construction.
        let resolution = resolve(child, context, store, true)?;
        children.push((field.to_string(), resolution));
    }

    let resolved = match component_name {
        None => {
            let name = synthesize_name(schema);
            debug!("No selector for {}, assembling '{}' from {} children", schema.name(), name, children.len());

            let mut mapping = Map::new();
            mapping.insert(NAME_FIELD.to_string(), Value::String(name.clone()));
            for (field, child) in &children {
                mapping.insert(field.clone(), Value::Object(child.resolved.mapping().clone()));
            }
            construct(schema, &name, mapping, allow_unvalidated)?
        }
        Some(name) => {
            let fetcher = view.resolution_type().fetcher_for(view.node().descriptor());
            let deep = fetcher.get_deep_object(&name, store)?;

            let mut base = deep.instance;
            if !children.is_empty() {
                debug!(
                    "Patching {} '{}' with children: {:?}",
                    schema.name(),
                    name,
                    children.iter().map(|(field, _)| field.as_str()).collect::<Vec<_>>()
                );
                patch_children(&mut base, &children, &mut Vec::new())?;
            }
            construct(schema, &name, base, allow_unvalidated)?
        }
    };

    Ok(Resolution { resolved, children })
}

/// Patch resolved children into `base`.
///
/// A validated component replaces the whole sub-object under its field. A raw
/// mapping merges its own keys strictly and patches its children in turn, so
/// components nested inside it still replace whole. A child field missing from
/// `base` was a null optional in the dumped record and is filled in.
fn patch_children(
    base: &mut Map<String, Value>,
    children: &[(String, Resolution)],
    path: &mut Vec<String>,
) -> Result<()> {
    for (field, child) in children {
        path.push(field.clone());
        let slot = base.entry(field.clone()).or_insert(Value::Null);

        match &child.resolved {
            Resolved::Component(component) => *slot = Value::Object(component.clone()),
            Resolved::Unvalidated(mapping) => {
                let target = mapping_slot(slot, path)?;
                let own = mapping
                    .iter()
                    .filter(|(key, _)| !child.children.iter().any(|(nested, _)| nested == *key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                merge_at(target, own, path)?;
                patch_children(target, &child.children, path)?;
            }
        }

        path.pop();
    }
    Ok(())
}

fn construct(
    schema: SchemaRef,
    name: &str,
    mapping: Map<String, Value>,
    allow_unvalidated: bool,
) -> Result<Resolved> {
    match schema.construct(Value::Object(mapping.clone())) {
        Ok(component) => Ok(Resolved::Component(component)),
        Err(reason) if allow_unvalidated => {
            warn!("Passing through unvalidated {} '{}': {}", schema.name(), name, reason);
            Ok(Resolved::Unvalidated(mapping))
        }
        Err(reason) => Err(ComposeError::ConstructionValidation {
            type_name: schema.name().to_string(),
            name: name.to_string(),
            reason,
        }),
    }
}

/// `{TypeName}_{8 hex chars}`, unique per call.
fn synthesize_name(schema: SchemaRef) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}{}{}", schema.name(), NAME_SEPARATOR, &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::resolution::{FactoryOptions, ResolutionType};
    use crate::test_utils::fixtures::{
        LeafComponent, MiddleComponent, RootComponent, fixture_store,
    };
    use serde_json::json;

    fn root_type() -> ResolutionType {
        ResolutionType::for_schema::<RootComponent>(FactoryOptions::default()).unwrap()
    }

    fn context() -> Context {
        [("k", "R1"), ("j", "special_x")].into_iter().collect()
    }

    #[test]
    fn test_root_selector_returns_stored_record() {
        let tree = root_type()
            .parse_value(json!({"selector": {"source_fields": ["k"]}}))
            .unwrap();
        let root: RootComponent = tree.get_component(&context(), &fixture_store()).unwrap();

        assert_eq!(root.name, "R1");
        assert_eq!(root.a.x.name, "AX");
        assert_eq!(root.b.x.name, "BX");
        assert_eq!(root.c.name, "C1");
    }

    #[test]
    fn test_child_selector_patches_only_its_subtree() {
        let tree = root_type()
            .parse_value(json!({
                "selector": {"source_fields": ["k"]},
                "a": {"x": {"selector": {"source_fields": ["j"]}}}
            }))
            .unwrap();
        let root: RootComponent = tree.get_component(&context(), &fixture_store()).unwrap();

        assert_eq!(root.a.x.name, "special_x");
        assert_eq!(root.a.x.value, 9.0);
        assert_eq!(root.b.x.name, "BX");
        assert_eq!(root.c.name, "C1");
    }

    #[test]
    fn test_no_selector_synthesizes_name() {
        let tree = root_type()
            .parse_value(json!({
                "a": {"selector": {"source_fields": ["m"]}},
                "b": {"selector": {"source_fields": ["m"], "suffix": "copy"}},
                "c": {"selector": {"source_fields": ["j"]}}
            }))
            .unwrap();
        let context: Context = [("m", "A1"), ("j", "special_x")].into_iter().collect();
        let root: RootComponent = tree.get_component(&context, &fixture_store()).unwrap();

        assert!(root.name.starts_with("Root_"));
        assert_eq!(root.name.len(), "Root_".len() + 8);
        assert_eq!(root.a.name, "A1");
        assert_eq!(root.b.name, "A1_copy");
        assert_eq!(root.c.name, "special_x");
    }

    #[test]
    fn test_unresolvable_tree_fails_before_fetch() {
        let tree = root_type().parse_value(json!({"a": {}})).unwrap();
        let err = tree
            .get_component::<RootComponent>(&Context::new(), &fixture_store())
            .unwrap_err();
        assert!(matches!(err, ComposeError::UnresolvableTree { ref errors } if errors.len() == 3));
    }

    #[test]
    fn test_missing_context_field_propagates() {
        let tree = root_type()
            .parse_value(json!({"selector": {"source_fields": ["absent"]}}))
            .unwrap();
        let err = tree
            .get_component::<RootComponent>(&context(), &fixture_store())
            .unwrap_err();
        assert!(matches!(err, ComposeError::MissingContextField { ref field, .. } if field == "absent"));
    }

    #[test]
    fn test_missing_record_is_never_downgraded() {
        let tree = root_type()
            .parse_value(json!({
                "selector": {"source_fields": ["k"]},
                "c": {"selector": {"source_fields": ["k"], "suffix": "missing"}}
            }))
            .unwrap();
        let options = ResolveOptions {
            allow_unvalidated: true,
            ..ResolveOptions::default()
        };
        let err = tree.get_component_with(&context(), &fixture_store(), options).unwrap_err();
        assert_eq!(
            err,
            ComposeError::RecordNotFound {
                type_name: "Leaf".to_string(),
                name: "R1_missing".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_child_passes_through_to_parent_merge() {
        // A selector-less Middle has no Label of its own; the parent's record
        // supplies it during the merge.
        let tree = root_type()
            .parse_value(json!({
                "selector": {"source_fields": ["k"]},
                "b": {"x": {"selector": {"source_fields": ["j"]}}}
            }))
            .unwrap();
        let root: RootComponent = tree.get_component(&context(), &fixture_store()).unwrap();

        assert_eq!(root.b.x.name, "special_x");
        assert!(root.b.name.starts_with("Middle_"));
        assert_eq!(root.b.label, "second");
        assert_eq!(root.a.x.name, "AX");
    }

    #[test]
    fn test_unvalidated_root_returns_raw_mapping() {
        let ty = ResolutionType::for_schema::<MiddleComponent>(FactoryOptions::default()).unwrap();
        let tree = ty
            .parse_value(json!({"x": {"selector": {"source_fields": ["leaf"]}}}))
            .unwrap();
        let context: Context = [("leaf", "AX")].into_iter().collect();

        let err = tree
            .get_component_with(&context, &fixture_store(), ResolveOptions::default())
            .unwrap_err();
        assert!(matches!(err, ComposeError::ConstructionValidation { ref type_name, .. } if type_name == "Middle"));

        let options = ResolveOptions {
            allow_unvalidated: true,
            ..ResolveOptions::default()
        };
        let resolved = tree.get_component_with(&context, &fixture_store(), options).unwrap();
        assert!(!resolved.is_validated());
        assert_eq!(resolved.mapping()["x"]["Name"], json!("AX"));
        assert!(resolved.mapping().get("Label").is_none());
    }

    #[test]
    fn test_invalid_library_record_is_a_fetch_error() {
        let ty = ResolutionType::for_schema::<LeafComponent>(FactoryOptions::default()).unwrap();
        let tree = ty.parse_value(json!({"selector": {"source_fields": ["leaf"]}})).unwrap();
        let context: Context = [("leaf", "broken")].into_iter().collect();
        let options = ResolveOptions {
            allow_unvalidated: true,
            ..ResolveOptions::default()
        };
        assert!(tree.get_component_with(&context, &fixture_store(), options).is_err());
    }

    #[test]
    fn test_schema_mismatch() {
        let tree = root_type()
            .parse_value(json!({"selector": {"source_fields": ["k"]}}))
            .unwrap();
        let err = tree
            .get_component::<LeafComponent>(&context(), &fixture_store())
            .unwrap_err();
        assert_eq!(
            err,
            ComposeError::SchemaMismatch {
                expected: "Leaf".to_string(),
                found: "Root".to_string(),
            }
        );
    }

    #[test]
    fn test_subtree_resolves_independently() {
        let tree = root_type()
            .parse_value(json!({
                "selector": {"source_fields": ["k"]},
                "a": {"x": {"selector": {"source_fields": ["j"]}}}
            }))
            .unwrap();
        let x = tree.node("a:x").unwrap();
        let resolved = x
            .get_component_with(&context(), &fixture_store(), ResolveOptions::default())
            .unwrap();
        assert_eq!(resolved.mapping()["Name"], json!("special_x"));
    }
}
