//! Resolution through the public composer API.

use sbem_compose::components::ZoneComponent;
use sbem_compose::composer::{
    ComponentStore, Context, DeepFetcher, DeepObject, ExtraFields, FactoryOptions, ResolutionType,
    ResolveOptions, SchemaFetcher, SchemaFetchers, SchemaRef, recursive_dict_merge,
};
use sbem_compose::core::ComposeError;
use sbem_compose::library::LibraryStore;
use sbem_compose::test_utils::fixtures::{
    FileFixture, LeafComponent, RootComponent, fixture_store, root_tree,
};
use sbem_compose::test_utils::init_test_logging;
use serde_json::{Map, Value, json};
use std::sync::Arc;

fn context() -> Context {
    [("k", "R1"), ("j", "special_x")].into_iter().collect()
}

#[test]
fn test_root_selector_picks_library_record() {
    init_test_logging(None);

    let tree = root_tree(json!({"selector": {"source_fields": ["k"]}}));
    let root: RootComponent = tree.get_component(&context(), &fixture_store()).unwrap();

    assert_eq!(root.name, "R1");
    assert_eq!(root.a.x.name, "AX");
    assert_eq!(root.b.name, "B1");
    assert_eq!(root.c.name, "C1");
}

#[test]
fn test_selected_record_resolves_to_its_stored_form() {
    let store = fixture_store();
    let tree = root_tree(json!({"selector": {"source_fields": ["k"]}}));
    let resolved = tree
        .get_component_with(&context(), &store, ResolveOptions::default())
        .unwrap();

    let stored = SchemaFetcher::new(SchemaRef::of::<RootComponent>())
        .get_deep_object("R1", &store)
        .unwrap();
    assert!(resolved.is_validated());
    assert_eq!(resolved.into_mapping(), stored.instance);
}

#[test]
fn test_child_selection_wins_over_library_record() {
    let tree = root_tree(json!({
        "selector": {"source_fields": ["k"]},
        "a": {"x": {"selector": {"source_fields": ["j"]}}}
    }));
    let root: RootComponent = tree.get_component(&context(), &fixture_store()).unwrap();

    assert_eq!(root.a.x.name, "special_x");
    assert_eq!(root.a.x.value, 9.0);
    assert!(root.a.name.starts_with("Middle_"));
    assert_eq!(root.a.label, "first");
    assert_eq!(root.b.x.name, "BX");
}

#[test]
fn test_grouping_documents_resolve_the_same() {
    let options = FactoryOptions {
        use_grouping_field: true,
        extra_fields: ExtraFields::Forbid,
        ..FactoryOptions::default()
    };
    let ty = ResolutionType::for_schema::<RootComponent>(options).unwrap();
    let tree = ty
        .parse_yaml(
            r#"
selector:
  source_fields: [k]
children:
  a:
    children:
      x:
        selector:
          source_fields: [j]
"#,
        )
        .unwrap();

    let grouped: RootComponent = tree.get_component(&context(), &fixture_store()).unwrap();
    let flat: RootComponent = root_tree(json!({
        "selector": {"source_fields": ["k"]},
        "a": {"x": {"selector": {"source_fields": ["j"]}}}
    }))
    .get_component(&context(), &fixture_store())
    .unwrap();
    // Selector-less nodes carry a fresh synthesized name on every resolution.
    assert!(grouped.a.name.starts_with("Middle_"));
    assert_eq!(grouped.name, flat.name);
    assert_eq!(grouped.a.x, flat.a.x);
    assert_eq!(grouped.a.label, flat.a.label);
    assert_eq!(grouped.b, flat.b);
    assert_eq!(grouped.c, flat.c);
}

#[test]
fn test_unresolvable_tree_fails_before_any_fetch() {
    // An empty store would fail on the first fetch; validation must come first.
    let tree = root_tree(json!({"a": {"selector": {"source_fields": ["k"]}}, "b": {}}));
    let err = tree
        .get_component::<RootComponent>(&context(), &LibraryStore::new())
        .unwrap_err();

    assert_eq!(
        err,
        ComposeError::UnresolvableTree {
            errors: vec![
                "b:x:NodeNotSpecified".to_string(),
                "c:NodeNotSpecified".to_string(),
            ],
        }
    );
}

#[test]
fn test_template_parses_back_as_resolvable_tree() {
    let ty = ResolutionType::for_schema::<RootComponent>(FactoryOptions::default()).unwrap();
    let template = ty.create_data_entry_template().unwrap();
    assert!(template.contains("source_field_1"));

    let tree = ty.parse_yaml(&template).unwrap();
    assert_eq!(tree.validate_successful_resolution(false).unwrap(), (true, Vec::new()));

    let leaf_template = tree.node("a:x").unwrap().create_data_entry_template().unwrap();
    let leaf_type = ResolutionType::for_schema::<LeafComponent>(FactoryOptions::default()).unwrap();
    assert!(leaf_type.parse_yaml(&leaf_template).is_ok());
}

struct ConstantLeafFetcher;

impl DeepFetcher for ConstantLeafFetcher {
    fn schema(&self) -> SchemaRef {
        SchemaRef::of::<LeafComponent>()
    }

    fn get_deep_object(
        &self,
        name: &str,
        _store: &dyn ComponentStore,
    ) -> sbem_compose::core::Result<DeepObject> {
        let record = json!({"Name": name, "Value": 100.0});
        let instance = self
            .schema()
            .construct(record.clone())
            .map_err(ComposeError::Serialization)?;
        Ok(DeepObject { record, instance })
    }
}

#[test]
fn test_custom_fetcher_is_used_for_its_schema() {
    let options = FactoryOptions {
        registry: Arc::new(SchemaFetchers::new().with_fetcher(Arc::new(ConstantLeafFetcher))),
        ..FactoryOptions::default()
    };
    let ty = ResolutionType::for_schema::<RootComponent>(options).unwrap();
    let tree = ty
        .parse_value(json!({
            "selector": {"source_fields": ["k"]},
            "c": {"selector": {"source_fields": ["j"]}}
        }))
        .unwrap();
    assert_eq!(
        tree.node("c").unwrap().get_deep_fetcher().schema(),
        SchemaRef::of::<LeafComponent>()
    );

    let root: RootComponent = tree.get_component(&context(), &fixture_store()).unwrap();
    assert_eq!(root.c.name, "special_x");
    assert_eq!(root.c.value, 100.0);
    assert_eq!(root.a.x.value, 1.0);
}

#[test]
fn test_merge_rejects_unknown_keys_at_depth() {
    let mut base: Map<String, Value> =
        serde_json::from_value(json!({"a": {"x": {"Value": 1.0}}})).unwrap();
    let patch: Map<String, Value> =
        serde_json::from_value(json!({"a": {"x": {"Valeu": 2.0}}})).unwrap();

    let err = recursive_dict_merge(&mut base, patch).unwrap_err();
    assert_eq!(
        err,
        ComposeError::UnknownMergeKey {
            path: "a:x:Valeu".to_string(),
            suggestions: vec!["Value".to_string()],
        }
    );
}

#[test]
fn test_zone_library_with_lighting_override() {
    let store = LibraryStore::from_yaml_str(&FileFixture::zone_library().content).unwrap();
    let ty = ResolutionType::for_schema::<ZoneComponent>(FactoryOptions::default()).unwrap();
    let tree = ty.parse_yaml(&FileFixture::zone_tree().content).unwrap();

    let mut context: Context = [("typology", "office")].into_iter().collect();
    let err = tree.get_component::<ZoneComponent>(&context, &store).unwrap_err();
    assert!(matches!(err, ComposeError::MissingContextField { ref field, .. } if field == "lighting_type"));

    context.insert("lighting_type", "led");
    let zone: ZoneComponent = tree.get_component(&context, &store).unwrap();
    assert_eq!(zone.name, "office");
    assert_eq!(zone.operations.space_use.lighting.name, "office_led");
    assert_eq!(zone.operations.hvac.ventilation.name, "natural");
    assert_eq!(zone.envelope.infiltration.infiltration_ach, 0.8);
}

const PLANT_RECORDS: &str = r#"
ThermalSystem:
  chiller:
    ConditioningType: Cooling
    Fuel: Electricity
    SystemCOP: 3.2
    DistributionCOP: 0.9
ConditioningSystems:
  dual:
    Heating: gas_boiler
    Cooling: chiller
HVAC:
  dual:
    ConditioningSystems: dual
    Ventilation: natural
Operations:
  dual:
    SpaceUse: office
    HVAC: dual
    DHW: gas_tank
Zone:
  dual:
    Operations: dual
    Envelope: masonry
"#;

const PLANT_TREE: &str = r#"
selector:
  source_fields: [zone]
Operations:
  HVAC:
    ConditioningSystems:
      selector:
        source_fields: [plant]
"#;

#[test]
fn test_patched_subobject_equals_independent_child() {
    let mut store = LibraryStore::from_yaml_str(&FileFixture::zone_library().content).unwrap();
    store.merge(LibraryStore::from_yaml_str(PLANT_RECORDS).unwrap()).unwrap();
    let ty = ResolutionType::for_schema::<ZoneComponent>(FactoryOptions::default()).unwrap();
    let tree = ty.parse_yaml(PLANT_TREE).unwrap();

    for (zone, plant) in [("office", "dual"), ("dual", "boiler_only"), ("dual", "dual")] {
        let context: Context = [("zone", zone), ("plant", plant)].into_iter().collect();
        let resolved = tree
            .get_component_with(&context, &store, ResolveOptions::default())
            .unwrap()
            .into_mapping();
        let child = tree
            .node("Operations:HVAC:ConditioningSystems")
            .unwrap()
            .get_component_with(&context, &store, ResolveOptions::default())
            .unwrap();

        assert!(child.is_validated());
        assert_eq!(
            resolved["Operations"]["HVAC"]["ConditioningSystems"],
            Value::Object(child.into_mapping()),
            "zone {zone} with plant {plant}"
        );
    }
}
