//! The zone, root of the component hierarchy.

use serde::{Deserialize, Serialize};

use super::envelope::ZoneEnvelopeComponent;
use super::operations::ZoneOperationsComponent;
use crate::composer::{SchemaField, SchemaType};

/// A thermal zone: what happens inside it and what encloses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ZoneComponent {
    pub name: String,
    pub operations: ZoneOperationsComponent,
    pub envelope: ZoneEnvelopeComponent,
}

impl SchemaType for ZoneComponent {
    const TYPE_NAME: &'static str = "Zone";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::nested::<ZoneOperationsComponent>("Operations"),
            SchemaField::nested::<ZoneEnvelopeComponent>("Envelope"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        self.operations.validate()?;
        self.envelope.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{Context, FactoryOptions, ResolutionType, ResolveOptions};
    use crate::library::LibraryStore;
    use crate::test_utils::fixtures::FileFixture;
    use serde_json::json;

    fn zone_store() -> LibraryStore {
        LibraryStore::from_yaml_str(&FileFixture::zone_library().content).unwrap()
    }

    /// The zone library plus a zone whose plant both heats and cools.
    fn dual_plant_store() -> LibraryStore {
        let mut store = zone_store();
        let extra = LibraryStore::from_yaml_str(
            r#"
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
"#,
        )
        .unwrap();
        store.merge(extra).unwrap();
        store
    }

    fn plant_override_tree() -> crate::composer::ResolutionTree {
        let ty = ResolutionType::for_schema::<ZoneComponent>(FactoryOptions::default()).unwrap();
        ty.parse_yaml(
            r#"
selector:
  source_fields: [zone]
Operations:
  HVAC:
    ConditioningSystems:
      selector:
        source_fields: [plant]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_library_zone_resolves_by_typology() {
        let ty = ResolutionType::for_schema::<ZoneComponent>(FactoryOptions::default()).unwrap();
        let tree = ty.parse_value(json!({"selector": {"source_fields": ["typology"]}})).unwrap();
        let context: Context = [("typology", "office")].into_iter().collect();

        let zone: ZoneComponent = tree.get_component(&context, &zone_store()).unwrap();
        assert_eq!(zone.name, "office");
        assert_eq!(zone.operations.space_use.lighting.power_density, 10.0);
        assert!(zone.envelope.window.is_some());
        assert!(zone.operations.hvac.conditioning_systems.cooling.is_none());
    }

    #[test]
    fn test_lighting_override_patches_library_zone() {
        let ty = ResolutionType::for_schema::<ZoneComponent>(FactoryOptions::default()).unwrap();
        let tree = ty.parse_yaml(&FileFixture::zone_tree().content).unwrap();
        let context: Context = [("typology", "office"), ("lighting_type", "led")].into_iter().collect();

        let zone: ZoneComponent = tree.get_component(&context, &zone_store()).unwrap();
        assert_eq!(zone.operations.space_use.lighting.name, "office_led");
        assert_eq!(zone.operations.space_use.lighting.power_density, 4.5);
        // Untouched branches come from the library zone.
        assert_eq!(zone.operations.space_use.equipment.power_density, 8.0);

        let resolved = tree
            .get_component_with(&context, &zone_store(), ResolveOptions::default())
            .unwrap();
        assert!(resolved.is_validated());
    }

    #[test]
    fn test_plant_override_adds_field_missing_from_library_zone() {
        let context: Context = [("zone", "office"), ("plant", "dual")].into_iter().collect();
        let zone: ZoneComponent = plant_override_tree()
            .get_component(&context, &dual_plant_store())
            .unwrap();

        let systems = &zone.operations.hvac.conditioning_systems;
        assert_eq!(systems.name, "dual");
        assert_eq!(systems.cooling.as_ref().map(|c| c.name.as_str()), Some("chiller"));
        assert_eq!(systems.heating.as_ref().map(|h| h.name.as_str()), Some("gas_boiler"));
        assert_eq!(zone.operations.hvac.ventilation.name, "natural");
    }

    #[test]
    fn test_plant_override_replaces_library_plant_whole() {
        let context: Context = [("zone", "dual"), ("plant", "boiler_only")].into_iter().collect();
        let zone: ZoneComponent = plant_override_tree()
            .get_component(&context, &dual_plant_store())
            .unwrap();

        let systems = &zone.operations.hvac.conditioning_systems;
        assert_eq!(systems.name, "boiler_only");
        assert!(systems.cooling.is_none());
        assert_eq!(zone.name, "dual");
    }
}
