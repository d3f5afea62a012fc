//! SBEM building-energy components
//!
//! Data containers for one zone's energy model inputs, organised as the
//! nesting the composer walks:
//!
//! ```text
//! Zone
//! ├── Operations
//! │   ├── SpaceUse (Occupancy, Lighting, Equipment, Thermostat, WaterUse)
//! │   ├── HVAC (ConditioningSystems { Heating?, Cooling? }, Ventilation)
//! │   └── DHW
//! └── Envelope (Assemblies, Infiltration, Window?)
//! ```
//!
//! Loads and ventilation carry a `Year` schedule. Years hold their weeks as a
//! list, so schedules are always leaves of the schema graph.
//!
//! Range constraints that serde cannot express are checked in each type's
//! [`SchemaType::validate`](crate::composer::SchemaType::validate).

pub mod envelope;
pub mod operations;
pub mod schedules;
pub mod space_use;
pub mod systems;
pub mod zones;

pub use envelope::{
    EnvelopeAssemblyComponent, GlazingConstructionSimpleComponent, InfiltrationCalculationMethod,
    InfiltrationComponent, WindowType, ZoneEnvelopeComponent,
};
pub use operations::ZoneOperationsComponent;
pub use schedules::{DayComponent, RepeatedWeekComponent, ScheduleTypeLimit, WeekComponent, YearComponent};
pub use space_use::{
    DimmingType, EquipmentComponent, LightingComponent, OccupancyComponent, ThermostatComponent,
    WaterUseComponent, ZoneSpaceUseComponent,
};
pub use systems::{
    ConditioningSystemsComponent, ConditioningType, DHWComponent, DHWFuelType, FuelType,
    ThermalSystemComponent, VentilationComponent, VentilationTechType, VentilationType,
    ZoneHVACComponent,
};
pub use zones::ZoneComponent;

use serde::{Deserialize, Deserializer};

use crate::composer::{SchemaRef, SchemaType};

/// Every component type, root first.
#[must_use]
pub fn all_schemas() -> Vec<SchemaRef> {
    vec![
        SchemaRef::of::<ZoneComponent>(),
        SchemaRef::of::<ZoneOperationsComponent>(),
        SchemaRef::of::<ZoneSpaceUseComponent>(),
        SchemaRef::of::<OccupancyComponent>(),
        SchemaRef::of::<LightingComponent>(),
        SchemaRef::of::<EquipmentComponent>(),
        SchemaRef::of::<ThermostatComponent>(),
        SchemaRef::of::<WaterUseComponent>(),
        SchemaRef::of::<ZoneHVACComponent>(),
        SchemaRef::of::<ConditioningSystemsComponent>(),
        SchemaRef::of::<ThermalSystemComponent>(),
        SchemaRef::of::<VentilationComponent>(),
        SchemaRef::of::<DHWComponent>(),
        SchemaRef::of::<ZoneEnvelopeComponent>(),
        SchemaRef::of::<EnvelopeAssemblyComponent>(),
        SchemaRef::of::<InfiltrationComponent>(),
        SchemaRef::of::<GlazingConstructionSimpleComponent>(),
        SchemaRef::of::<YearComponent>(),
        SchemaRef::of::<WeekComponent>(),
        SchemaRef::of::<DayComponent>(),
    ]
}

/// Look up a component type by its type name, ignoring case.
#[must_use]
pub fn schema_by_name(name: &str) -> Option<SchemaRef> {
    all_schemas().into_iter().find(|schema| schema.name().eq_ignore_ascii_case(name))
}

/// Type name of the default root component.
pub const DEFAULT_ROOT: &str = ZoneComponent::TYPE_NAME;

/// Accept `true`/`false` as booleans or as strings in any case.
pub(crate) fn bool_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(value) => Ok(value),
        BoolOrString::String(value) => Ok(value.trim().eq_ignore_ascii_case("true")),
    }
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<(), String> {
    if value < 0.0 {
        return Err(format!("{field} must be non-negative, got {value}"));
    }
    Ok(())
}

pub(crate) fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if !(min..=max).contains(&value) {
        return Err(format!("{field} must be between {min} and {max}, got {value}"));
    }
    Ok(())
}
