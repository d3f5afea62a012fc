//! Test fixtures for schemas, libraries and selector documents
//!
//! The Root/Middle/Leaf schema is the smallest shape that exercises shared
//! nested types:
//!
//! ```text
//! Root { a: Middle, b: Middle, c: Leaf }
//! Middle { Label, x: Leaf }
//! Leaf { Value >= 0 }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::composer::{FactoryOptions, ResolutionTree, ResolutionType, SchemaField, SchemaType};
use crate::library::LibraryStore;

/// Leaf schema with a single non-negative value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeafComponent {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

impl SchemaType for LeafComponent {
    const TYPE_NAME: &'static str = "Leaf";

    fn schema_fields() -> Vec<SchemaField> {
        vec![SchemaField::scalar("Name"), SchemaField::scalar("Value")]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.value < 0.0 {
            return Err(format!("Value must be non-negative, got {}", self.value));
        }
        Ok(())
    }
}

/// Intermediate schema holding one leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MiddleComponent {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Label")]
    pub label: String,
    pub x: LeafComponent,
}

impl SchemaType for MiddleComponent {
    const TYPE_NAME: &'static str = "Middle";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("Label"),
            SchemaField::nested::<LeafComponent>("x"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Root schema with two fields sharing the middle type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootComponent {
    #[serde(rename = "Name")]
    pub name: String,
    pub a: MiddleComponent,
    pub b: MiddleComponent,
    pub c: LeafComponent,
}

impl SchemaType for RootComponent {
    const TYPE_NAME: &'static str = "Root";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::nested::<MiddleComponent>("a"),
            SchemaField::nested::<MiddleComponent>("b"),
            SchemaField::nested::<LeafComponent>("c"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Schema with a list of leaves next to a single leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListHolderComponent {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Items")]
    pub items: Vec<LeafComponent>,
    #[serde(rename = "Single")]
    pub single: LeafComponent,
}

impl SchemaType for ListHolderComponent {
    const TYPE_NAME: &'static str = "ListHolder";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::list("Items"),
            SchemaField::nested::<LeafComponent>("Single"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Library matching the Root/Middle/Leaf schema.
pub const FIXTURE_LIBRARY: &str = r#"
Leaf:
  AX: {Value: 1.0}
  BX: {Value: 2.0}
  C1: {Value: 3.0}
  special_x: {Value: 9.0}
  broken: {Value: -1.0}
Middle:
  A1: {Label: first, x: AX}
  A1_copy: {Label: copy, x: AX}
  B1: {Label: second, x: BX}
Root:
  R1: {a: A1, b: B1, c: C1}
"#;

/// In-memory store loaded from [`FIXTURE_LIBRARY`].
///
/// # Panics
///
/// Panics if the fixture document does not parse.
#[must_use]
pub fn fixture_store() -> LibraryStore {
    LibraryStore::from_yaml_str(FIXTURE_LIBRARY).expect("fixture library parses")
}

/// Parse `document` as a Root selector tree with default options.
///
/// # Panics
///
/// Panics if the document does not parse.
#[must_use]
pub fn root_tree(document: Value) -> ResolutionTree {
    ResolutionType::for_schema::<RootComponent>(FactoryOptions::default())
        .and_then(|ty| ty.parse_value(document))
        .expect("fixture tree parses")
}

/// A file written into a test directory.
#[derive(Clone, Debug)]
pub struct FileFixture {
    pub path: String,
    pub content: String,
}

impl FileFixture {
    /// A library for the SBEM zone schema with one fully specified zone.
    #[must_use]
    pub fn zone_library() -> Self {
        Self {
            path: "library.yaml".to_string(),
            content: ZONE_LIBRARY.trim_start().to_string(),
        }
    }

    /// A zone selector tree that picks the zone by typology and overrides lighting.
    #[must_use]
    pub fn zone_tree() -> Self {
        Self {
            path: "tree.yaml".to_string(),
            content: r#"
selector:
  source_fields: [typology]
Operations:
  SpaceUse:
    Lighting:
      selector:
        source_fields: [typology, lighting_type]
"#
            .trim_start()
            .to_string(),
        }
    }

    /// A zone selector tree where no node can resolve.
    #[must_use]
    pub fn unresolvable_zone_tree() -> Self {
        Self {
            path: "broken_tree.yaml".to_string(),
            content: "Envelope:\n  Window: {}\n".to_string(),
        }
    }

    /// A config file pointing at `library.yaml` with a default context.
    #[must_use]
    pub fn config() -> Self {
        Self {
            path: "sbem-compose.toml".to_string(),
            content: r#"
library = "library.yaml"
extra_fields = "forbid"

[context]
typology = "office"
"#
            .trim_start()
            .to_string(),
        }
    }

    /// Write this fixture into `dir`, creating parent directories.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let file_path = dir.join(&self.path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, &self.content)?;
        Ok(file_path)
    }
}

const ZONE_LIBRARY: &str = r#"
Day:
  office_hours: &office_hours
    Name: office_hours
    Type: Fraction
    Values: [0, 0, 0, 0, 0, 0, 0, 0.5, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0.5, 0, 0, 0, 0, 0]
  closed: &closed
    Name: closed
    Type: Fraction
    Values: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
  heating_setpoint: &heating_setpoint
    Name: heating_setpoint
    Type: Temperature
    Values: [18, 18, 18, 18, 18, 18, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 18, 18, 18]
  cooling_setpoint: &cooling_setpoint
    Name: cooling_setpoint
    Type: Temperature
    Values: [28, 28, 28, 28, 28, 28, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 24, 28, 28, 28]
Year:
  office_year:
    Type: Fraction
    Weeks:
      - StartMonth: 1
        StartDay: 1
        EndMonth: 12
        EndDay: 31
        Week:
          Name: office_week
          Monday: *office_hours
          Tuesday: *office_hours
          Wednesday: *office_hours
          Thursday: *office_hours
          Friday: *office_hours
          Saturday: *closed
          Sunday: *closed
  heating_year:
    Type: Temperature
    Weeks:
      - StartMonth: 1
        StartDay: 1
        EndMonth: 12
        EndDay: 31
        Week:
          Name: heating_week
          Monday: *heating_setpoint
          Tuesday: *heating_setpoint
          Wednesday: *heating_setpoint
          Thursday: *heating_setpoint
          Friday: *heating_setpoint
          Saturday: *heating_setpoint
          Sunday: *heating_setpoint
  cooling_year:
    Type: Temperature
    Weeks:
      - StartMonth: 1
        StartDay: 1
        EndMonth: 12
        EndDay: 31
        Week:
          Name: cooling_week
          Monday: *cooling_setpoint
          Tuesday: *cooling_setpoint
          Wednesday: *cooling_setpoint
          Thursday: *cooling_setpoint
          Friday: *cooling_setpoint
          Saturday: *cooling_setpoint
          Sunday: *cooling_setpoint
Occupancy:
  office:
    PeopleDensity: 0.05
    Schedule: office_year
    IsOn: true
Lighting:
  office:
    PowerDensity: 10.0
    DimmingType: Continuous
    Schedule: office_year
    IsOn: true
  office_led:
    PowerDensity: 4.5
    DimmingType: Stepped
    Schedule: office_year
    IsOn: "True"
Equipment:
  office:
    PowerDensity: 8.0
    Schedule: office_year
    IsOn: true
Thermostat:
  office:
    IsOn: true
    HeatingSetpoint: 21.0
    HeatingSchedule: heating_year
    CoolingSetpoint: 24.0
    CoolingSchedule: cooling_year
WaterUse:
  office:
    FlowRatePerPerson: 0.01
    Schedule: office_year
SpaceUse:
  office:
    Occupancy: office
    Lighting: office
    Equipment: office
    Thermostat: office
    WaterUse: office
ThermalSystem:
  gas_boiler:
    ConditioningType: Heating
    Fuel: NaturalGas
    SystemCOP: 0.9
    DistributionCOP: 0.85
ConditioningSystems:
  boiler_only:
    Heating: gas_boiler
Ventilation:
  natural:
    Rate: 0.0003
    MinFreshAir: 0.008
    Schedule: office_year
    Type: Natural
    TechType: NoMechanicalVentilation
HVAC:
  office:
    ConditioningSystems: boiler_only
    Ventilation: natural
DHW:
  gas_tank:
    SystemCOP: 0.8
    WaterTemperatureInlet: 10.0
    DistributionCOP: 0.9
    WaterSupplyTemperature: 55.0
    IsOn: true
    FuelType: NaturalGas
Operations:
  office:
    SpaceUse: office
    HVAC: office
    DHW: gas_tank
EnvelopeAssembly:
  masonry:
    RoofAssembly: flat_roof
    FacadeAssembly: brick_wall
    SlabAssembly: concrete_slab
    PartitionAssembly: stud_partition
    ExternalFloorAssembly: concrete_slab
    GroundSlabAssembly: ground_slab
    GroundWallAssembly: basement_wall
    InternalMassAssembly: furniture
    InternalMassIsOn: false
    InternalMassExposedAreaPerArea: 0.0
    GroundIsAdiabatic: false
    RoofIsAdiabatic: false
    FacadeIsAdiabatic: false
    SlabIsAdiabatic: true
    PartitionIsAdiabatic: true
Infiltration:
  leaky:
    InfiltrationIsOn: true
    InfiltrationConstantCoefficient: 0.0
    InfiltrationTemperatureCoefficient: 0.0
    InfiltrationWindVelocityCoefficient: 0.0
    InfiltrationWindVelocitySquaredCoefficient: 0.0
    AFN_AirMassFlowCoefficient_Crack: 0.0
    InfiltrationAch: 0.8
    InfiltrationFlowPerExteriorSurfaceArea: 0.0
    CalculationMethod: AirChanges/Hour
Glazing:
  double_clear:
    UValue: 2.7
    SHGF: 0.7
    TVis: 0.78
    Type: Double
Envelope:
  masonry:
    Assemblies: masonry
    Infiltration: leaky
    Window: double_clear
Zone:
  office:
    Operations: office
    Envelope: masonry
"#;
