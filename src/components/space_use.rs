//! Internal loads and setpoints of a zone.

use serde::{Deserialize, Serialize};

use super::schedules::YearComponent;
use super::{bool_or_string, check_non_negative, check_range};
use crate::composer::{SchemaField, SchemaType};

/// Default metabolic rate of occupants [met].
pub const DEFAULT_METABOLIC_RATE: f64 = 1.2;

const fn default_metabolic_rate() -> f64 {
    DEFAULT_METABOLIC_RATE
}

/// People in the zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct OccupancyComponent {
    pub name: String,
    /// Occupancy density [ppl/m²]
    pub people_density: f64,
    /// Occupancy schedule [fraction]
    pub schedule: YearComponent,
    #[serde(deserialize_with = "bool_or_string")]
    pub is_on: bool,
    /// Metabolic rate [met]
    #[serde(default = "default_metabolic_rate")]
    pub metabolic_rate: f64,
}

impl SchemaType for OccupancyComponent {
    const TYPE_NAME: &'static str = "Occupancy";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("PeopleDensity"),
            SchemaField::nested::<YearComponent>("Schedule"),
            SchemaField::scalar("IsOn"),
            SchemaField::scalar("MetabolicRate"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("PeopleDensity", self.people_density)?;
        check_non_negative("MetabolicRate", self.metabolic_rate)?;
        self.schedule.validate()
    }
}

/// Lighting dimming control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimmingType {
    Off,
    Stepped,
    Continuous,
}

/// Lighting power and schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct LightingComponent {
    pub name: String,
    /// Lighting power density [W/m²]
    pub power_density: f64,
    pub dimming_type: DimmingType,
    /// Lighting schedule [fraction]
    pub schedule: YearComponent,
    #[serde(deserialize_with = "bool_or_string")]
    pub is_on: bool,
}

impl SchemaType for LightingComponent {
    const TYPE_NAME: &'static str = "Lighting";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("PowerDensity"),
            SchemaField::scalar("DimmingType"),
            SchemaField::nested::<YearComponent>("Schedule"),
            SchemaField::scalar("IsOn"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("PowerDensity", self.power_density)?;
        self.schedule.validate()
    }
}

/// Plug loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct EquipmentComponent {
    pub name: String,
    /// Equipment power density [W/m²]
    pub power_density: f64,
    pub schedule: YearComponent,
    #[serde(deserialize_with = "bool_or_string")]
    pub is_on: bool,
}

impl SchemaType for EquipmentComponent {
    const TYPE_NAME: &'static str = "Equipment";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("PowerDensity"),
            SchemaField::nested::<YearComponent>("Schedule"),
            SchemaField::scalar("IsOn"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("PowerDensity", self.power_density)?;
        self.schedule.validate()
    }
}

/// Heating and cooling setpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ThermostatComponent {
    pub name: String,
    #[serde(deserialize_with = "bool_or_string")]
    pub is_on: bool,
    /// Heating setpoint [°C]
    pub heating_setpoint: f64,
    pub heating_schedule: YearComponent,
    /// Cooling setpoint [°C]
    pub cooling_setpoint: f64,
    pub cooling_schedule: YearComponent,
}

impl SchemaType for ThermostatComponent {
    const TYPE_NAME: &'static str = "Thermostat";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("IsOn"),
            SchemaField::scalar("HeatingSetpoint"),
            SchemaField::nested::<YearComponent>("HeatingSchedule"),
            SchemaField::scalar("CoolingSetpoint"),
            SchemaField::nested::<YearComponent>("CoolingSchedule"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        self.heating_schedule.validate()?;
        self.cooling_schedule.validate()
    }
}

/// Domestic hot water demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct WaterUseComponent {
    pub name: String,
    /// Flow rate per person [m³/day/p]
    pub flow_rate_per_person: f64,
    pub schedule: YearComponent,
}

impl SchemaType for WaterUseComponent {
    const TYPE_NAME: &'static str = "WaterUse";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("FlowRatePerPerson"),
            SchemaField::nested::<YearComponent>("Schedule"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_range("FlowRatePerPerson", self.flow_rate_per_person, 0.0, 0.1)?;
        self.schedule.validate()
    }
}

/// All space use loads of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ZoneSpaceUseComponent {
    pub name: String,
    pub occupancy: OccupancyComponent,
    pub lighting: LightingComponent,
    pub equipment: EquipmentComponent,
    pub thermostat: ThermostatComponent,
    pub water_use: WaterUseComponent,
}

impl SchemaType for ZoneSpaceUseComponent {
    const TYPE_NAME: &'static str = "SpaceUse";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::nested::<OccupancyComponent>("Occupancy"),
            SchemaField::nested::<LightingComponent>("Lighting"),
            SchemaField::nested::<EquipmentComponent>("Equipment"),
            SchemaField::nested::<ThermostatComponent>("Thermostat"),
            SchemaField::nested::<WaterUseComponent>("WaterUse"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        self.occupancy.validate()?;
        self.lighting.validate()?;
        self.equipment.validate()?;
        self.thermostat.validate()?;
        self.water_use.validate()
    }
}
