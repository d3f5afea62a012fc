//! Conditioning, ventilation and hot water systems.

use serde::{Deserialize, Serialize};

use super::schedules::YearComponent;
use super::{bool_or_string, check_non_negative, check_range};
use crate::composer::{SchemaField, SchemaType};

/// Fuel burned or consumed by a thermal system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelType {
    Electricity,
    NaturalGas,
    Propane,
    FuelOil,
    WoodPellets,
    Coal,
    Gasoline,
    Diesel,
    CustomFuel,
}

/// What a thermal system provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditioningType {
    Heating,
    Cooling,
    HeatingAndCooling,
}

impl ConditioningType {
    /// Check whether the system can heat.
    #[must_use]
    pub const fn heats(self) -> bool {
        matches!(self, Self::Heating | Self::HeatingAndCooling)
    }

    /// Check whether the system can cool.
    #[must_use]
    pub const fn cools(self) -> bool {
        matches!(self, Self::Cooling | Self::HeatingAndCooling)
    }
}

/// A heating or cooling plant with its distribution efficiency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ThermalSystemComponent {
    pub name: String,
    pub conditioning_type: ConditioningType,
    pub fuel: FuelType,
    #[serde(rename = "SystemCOP")]
    pub system_cop: f64,
    #[serde(rename = "DistributionCOP")]
    pub distribution_cop: f64,
}

impl SchemaType for ThermalSystemComponent {
    const TYPE_NAME: &'static str = "ThermalSystem";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("ConditioningType"),
            SchemaField::scalar("Fuel"),
            SchemaField::scalar("SystemCOP"),
            SchemaField::scalar("DistributionCOP"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("SystemCOP", self.system_cop)?;
        check_non_negative("DistributionCOP", self.distribution_cop)
    }
}

/// Heating and cooling plants of a zone; either may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConditioningSystemsComponent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating: Option<ThermalSystemComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling: Option<ThermalSystemComponent>,
}

impl SchemaType for ConditioningSystemsComponent {
    const TYPE_NAME: &'static str = "ConditioningSystems";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::optional::<ThermalSystemComponent>("Heating"),
            SchemaField::optional::<ThermalSystemComponent>("Cooling"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(heating) = &self.heating {
            heating.validate()?;
            if !heating.conditioning_type.heats() {
                return Err(format!("'{}' cannot be used as a heating system", heating.name));
            }
        }
        if let Some(cooling) = &self.cooling {
            cooling.validate()?;
            if !cooling.conditioning_type.cools() {
                return Err(format!("'{}' cannot be used as a cooling system", cooling.name));
            }
        }
        Ok(())
    }
}

/// How outdoor air is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VentilationType {
    Natural,
    Mechanical,
    Hybrid,
}

/// Ventilation technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VentilationTechType {
    #[serde(rename = "ERV")]
    Erv,
    #[serde(rename = "HRV")]
    Hrv,
    #[serde(rename = "DCV")]
    Dcv,
    NoMechanicalVentilation,
    Custom,
}

/// Outdoor air supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct VentilationComponent {
    pub name: String,
    /// Ventilation rate
    pub rate: f64,
    /// Minimum fresh air [m³/s]
    pub min_fresh_air: f64,
    pub schedule: YearComponent,
    #[serde(rename = "Type")]
    pub ventilation_type: VentilationType,
    pub tech_type: VentilationTechType,
}

impl SchemaType for VentilationComponent {
    const TYPE_NAME: &'static str = "Ventilation";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("Rate"),
            SchemaField::scalar("MinFreshAir"),
            SchemaField::nested::<YearComponent>("Schedule"),
            SchemaField::scalar("Type"),
            SchemaField::scalar("TechType"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("Rate", self.rate)?;
        check_non_negative("MinFreshAir", self.min_fresh_air)?;
        self.schedule.validate()
    }
}

/// Conditioning and ventilation of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ZoneHVACComponent {
    pub name: String,
    pub conditioning_systems: ConditioningSystemsComponent,
    pub ventilation: VentilationComponent,
}

impl SchemaType for ZoneHVACComponent {
    const TYPE_NAME: &'static str = "HVAC";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::nested::<ConditioningSystemsComponent>("ConditioningSystems"),
            SchemaField::nested::<VentilationComponent>("Ventilation"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        self.conditioning_systems.validate()?;
        self.ventilation.validate()
    }
}

/// Fuel for domestic hot water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DHWFuelType {
    Electricity,
    NaturalGas,
    Propane,
    FuelOil,
}

/// Domestic hot water plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DHWComponent {
    pub name: String,
    #[serde(rename = "SystemCOP")]
    pub system_cop: f64,
    /// Inlet water temperature [°C]
    pub water_temperature_inlet: f64,
    #[serde(rename = "DistributionCOP")]
    pub distribution_cop: f64,
    /// Supply water temperature [°C]
    pub water_supply_temperature: f64,
    #[serde(deserialize_with = "bool_or_string")]
    pub is_on: bool,
    pub fuel_type: DHWFuelType,
}

impl SchemaType for DHWComponent {
    const TYPE_NAME: &'static str = "DHW";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("SystemCOP"),
            SchemaField::scalar("WaterTemperatureInlet"),
            SchemaField::scalar("DistributionCOP"),
            SchemaField::scalar("WaterSupplyTemperature"),
            SchemaField::scalar("IsOn"),
            SchemaField::scalar("FuelType"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("SystemCOP", self.system_cop)?;
        check_range("WaterTemperatureInlet", self.water_temperature_inlet, 0.0, 100.0)?;
        check_range("DistributionCOP", self.distribution_cop, 0.0, 1.0)?;
        check_range("WaterSupplyTemperature", self.water_supply_temperature, 0.0, 100.0)?;
        if self.water_supply_temperature <= self.water_temperature_inlet {
            return Err("WaterSupplyTemperature must be greater than WaterTemperatureInlet".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{SchemaGraph, SchemaRef};
    use serde_json::json;

    fn boiler(conditioning_type: &str) -> serde_json::Value {
        json!({
            "Name": "boiler",
            "ConditioningType": conditioning_type,
            "Fuel": "NaturalGas",
            "SystemCOP": 0.9,
            "DistributionCOP": 0.8
        })
    }

    #[test]
    fn test_optional_systems_are_graph_edges() {
        let graph = SchemaGraph::build::<ConditioningSystemsComponent>().unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.schema_of("Cooling"), Some(SchemaRef::of::<ThermalSystemComponent>()));
    }

    #[test]
    fn test_cooling_slot_rejects_heating_only_system() {
        let schema = SchemaRef::of::<ConditioningSystemsComponent>();
        let ok = schema.construct(json!({"Name": "cs", "Heating": boiler("Heating")}));
        assert!(ok.is_ok());
        assert!(ok.unwrap().get("Cooling").is_none());

        let err = schema
            .construct(json!({"Name": "cs", "Cooling": boiler("Heating")}))
            .unwrap_err();
        assert!(err.contains("cooling system"));
    }

    #[test]
    fn test_dhw_supply_must_exceed_inlet() {
        let schema = SchemaRef::of::<DHWComponent>();
        let record = json!({
            "Name": "tank",
            "SystemCOP": 0.8,
            "WaterTemperatureInlet": 50.0,
            "DistributionCOP": 0.9,
            "WaterSupplyTemperature": 45.0,
            "IsOn": "true",
            "FuelType": "Electricity"
        });
        assert!(schema.construct(record).unwrap_err().contains("greater than"));
    }

    #[test]
    fn test_acronym_field_names() {
        let dumped = SchemaRef::of::<ThermalSystemComponent>().construct(boiler("HeatingAndCooling")).unwrap();
        assert_eq!(dumped["SystemCOP"], json!(0.9));
        let tech: VentilationTechType = serde_json::from_value(json!("HRV")).unwrap();
        assert_eq!(tech, VentilationTechType::Hrv);
    }
}
