//! Opaque assemblies, infiltration and glazing of a zone.

use serde::{Deserialize, Serialize};

use super::{bool_or_string, check_non_negative, check_range};
use crate::composer::{SchemaField, SchemaType};

/// Number of glazing panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowType {
    Single,
    Double,
    Triple,
}

/// How the design infiltration rate is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfiltrationCalculationMethod {
    #[serde(rename = "Flow/Zone")]
    FlowPerZone,
    #[serde(rename = "Flow/Area")]
    FlowPerArea,
    #[serde(rename = "Flow/ExteriorArea")]
    FlowPerExteriorArea,
    #[serde(rename = "Flow/ExteriorWallArea")]
    FlowPerExteriorWallArea,
    #[serde(rename = "AirChanges/Hour")]
    AirChangesPerHour,
}

/// Air leakage through the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct InfiltrationComponent {
    pub name: String,
    #[serde(deserialize_with = "bool_or_string")]
    pub infiltration_is_on: bool,
    pub infiltration_constant_coefficient: f64,
    pub infiltration_temperature_coefficient: f64,
    pub infiltration_wind_velocity_coefficient: f64,
    pub infiltration_wind_velocity_squared_coefficient: f64,
    #[serde(rename = "AFN_AirMassFlowCoefficient_Crack")]
    pub afn_air_mass_flow_coefficient_crack: f64,
    /// Air changes per hour [1/h]
    pub infiltration_ach: f64,
    /// Flow per exterior surface area [m³/s/m²]
    pub infiltration_flow_per_exterior_surface_area: f64,
    pub calculation_method: InfiltrationCalculationMethod,
}

impl SchemaType for InfiltrationComponent {
    const TYPE_NAME: &'static str = "Infiltration";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("InfiltrationIsOn"),
            SchemaField::scalar("InfiltrationConstantCoefficient"),
            SchemaField::scalar("InfiltrationTemperatureCoefficient"),
            SchemaField::scalar("InfiltrationWindVelocityCoefficient"),
            SchemaField::scalar("InfiltrationWindVelocitySquaredCoefficient"),
            SchemaField::scalar("AFN_AirMassFlowCoefficient_Crack"),
            SchemaField::scalar("InfiltrationAch"),
            SchemaField::scalar("InfiltrationFlowPerExteriorSurfaceArea"),
            SchemaField::scalar("CalculationMethod"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("InfiltrationAch", self.infiltration_ach)?;
        check_non_negative(
            "InfiltrationFlowPerExteriorSurfaceArea",
            self.infiltration_flow_per_exterior_surface_area,
        )
    }
}

/// Simple glazing described by its overall performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlazingConstructionSimpleComponent {
    #[serde(rename = "Name")]
    pub name: String,
    /// U-value [W/m²K]
    #[serde(rename = "UValue")]
    pub u_value: f64,
    /// Solar heat gain factor
    #[serde(rename = "SHGF")]
    pub shgf: f64,
    /// Visible transmittance
    #[serde(rename = "TVis")]
    pub t_vis: f64,
    #[serde(rename = "Type")]
    pub window_type: WindowType,
}

impl SchemaType for GlazingConstructionSimpleComponent {
    const TYPE_NAME: &'static str = "Glazing";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("UValue"),
            SchemaField::scalar("SHGF"),
            SchemaField::scalar("TVis"),
            SchemaField::scalar("Type"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("UValue", self.u_value)?;
        check_range("SHGF", self.shgf, 0.0, 1.0)?;
        check_range("TVis", self.t_vis, 0.0, 1.0)
    }
}

/// Names of the constructions used for each surface class, plus adiabatic flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct EnvelopeAssemblyComponent {
    pub name: String,
    pub roof_assembly: String,
    pub facade_assembly: String,
    pub slab_assembly: String,
    pub partition_assembly: String,
    pub external_floor_assembly: String,
    pub ground_slab_assembly: String,
    pub ground_wall_assembly: String,
    pub internal_mass_assembly: String,
    #[serde(deserialize_with = "bool_or_string")]
    pub internal_mass_is_on: bool,
    /// Exposed internal mass area per floor area [m²/m²]
    pub internal_mass_exposed_area_per_area: f64,
    #[serde(deserialize_with = "bool_or_string")]
    pub ground_is_adiabatic: bool,
    #[serde(deserialize_with = "bool_or_string")]
    pub roof_is_adiabatic: bool,
    #[serde(deserialize_with = "bool_or_string")]
    pub facade_is_adiabatic: bool,
    #[serde(deserialize_with = "bool_or_string")]
    pub slab_is_adiabatic: bool,
    #[serde(deserialize_with = "bool_or_string")]
    pub partition_is_adiabatic: bool,
}

impl SchemaType for EnvelopeAssemblyComponent {
    const TYPE_NAME: &'static str = "EnvelopeAssembly";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("RoofAssembly"),
            SchemaField::scalar("FacadeAssembly"),
            SchemaField::scalar("SlabAssembly"),
            SchemaField::scalar("PartitionAssembly"),
            SchemaField::scalar("ExternalFloorAssembly"),
            SchemaField::scalar("GroundSlabAssembly"),
            SchemaField::scalar("GroundWallAssembly"),
            SchemaField::scalar("InternalMassAssembly"),
            SchemaField::scalar("InternalMassIsOn"),
            SchemaField::scalar("InternalMassExposedAreaPerArea"),
            SchemaField::scalar("GroundIsAdiabatic"),
            SchemaField::scalar("RoofIsAdiabatic"),
            SchemaField::scalar("FacadeIsAdiabatic"),
            SchemaField::scalar("SlabIsAdiabatic"),
            SchemaField::scalar("PartitionIsAdiabatic"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        check_non_negative("InternalMassExposedAreaPerArea", self.internal_mass_exposed_area_per_area)
    }
}

/// Envelope of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ZoneEnvelopeComponent {
    pub name: String,
    pub assemblies: EnvelopeAssemblyComponent,
    pub infiltration: InfiltrationComponent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<GlazingConstructionSimpleComponent>,
}

impl SchemaType for ZoneEnvelopeComponent {
    const TYPE_NAME: &'static str = "Envelope";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::nested::<EnvelopeAssemblyComponent>("Assemblies"),
            SchemaField::nested::<InfiltrationComponent>("Infiltration"),
            SchemaField::optional::<GlazingConstructionSimpleComponent>("Window"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        self.assemblies.validate()?;
        self.infiltration.validate()?;
        if let Some(window) = &self.window {
            window.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::SchemaRef;
    use serde_json::json;

    #[test]
    fn test_calculation_method_wire_names() {
        let method: InfiltrationCalculationMethod = serde_json::from_value(json!("AirChanges/Hour")).unwrap();
        assert_eq!(method, InfiltrationCalculationMethod::AirChangesPerHour);
        assert_eq!(
            serde_json::to_value(InfiltrationCalculationMethod::FlowPerExteriorWallArea).unwrap(),
            json!("Flow/ExteriorWallArea")
        );
    }

    #[test]
    fn test_glazing_fractions_are_bounded() {
        let schema = SchemaRef::of::<GlazingConstructionSimpleComponent>();
        let glazing = json!({"Name": "g", "UValue": 2.7, "SHGF": 0.7, "TVis": 0.78, "Type": "Double"});
        assert!(schema.construct(glazing.clone()).is_ok());

        let mut bad = glazing;
        bad["SHGF"] = json!(1.2);
        assert!(schema.construct(bad).unwrap_err().starts_with("SHGF must be between"));
    }

    #[test]
    fn test_infiltration_afn_field_keeps_its_name() {
        let schema = SchemaRef::of::<InfiltrationComponent>();
        let dumped = schema
            .construct(json!({
                "Name": "tight",
                "InfiltrationIsOn": "false",
                "InfiltrationConstantCoefficient": 0.0,
                "InfiltrationTemperatureCoefficient": 0.0,
                "InfiltrationWindVelocityCoefficient": 0.0,
                "InfiltrationWindVelocitySquaredCoefficient": 0.0,
                "AFN_AirMassFlowCoefficient_Crack": 0.0,
                "InfiltrationAch": 0.2,
                "InfiltrationFlowPerExteriorSurfaceArea": 0.0,
                "CalculationMethod": "AirChanges/Hour"
            }))
            .unwrap();
        assert_eq!(dumped["AFN_AirMassFlowCoefficient_Crack"], json!(0.0));
        assert_eq!(dumped["InfiltrationIsOn"], json!(false));
    }
}
