//! Everything that runs inside a zone.

use serde::{Deserialize, Serialize};

use super::space_use::ZoneSpaceUseComponent;
use super::systems::{DHWComponent, ZoneHVACComponent};
use crate::composer::{SchemaField, SchemaType};

/// Space use, conditioning and hot water of a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ZoneOperationsComponent {
    pub name: String,
    pub space_use: ZoneSpaceUseComponent,
    #[serde(rename = "HVAC")]
    pub hvac: ZoneHVACComponent,
    #[serde(rename = "DHW")]
    pub dhw: DHWComponent,
}

impl SchemaType for ZoneOperationsComponent {
    const TYPE_NAME: &'static str = "Operations";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::nested::<ZoneSpaceUseComponent>("SpaceUse"),
            SchemaField::nested::<ZoneHVACComponent>("HVAC"),
            SchemaField::nested::<DHWComponent>("DHW"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        self.space_use.validate()?;
        self.hvac.validate()?;
        self.dhw.validate()
    }
}
