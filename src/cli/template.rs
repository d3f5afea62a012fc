//! Print an example selector document for a component type.

use anyhow::Result;
use clap::Args;

use super::common::component_schema;
use crate::composer::ResolutionType;
use crate::config::ComposerConfig;

/// Print an example selector document.
///
/// Every node carries an example selector; replace the source fields with
/// context keys and delete the nodes you don't need.
#[derive(Args)]
pub struct TemplateCommand {
    /// Component type of the document root
    #[arg(long, value_name = "NAME")]
    pub component: Option<String>,

    /// Nest child nodes under a `children` key
    #[arg(long)]
    pub grouping: bool,
}

impl TemplateCommand {
    pub fn execute(self, config: &ComposerConfig) -> Result<()> {
        let schema = component_schema(self.component.as_deref())?;
        let mut options = config.factory_options();
        options.use_grouping_field |= self.grouping;

        let ty = ResolutionType::for_schema_ref(schema, options)?;
        print!("{}", ty.create_data_entry_template()?);
        Ok(())
    }
}
