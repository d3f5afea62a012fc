//! Print the schema graph of a component type.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::component_schema;
use crate::composer::SchemaGraph;

/// Print the schema graph of a component type.
#[derive(Args)]
pub struct GraphCommand {
    /// Component type to start from
    #[arg(long, value_name = "NAME")]
    pub component: Option<String>,
}

impl GraphCommand {
    pub fn execute(self) -> Result<()> {
        let schema = component_schema(self.component.as_deref())?;
        let graph = SchemaGraph::build_from(schema)?;

        print!("{}", graph.to_tree_string());
        println!(
            "\n{} {} nested fields, {} nodes",
            "Graph:".bold(),
            graph.edge_count(),
            graph.node_count()
        );
        Ok(())
    }
}
