//! Schema graph construction.
//!
//! The graph mirrors the nesting of a root schema type: nodes are field names
//! (plus the synthetic [`ROOT_NODE`]), and an edge `(parent, child)` records that
//! the type bound to `parent` declares a nested field `child` of the tagged type.
//! A field name is bound to exactly one schema type for the whole graph, which is
//! what lets the resolution factory memoize per type.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::{debug, trace};

use super::schema::{FieldKind, SchemaRef, SchemaType};
use crate::core::{ComposeError, Result};

/// Name of the entry-point node.
pub const ROOT_NODE: &str = "root";

/// Edge payload: the nested type stored in the child field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaEdge {
    /// Type of the child field
    pub schema: SchemaRef,
}

/// Directed graph of field-name relationships for one root schema type.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    graph: DiGraph<String, SchemaEdge>,
    node_map: HashMap<String, NodeIndex>,
    bindings: HashMap<String, SchemaRef>,
    root: SchemaRef,
}

impl SchemaGraph {
    /// Build the graph for root type `T`.
    pub fn build<T: SchemaType>() -> Result<Self> {
        Self::build_from(SchemaRef::of::<T>())
    }

    /// Build the graph for a type-erased root schema.
    ///
    /// Fails with [`ComposeError::AmbiguousFieldName`] when one field name is used
    /// for two different nested types, and with [`ComposeError::RecursiveSchema`]
    /// when a type (transitively) contains itself.
    pub fn build_from(root: SchemaRef) -> Result<Self> {
        let mut graph = Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            bindings: HashMap::from([(ROOT_NODE.to_string(), root)]),
            root,
        };

        let mut stack = vec![root];
        graph.handle_schema(ROOT_NODE, root, &mut stack)?;

        debug!(
            "Built schema graph for {}: {} nodes, {} edges",
            root.name(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn handle_schema(
        &mut self,
        field_name: &str,
        schema: SchemaRef,
        stack: &mut Vec<SchemaRef>,
    ) -> Result<()> {
        for field in schema.fields() {
            let Some(child) = field.kind.relationship() else {
                if matches!(field.kind, FieldKind::Collection(_)) {
                    trace!("Skipping collection field {}.{}", schema.name(), field.name);
                }
                continue;
            };

            self.bind(field.name, child)?;

            if stack.contains(&child) {
                let mut path: Vec<String> = stack.iter().map(|s| s.name().to_string()).collect();
                path.push(child.name().to_string());
                return Err(ComposeError::RecursiveSchema { path });
            }

            self.add_edge(field_name, field.name, child);

            stack.push(child);
            self.handle_schema(field.name, child, stack)?;
            stack.pop();
        }
        Ok(())
    }

    fn bind(&mut self, field: &str, schema: SchemaRef) -> Result<()> {
        match self.bindings.get(field) {
            Some(existing) if *existing != schema => Err(ComposeError::AmbiguousFieldName {
                field: field.to_string(),
                first: existing.name().to_string(),
                second: schema.name().to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.bindings.insert(field.to_string(), schema);
                Ok(())
            }
        }
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    fn add_edge(&mut self, parent: &str, child: &str, schema: SchemaRef) {
        let from = self.ensure_node(parent);
        let to = self.ensure_node(child);

        // The same (parent, child) pair is reached again when a nested type is
        // shared by several fields.
        if !self.graph.contains_edge(from, to) {
            trace!("Adding schema edge {parent} -> {child} ({})", schema.name());
            self.graph.add_edge(from, to, SchemaEdge { schema });
        }
    }

    /// The root schema type.
    #[must_use]
    pub const fn root_schema(&self) -> SchemaRef {
        self.root
    }

    /// The schema type bound to a node, if the node exists.
    #[must_use]
    pub fn schema_of(&self, node: &str) -> Option<SchemaRef> {
        self.bindings.get(node).copied()
    }

    /// Direct children of `node` as `(field_name, schema)`, in declaration order.
    #[must_use]
    pub fn children(&self, node: &str) -> Vec<(String, SchemaRef)> {
        let Some(&index) = self.node_map.get(node) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self.graph.edges_directed(index, Direction::Outgoing).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
            .into_iter()
            .map(|edge| (self.graph[edge.target()].clone(), edge.weight().schema))
            .collect()
    }

    /// All edges as `(parent, child, schema)`, in insertion order.
    #[must_use]
    pub fn edges(&self) -> Vec<(String, String, SchemaRef)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].clone(),
                    self.graph[edge.target()].clone(),
                    edge.weight().schema,
                )
            })
            .collect()
    }

    /// Check if the graph has no nodes.
    ///
    /// Nodes are added with their first edge, so this holds when the root type is a leaf.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the graph as an indented tree rooted at [`ROOT_NODE`].
    #[must_use]
    pub fn to_tree_string(&self) -> String {
        let mut result = format!("{} ({})\n", ROOT_NODE, self.root.name());
        self.build_tree_string(ROOT_NODE, &mut result, "");
        result
    }

    fn build_tree_string(&self, node: &str, result: &mut String, prefix: &str) {
        let children = self.children(node);
        for (i, (field, schema)) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            let connector = if is_last {
                "└── "
            } else {
                "├── "
            };
            result.push_str(&format!("{prefix}{connector}{field} ({})\n", schema.name()));

            let child_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            self.build_tree_string(field, result, &child_prefix);
        }
    }
}
