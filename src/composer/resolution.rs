//! Resolution-tree type factory.
//!
//! Compiling a [`SchemaGraph`] yields a [`ResolutionType`]: an arena of
//! [`NodeDescriptor`]s, one per distinct schema type, linked by child field name.
//! Resolution documents are parsed against the descriptors rather than against a
//! generated Rust type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use super::fetcher::{DeepFetcher, FetcherRegistry, SchemaFetchers};
use super::graph::{ROOT_NODE, SchemaGraph};
use super::schema::{SchemaRef, SchemaType};
use super::tree::{ResolutionNode, ResolutionTree};
use crate::core::Result;

/// Reserved key holding a node's [`NameConstructor`](super::naming::NameConstructor).
pub const SELECTOR_FIELD: &str = "selector";

/// Reserved key holding child nodes in grouping mode.
pub const GROUPING_FIELD: &str = "children";

/// Index of a descriptor in a [`ResolutionType`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A child field of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDescriptor {
    /// Field name, as used in resolution documents and schema dumps
    pub field: String,
    /// Descriptor of the nested type
    pub node: NodeId,
}

/// Shape of one resolution node: its schema type and child fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// Schema type this node resolves to
    pub schema: SchemaRef,
    /// Child fields in declaration order
    pub children: Vec<ChildDescriptor>,
}

impl NodeDescriptor {
    /// Position of `field` among the children.
    #[must_use]
    pub fn child_index(&self, field: &str) -> Option<usize> {
        self.children.iter().position(|child| child.field == field)
    }

    /// Whether this node has no child fields.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Policy for keys a resolution document carries that no descriptor declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraFields {
    /// Drop unknown keys
    #[default]
    Ignore,
    /// Reject unknown keys
    Forbid,
}

/// Options for compiling a [`ResolutionType`].
#[derive(Clone)]
pub struct FactoryOptions {
    /// Nest child nodes under [`GROUPING_FIELD`]
    pub use_grouping_field: bool,
    /// Handling of unrecognized document keys
    pub extra_fields: ExtraFields,
    /// Missing child keys parse as unset instead of default nodes
    pub allow_partial: bool,
    /// Source of deep fetchers
    pub registry: Arc<dyn FetcherRegistry>,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            use_grouping_field: false,
            extra_fields: ExtraFields::default(),
            allow_partial: true,
            registry: Arc::new(SchemaFetchers::new()),
        }
    }
}

impl fmt::Debug for FactoryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryOptions")
            .field("use_grouping_field", &self.use_grouping_field)
            .field("extra_fields", &self.extra_fields)
            .field("allow_partial", &self.allow_partial)
            .finish_non_exhaustive()
    }
}

/// Descriptors already compiled during one [`ResolutionType::build`] call.
#[derive(Default)]
struct DescriptorCache {
    by_type: HashMap<TypeId, NodeId>,
}

struct Compiler<'g> {
    graph: &'g SchemaGraph,
    arena: Vec<NodeDescriptor>,
    cache: DescriptorCache,
}

impl Compiler<'_> {
    fn compile(&mut self, node: &str, schema: SchemaRef) -> NodeId {
        if let Some(&id) = self.cache.by_type.get(&schema.type_id()) {
            trace!("Reusing descriptor for {} at '{}'", schema.name(), node);
            return id;
        }

        let children = self
            .graph
            .children(node)
            .into_iter()
            .map(|(field, child)| {
                let id = self.compile(&field, child);
                ChildDescriptor { field, node: id }
            })
            .collect();

        let id = NodeId(self.arena.len());
        self.arena.push(NodeDescriptor { schema, children });
        self.cache.by_type.insert(schema.type_id(), id);
        id
    }
}

struct TypeInner {
    arena: Vec<NodeDescriptor>,
    root: NodeId,
    options: FactoryOptions,
}

/// Compiled resolution-tree type for one root schema.
///
/// Cheap to clone; trees parsed from it share the descriptor arena.
#[derive(Clone)]
pub struct ResolutionType {
    inner: Arc<TypeInner>,
}

impl ResolutionType {
    /// Compile `graph` into a resolution type.
    #[must_use]
    pub fn build(graph: &SchemaGraph, options: FactoryOptions) -> Self {
        let mut compiler = Compiler {
            graph,
            arena: Vec::new(),
            cache: DescriptorCache::default(),
        };
        let root = compiler.compile(ROOT_NODE, graph.root_schema());

        debug!(
            "Compiled resolution type for {}: {} descriptors",
            graph.root_schema().name(),
            compiler.arena.len()
        );

        Self {
            inner: Arc::new(TypeInner {
                arena: compiler.arena,
                root,
                options,
            }),
        }
    }

    /// Build the schema graph for `T` and compile it.
    pub fn for_schema<T: SchemaType>(options: FactoryOptions) -> Result<Self> {
        Self::for_schema_ref(SchemaRef::of::<T>(), options)
    }

    /// Build the schema graph for a type-erased root and compile it.
    pub fn for_schema_ref(schema: SchemaRef, options: FactoryOptions) -> Result<Self> {
        let graph = SchemaGraph::build_from(schema)?;
        Ok(Self::build(&graph, options))
    }

    /// The root schema type.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.descriptor(self.root()).schema
    }

    /// The root descriptor id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    /// Options this type was compiled with.
    #[must_use]
    pub fn options(&self) -> &FactoryOptions {
        &self.inner.options
    }

    /// The descriptor for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` comes from a different resolution type.
    #[must_use]
    pub fn descriptor(&self, id: NodeId) -> &NodeDescriptor {
        &self.inner.arena[id.0]
    }

    /// Number of distinct descriptors (one per schema type reachable from the root).
    #[must_use]
    pub fn descriptor_count(&self) -> usize {
        self.inner.arena.len()
    }

    /// Deep fetcher for the root schema type.
    #[must_use]
    pub fn get_deep_fetcher(&self) -> Arc<dyn DeepFetcher> {
        self.fetcher_for(self.root())
    }

    pub(crate) fn fetcher_for(&self, id: NodeId) -> Arc<dyn DeepFetcher> {
        self.inner.options.registry.get_deep_fetcher(self.descriptor(id).schema)
    }

    /// YAML data entry template for the root schema type.
    pub fn create_data_entry_template(&self) -> Result<String> {
        self.template_for(self.root())
    }

    /// YAML data entry template for the schema type of `id`.
    ///
    /// Compiles a fresh non-partial type for that schema and renders a tree in
    /// which every node carries [`NameConstructor::example`](super::naming::NameConstructor::example).
    pub(crate) fn template_for(&self, id: NodeId) -> Result<String> {
        let options = FactoryOptions {
            allow_partial: false,
            ..self.inner.options.clone()
        };
        let template_type = Self::for_schema_ref(self.descriptor(id).schema, options)?;
        let root = ResolutionNode::example(&template_type, template_type.root());
        ResolutionTree::new(template_type, root).to_yaml()
    }

    /// A tree with no selectors, shaped by [`FactoryOptions::allow_partial`].
    #[must_use]
    pub fn empty_tree(&self) -> ResolutionTree {
        let root = ResolutionNode::default_for(self, self.root());
        ResolutionTree::new(self.clone(), root)
    }

    /// Parse a resolution document.
    pub fn parse_value(&self, value: Value) -> Result<ResolutionTree> {
        let root = ResolutionNode::parse(self, self.root(), value)?;
        Ok(ResolutionTree::new(self.clone(), root))
    }

    /// Parse a YAML resolution document.
    pub fn parse_yaml(&self, content: &str) -> Result<ResolutionTree> {
        let value: Value = serde_yaml::from_str(content)?;
        self.parse_value(value)
    }

    /// Parse a JSON resolution document.
    pub fn parse_json(&self, content: &str) -> Result<ResolutionTree> {
        let value: Value = serde_json::from_str(content)?;
        self.parse_value(value)
    }
}

impl fmt::Debug for ResolutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionType")
            .field("schema", &self.schema())
            .field("descriptors", &self.inner.arena.len())
            .field("options", &self.inner.options)
            .finish()
    }
}
