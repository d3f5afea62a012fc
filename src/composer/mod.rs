//! Schema-driven component composition
//!
//! The composer turns a tree of *selectors* into a fully specified component by
//! picking records from a library and patching them with more specific picks
//! further down the tree.
//!
//! # Pipeline
//!
//! 1. [`SchemaGraph`] walks a component type's nested fields and records which
//!    field holds which component type.
//! 2. [`ResolutionType`] compiles the graph into one descriptor per component
//!    type. Fields sharing a type share a descriptor.
//! 3. A [`ResolutionTree`] is parsed from YAML or JSON against those
//!    descriptors. Each node may carry a [`NameConstructor`] under `selector`.
//! 4. [`ResolutionTree::get_component`] resolves the tree bottom-up: selected
//!    nodes fetch their record through a [`DeepFetcher`] and patch their
//!    resolved children into it. A validated child replaces its sub-object
//!    whole; a raw child mapping merges key by key as in
//!    [`recursive_dict_merge`].
//!
//! # Example
//!
//! ```rust,no_run
//! use sbem_compose::components::ZoneComponent;
//! use sbem_compose::composer::{Context, FactoryOptions, ResolutionType};
//! use sbem_compose::library::LibraryStore;
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = LibraryStore::load("library.yaml".as_ref())?;
//! let ty = ResolutionType::for_schema::<ZoneComponent>(FactoryOptions::default())?;
//! let tree = ty.parse_yaml("selector:\n  source_fields: [typology]\n")?;
//!
//! let context: Context = [("typology", "office")].into_iter().collect();
//! let zone: ZoneComponent = tree.get_component(&context, &store)?;
//! println!("{}", zone.name);
//! # Ok(())
//! # }
//! ```

mod fetcher;
mod graph;
mod merge;
mod naming;
mod resolution;
mod resolve;
mod schema;
mod tree;

pub use fetcher::{ComponentStore, DeepFetcher, DeepObject, FetcherRegistry, SchemaFetcher, SchemaFetchers};
pub use graph::{ROOT_NODE, SchemaEdge, SchemaGraph};
pub use merge::recursive_dict_merge;
pub use naming::{Context, NAME_SEPARATOR, NameConstructor};
pub use resolution::{
    ChildDescriptor, ExtraFields, FactoryOptions, GROUPING_FIELD, NodeDescriptor, NodeId,
    ResolutionType, SELECTOR_FIELD,
};
pub use resolve::{ResolveOptions, Resolved};
pub use schema::{
    CollectionKind, FieldKind, NAME_FIELD, SchemaField, SchemaRef, SchemaType, dump_mapping,
    strip_nulls,
};
pub use tree::{ChildSlot, NODE_NOT_SPECIFIED, NO_SELECTOR_SPECIFIED, NodeView, ResolutionTree, ResolutionNode};
