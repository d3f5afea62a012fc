//! Resolution trees: selector documents parsed against a [`ResolutionType`].
//!
//! A tree mirrors the schema graph. Every node may carry a selector naming the
//! library record to start from, and every child field is either unset or a
//! nested node overriding part of that record.
//!
//! ```yaml
//! selector:
//!   source_fields: [typology, age]
//! Envelope:
//!   Window:
//!     selector:
//!       source_fields: [windows]
//! ```

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::fetcher::{ComponentStore, DeepFetcher};
use super::graph::ROOT_NODE;
use super::naming::{Context, NameConstructor};
use super::resolution::{
    ExtraFields, GROUPING_FIELD, NodeDescriptor, NodeId, ResolutionType, SELECTOR_FIELD,
};
use super::resolve::{ResolveOptions, Resolved, resolve_node};
use super::schema::{SchemaRef, SchemaType, value_kind};
use crate::core::suggest::find_similar_names;
use crate::core::{ComposeError, Result};

/// Error path segment for a leaf without a selector.
pub const NO_SELECTOR_SPECIFIED: &str = "NoSelectorSpecified";

/// Error path segment for an unset child slot.
pub const NODE_NOT_SPECIFIED: &str = "NodeNotSpecified";

/// Value of one child field of a resolution node.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildSlot {
    /// No override; the parent's record supplies this child
    Unset,
    /// A nested resolution node
    Node(Box<ResolutionNode>),
}

impl ChildSlot {
    /// The nested node, if set.
    #[must_use]
    pub fn as_node(&self) -> Option<&ResolutionNode> {
        match self {
            Self::Unset => None,
            Self::Node(node) => Some(node),
        }
    }
}

/// One node of a resolution tree.
///
/// `children` is index-aligned with the descriptor's child fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionNode {
    descriptor: NodeId,
    selector: Option<NameConstructor>,
    children: Vec<ChildSlot>,
}

impl ResolutionNode {
    /// Descriptor id of this node.
    #[must_use]
    pub const fn descriptor(&self) -> NodeId {
        self.descriptor
    }

    /// This node's selector.
    #[must_use]
    pub const fn selector(&self) -> Option<&NameConstructor> {
        self.selector.as_ref()
    }

    /// Child slots in descriptor order.
    #[must_use]
    pub fn children(&self) -> &[ChildSlot] {
        &self.children
    }

    /// A selector-less node. Children are unset in partial mode and default nodes
    /// otherwise.
    pub(crate) fn default_for(ty: &ResolutionType, id: NodeId) -> Self {
        let children = ty
            .descriptor(id)
            .children
            .iter()
            .map(|child| {
                if ty.options().allow_partial {
                    ChildSlot::Unset
                } else {
                    ChildSlot::Node(Box::new(Self::default_for(ty, child.node)))
                }
            })
            .collect();

        Self {
            descriptor: id,
            selector: None,
            children,
        }
    }

    /// A fully populated node where every level carries the example selector.
    pub(crate) fn example(ty: &ResolutionType, id: NodeId) -> Self {
        Self {
            descriptor: id,
            selector: Some(NameConstructor::example()),
            children: ty
                .descriptor(id)
                .children
                .iter()
                .map(|child| ChildSlot::Node(Box::new(Self::example(ty, child.node))))
                .collect(),
        }
    }

    pub(crate) fn parse(ty: &ResolutionType, id: NodeId, value: Value) -> Result<Self> {
        let mut path = Vec::new();
        Parser { ty }.parse_node(id, value, &mut path)
    }

    fn render(&self, ty: &ResolutionType) -> Value {
        let descriptor = ty.descriptor(self.descriptor);

        let mut children = Map::new();
        for (child, slot) in descriptor.children.iter().zip(&self.children) {
            if let Some(node) = slot.as_node() {
                children.insert(child.field.clone(), node.render(ty));
            }
        }

        let mut rendered = Map::new();
        if let Some(selector) = &self.selector {
            // Plain strings; serialization cannot fail.
            if let Ok(value) = serde_json::to_value(selector) {
                rendered.insert(SELECTOR_FIELD.to_string(), value);
            }
        }
        if ty.options().use_grouping_field {
            if !children.is_empty() {
                rendered.insert(GROUPING_FIELD.to_string(), Value::Object(children));
            }
        } else {
            rendered.extend(children);
        }
        Value::Object(rendered)
    }

    fn check_resolvable(
        &self,
        ty: &ResolutionType,
        path: &mut Vec<String>,
        errors: &mut Vec<String>,
    ) -> bool {
        if self.selector.is_some() {
            return true;
        }

        let descriptor = ty.descriptor(self.descriptor);
        if descriptor.is_leaf() {
            errors.push(error_path(path, NO_SELECTOR_SPECIFIED));
            return false;
        }

        let mut resolvable = true;
        for (child, slot) in descriptor.children.iter().zip(&self.children) {
            path.push(child.field.clone());
            match slot {
                ChildSlot::Unset => {
                    errors.push(error_path(path, NODE_NOT_SPECIFIED));
                    resolvable = false;
                }
                ChildSlot::Node(node) => {
                    if !node.check_resolvable(ty, path, errors) {
                        resolvable = false;
                    }
                }
            }
            path.pop();
        }
        resolvable
    }
}

fn error_path(path: &[String], kind: &str) -> String {
    path.iter().map(String::as_str).chain([kind]).collect::<Vec<_>>().join(":")
}

fn node_path(path: &[String]) -> String {
    if path.is_empty() {
        ROOT_NODE.to_string()
    } else {
        path.join(":")
    }
}

struct Parser<'t> {
    ty: &'t ResolutionType,
}

impl Parser<'_> {
    fn parse_node(&self, id: NodeId, value: Value, path: &mut Vec<String>) -> Result<ResolutionNode> {
        let mut fields = match value {
            Value::Object(map) => map,
            Value::Null if path.is_empty() => Map::new(),
            other => {
                return Err(ComposeError::InvalidTreeDocument {
                    path: node_path(path),
                    reason: format!("expected a mapping, found {}", value_kind(&other)),
                });
            }
        };

        let descriptor = self.ty.descriptor(id);
        let selector = self.parse_selector(fields.remove(SELECTOR_FIELD), path)?;

        let mut child_fields = if self.ty.options().use_grouping_field {
            match fields.remove(GROUPING_FIELD) {
                None | Some(Value::Null) => Map::new(),
                Some(Value::Object(map)) => map,
                Some(other) => {
                    return Err(ComposeError::InvalidTreeDocument {
                        path: node_path(path),
                        reason: format!(
                            "'{GROUPING_FIELD}' must be a mapping, found {}",
                            value_kind(&other)
                        ),
                    });
                }
            }
        } else {
            std::mem::take(&mut fields)
        };

        let mut children = Vec::with_capacity(descriptor.children.len());
        for child in &descriptor.children {
            let slot = match child_fields.remove(&child.field) {
                None if self.ty.options().allow_partial => ChildSlot::Unset,
                None => ChildSlot::Node(Box::new(ResolutionNode::default_for(self.ty, child.node))),
                Some(Value::Null) => ChildSlot::Unset,
                Some(value) => {
                    path.push(child.field.clone());
                    let node = self.parse_node(child.node, value, path)?;
                    path.pop();
                    ChildSlot::Node(Box::new(node))
                }
            };
            children.push(slot);
        }

        let mut extra: Vec<String> = fields.into_iter().map(|(key, _)| key).collect();
        extra.extend(child_fields.into_iter().map(|(key, _)| key));
        self.handle_extra_fields(descriptor, extra, path)?;

        Ok(ResolutionNode {
            descriptor: id,
            selector,
            children,
        })
    }

    fn parse_selector(
        &self,
        value: Option<Value>,
        path: &mut Vec<String>,
    ) -> Result<Option<NameConstructor>> {
        let value = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };

        path.push(SELECTOR_FIELD.to_string());
        if let Value::Object(map) = &value {
            let extra = map
                .keys()
                .filter(|key| !NameConstructor::KEYS.contains(&key.as_str()))
                .cloned()
                .collect();
            self.reject_or_ignore(extra, NameConstructor::KEYS.iter().copied(), path)?;
        }

        let selector = serde_json::from_value(value).map_err(|e| ComposeError::InvalidTreeDocument {
            path: node_path(path),
            reason: e.to_string(),
        })?;
        path.pop();
        Ok(Some(selector))
    }

    fn handle_extra_fields(
        &self,
        descriptor: &NodeDescriptor,
        extra: Vec<String>,
        path: &[String],
    ) -> Result<()> {
        let mut accepted = vec![SELECTOR_FIELD];
        if self.ty.options().use_grouping_field {
            accepted.push(GROUPING_FIELD);
        }
        accepted.extend(descriptor.children.iter().map(|child| child.field.as_str()));
        self.reject_or_ignore(extra, accepted, path)
    }

    fn reject_or_ignore<'a>(
        &self,
        extra: Vec<String>,
        accepted: impl IntoIterator<Item = &'a str>,
        path: &[String],
    ) -> Result<()> {
        match self.ty.options().extra_fields {
            ExtraFields::Forbid => {
                if let Some(field) = extra.into_iter().next() {
                    return Err(ComposeError::UnknownTreeField {
                        path: node_path(path),
                        suggestions: find_similar_names(&field, accepted),
                        field,
                    });
                }
            }
            ExtraFields::Ignore => {
                for field in extra {
                    debug!("Ignoring unknown field '{}' at '{}'", field, node_path(path));
                }
            }
        }
        Ok(())
    }
}

/// A selector document parsed against a [`ResolutionType`].
#[derive(Debug, Clone)]
pub struct ResolutionTree {
    ty: ResolutionType,
    root: ResolutionNode,
}

impl ResolutionTree {
    pub(crate) const fn new(ty: ResolutionType, root: ResolutionNode) -> Self {
        Self { ty, root }
    }

    /// The type this tree was parsed against.
    #[must_use]
    pub const fn resolution_type(&self) -> &ResolutionType {
        &self.ty
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> &ResolutionNode {
        &self.root
    }

    /// View of the root node.
    #[must_use]
    pub const fn view(&self) -> NodeView<'_> {
        NodeView {
            ty: &self.ty,
            node: &self.root,
        }
    }

    /// View of the node at a colon-separated field path (`""` is the root).
    ///
    /// Returns `None` if the path names an unknown field or an unset slot.
    #[must_use]
    pub fn node(&self, path: &str) -> Option<NodeView<'_>> {
        let mut node = &self.root;
        for field in path.split(':').filter(|segment| !segment.is_empty()) {
            let index = self.ty.descriptor(node.descriptor).child_index(field)?;
            node = node.children.get(index)?.as_node()?;
        }
        Some(NodeView { ty: &self.ty, node })
    }

    /// See [`NodeView::validate_successful_resolution`].
    pub fn validate_successful_resolution(&self, raise_on_failure: bool) -> Result<(bool, Vec<String>)> {
        self.view().validate_successful_resolution(raise_on_failure)
    }

    /// Resolve the tree into a validated instance of `T`.
    ///
    /// Fails with [`ComposeError::SchemaMismatch`] if `T` is not the tree's root
    /// schema type.
    pub fn get_component<T: SchemaType>(&self, context: &Context, store: &dyn ComponentStore) -> Result<T> {
        let expected = SchemaRef::of::<T>();
        if expected != self.ty.schema() {
            return Err(ComposeError::SchemaMismatch {
                expected: expected.name().to_string(),
                found: self.ty.schema().name().to_string(),
            });
        }

        let resolved = self.get_component_with(context, store, ResolveOptions::default())?;
        Ok(serde_json::from_value(Value::Object(resolved.into_mapping()))?)
    }

    /// See [`NodeView::get_component_with`].
    pub fn get_component_with(
        &self,
        context: &Context,
        store: &dyn ComponentStore,
        options: ResolveOptions,
    ) -> Result<Resolved> {
        self.view().get_component_with(context, store, options)
    }

    /// The document form of this tree, omitting unset slots and absent selectors.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.root.render(&self.ty)
    }

    /// The tree as a YAML document.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_value())?)
    }
}

impl Serialize for ResolutionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// A node of a [`ResolutionTree`] together with its type information.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'t> {
    ty: &'t ResolutionType,
    node: &'t ResolutionNode,
}

impl<'t> NodeView<'t> {
    /// The schema type this node resolves to.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.ty.descriptor(self.node.descriptor).schema
    }

    /// This node's selector.
    #[must_use]
    pub const fn selector(&self) -> Option<&'t NameConstructor> {
        self.node.selector.as_ref()
    }

    /// Views of the set child slots as `(field, view)`.
    #[must_use]
    pub fn children(&self) -> Vec<(&'t str, NodeView<'t>)> {
        let descriptor = self.ty.descriptor(self.node.descriptor);
        descriptor
            .children
            .iter()
            .zip(&self.node.children)
            .filter_map(|(child, slot)| {
                slot.as_node()
                    .map(|node| (child.field.as_str(), NodeView { ty: self.ty, node }))
            })
            .collect()
    }

    pub(crate) const fn resolution_type(&self) -> &'t ResolutionType {
        self.ty
    }

    pub(crate) const fn node(&self) -> &'t ResolutionNode {
        self.node
    }

    /// Deep fetcher for this node's schema type.
    #[must_use]
    pub fn get_deep_fetcher(&self) -> Arc<dyn DeepFetcher> {
        self.ty.fetcher_for(self.node.descriptor)
    }

    /// YAML data entry template for this node's schema type.
    pub fn create_data_entry_template(&self) -> Result<String> {
        self.ty.template_for(self.node.descriptor)
    }

    /// Check that this subtree resolves without relying on library contents.
    ///
    /// A node resolves if it has a selector, or if it has at least one child
    /// field and every child is set and resolves. Every failing position is
    /// reported as a colon-separated path ending in
    /// [`NO_SELECTOR_SPECIFIED`] or [`NODE_NOT_SPECIFIED`].
    ///
    /// With `raise_on_failure` a failing tree returns
    /// [`ComposeError::UnresolvableTree`] instead of `Ok((false, errors))`.
    pub fn validate_successful_resolution(&self, raise_on_failure: bool) -> Result<(bool, Vec<String>)> {
        let mut path = Vec::new();
        let mut errors = Vec::new();
        let resolvable = self.node.check_resolvable(self.ty, &mut path, &mut errors);

        if !resolvable && raise_on_failure {
            return Err(ComposeError::UnresolvableTree { errors });
        }
        Ok((resolvable, errors))
    }

    /// Resolve this subtree.
    pub fn get_component_with(
        &self,
        context: &Context,
        store: &dyn ComponentStore,
        options: ResolveOptions,
    ) -> Result<Resolved> {
        resolve_node(*self, context, store, options)
    }
}
