//! Declarative schema description consumed by the graph builder.
//!
//! Component types describe their own fields through [`SchemaType::schema_fields`]
//! instead of being introspected at runtime. Each field is tagged with a
//! [`FieldKind`]; only [`FieldKind::Nested`] fields (or the first nested member of a
//! [`FieldKind::Union`]) become relationship edges.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::{ComposeError, Result};

/// Serialized key holding a component's name.
pub const NAME_FIELD: &str = "Name";

/// A named component type whose fields the composer can traverse.
///
/// Implementors serialize to a mapping containing a [`NAME_FIELD`] string and
/// enumerate their fields in declaration order. The serialized key of every
/// declared field must match [`SchemaField::name`].
pub trait SchemaType: Serialize + DeserializeOwned + 'static {
    /// Type name used for library lookups and synthesized component names.
    const TYPE_NAME: &'static str;

    /// The declared fields of this type, in declaration order.
    fn schema_fields() -> Vec<SchemaField>;

    /// The component's `Name`.
    fn name(&self) -> &str;

    /// Constraint checks that serde alone cannot express.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Shape of a collection field. Collections are never traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// A homogeneous list
    List,
    /// A keyed map
    Map,
    /// A fixed-size tuple
    Tuple,
}

/// How a declared field participates in the schema graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain value; never an edge.
    Scalar,
    /// Nested component; always an edge.
    Nested(SchemaRef),
    /// One of several kinds; the first `Nested` member (if any) becomes the edge.
    Union(Vec<FieldKind>),
    /// List/map/tuple of anything; skipped entirely.
    Collection(CollectionKind),
}

impl FieldKind {
    /// Nested component of type `T`.
    #[must_use]
    pub fn nested<T: SchemaType>() -> Self {
        Self::Nested(SchemaRef::of::<T>())
    }

    /// Nullable nested component of type `T`.
    #[must_use]
    pub fn optional<T: SchemaType>() -> Self {
        Self::Union(vec![Self::nested::<T>(), Self::Scalar])
    }

    /// The nested schema this field points at, if it is a relationship.
    ///
    /// Unions are unwrapped one level only.
    #[must_use]
    pub fn relationship(&self) -> Option<SchemaRef> {
        match self {
            Self::Nested(schema) => Some(*schema),
            Self::Union(members) => members.iter().find_map(|member| match member {
                Self::Nested(schema) => Some(*schema),
                _ => None,
            }),
            Self::Scalar | Self::Collection(_) => None,
        }
    }
}

/// A declared field of a schema type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    /// Serialized field name
    pub name: &'static str,
    /// How the field participates in the graph
    pub kind: FieldKind,
}

impl SchemaField {
    /// A scalar field.
    #[must_use]
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
        }
    }

    /// A nested component field.
    #[must_use]
    pub fn nested<T: SchemaType>(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::nested::<T>(),
        }
    }

    /// A nullable nested component field.
    #[must_use]
    pub fn optional<T: SchemaType>(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::optional::<T>(),
        }
    }

    /// A list field.
    #[must_use]
    pub const fn list(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Collection(CollectionKind::List),
        }
    }
}

/// Type-erased handle to a [`SchemaType`].
///
/// Equality and hashing use the Rust type identity, so two handles to the same
/// type are interchangeable.
#[derive(Clone, Copy)]
pub struct SchemaRef {
    type_id: TypeId,
    name: &'static str,
    fields: fn() -> Vec<SchemaField>,
    construct: fn(Value) -> std::result::Result<Map<String, Value>, String>,
}

impl SchemaRef {
    /// Handle for `T`.
    #[must_use]
    pub fn of<T: SchemaType>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: T::TYPE_NAME,
            fields: T::schema_fields,
            construct: construct_mapping::<T>,
        }
    }

    /// Rust type identity.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Schema type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> Vec<SchemaField> {
        (self.fields)()
    }

    /// Construct and validate an instance from `value`, returning its dump.
    ///
    /// The error string describes the deserialization or validation failure.
    pub fn construct(&self, value: Value) -> std::result::Result<Map<String, Value>, String> {
        (self.construct)(value)
    }
}

impl PartialEq for SchemaRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for SchemaRef {}

impl Hash for SchemaRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SchemaRef").field(&self.name).finish()
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn construct_mapping<T: SchemaType>(value: Value) -> std::result::Result<Map<String, Value>, String> {
    let instance: T = serde_json::from_value(value).map_err(|e| e.to_string())?;
    instance.validate()?;
    dump_mapping(&instance).map_err(|e| e.to_string())
}

/// Dump a value to a mapping, dropping null fields at every depth.
pub fn dump_mapping<T: Serialize>(instance: &T) -> Result<Map<String, Value>> {
    match strip_nulls(serde_json::to_value(instance)?) {
        Value::Object(map) => Ok(map),
        other => Err(ComposeError::Serialization(format!(
            "expected a mapping, got {}",
            value_kind(&other)
        ))),
    }
}

/// Remove null-valued keys from every mapping in `value`.
#[must_use]
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

pub(crate) const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
