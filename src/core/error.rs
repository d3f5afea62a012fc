//! Error handling for the composer
//!
//! This module provides the strongly-typed [`ComposeError`] used by every library
//! operation, plus the user-facing reporting layer used by the CLI:
//!
//! - [`ComposeError`] - Enumerated failure modes of graph building, tree parsing,
//!   structural validation, fetching and construction
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//! - [`user_friendly_error`] - Converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Error Categories
//!
//! - **Schema**: [`ComposeError::AmbiguousFieldName`], [`ComposeError::RecursiveSchema`],
//!   [`ComposeError::SchemaMismatch`]
//! - **Documents**: [`ComposeError::UnknownTreeField`], [`ComposeError::InvalidTreeDocument`]
//! - **Resolution**: [`ComposeError::MissingContextField`], [`ComposeError::UnresolvableTree`],
//!   [`ComposeError::UnknownMergeKey`], [`ComposeError::MergeTypeMismatch`]
//! - **Library**: [`ComposeError::RecordNotFound`], [`ComposeError::DuplicateRecord`],
//!   [`ComposeError::ReferenceCycle`], [`ComposeError::ConstructionValidation`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use sbem_compose::core::{ComposeError, ErrorContext};
//!
//! let error = ComposeError::RecordNotFound {
//!     type_name: "Lighting".to_string(),
//!     name: "office_led".to_string(),
//! };
//! ErrorContext::new(error)
//!     .with_suggestion("Check the library file for a Lighting record named 'office_led'")
//!     .display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use super::suggest::format_suggestions;

/// The main error type for composer operations.
///
/// Messages are written for the person authoring selector documents and
/// component libraries, so every variant names the offending path, field or
/// record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    /// A name constructor referenced a context field the caller did not supply.
    #[error("Context field '{field}' is required to construct a component name")]
    MissingContextField {
        /// The first missing source field
        field: String,
        /// Context keys that were available
        available: Vec<String>,
    },

    /// A context value could not be rendered into a component name.
    #[error("Context field '{field}' must be a string, number or boolean")]
    InvalidContextValue {
        /// The offending context key
        field: String,
    },

    /// A merge patch contained a key the base mapping does not have.
    #[error("Cannot merge unknown key '{path}' into the library record{}", format_suggestions(.suggestions))]
    UnknownMergeKey {
        /// Colon-separated path of the key within the patch
        path: String,
        /// Closest existing keys at that level
        suggestions: Vec<String>,
    },

    /// A mapping patch targeted a key whose base value is not a mapping.
    #[error("Cannot merge a mapping into non-mapping value at '{path}'")]
    MergeTypeMismatch {
        /// Colon-separated path of the key within the patch
        path: String,
    },

    /// Structural validation found nodes that can never resolve.
    #[error("Selector tree cannot be resolved: {}", .errors.join(", "))]
    UnresolvableTree {
        /// Every offending path, in tree order
        errors: Vec<String>,
    },

    /// The deep fetch found no record with the requested name.
    #[error("No {type_name} record named '{name}' in the component library")]
    RecordNotFound {
        /// Schema type name of the requested record
        type_name: String,
        /// The record name that was looked up
        name: String,
    },

    /// A library record exists but is not a mapping.
    #[error("{type_name} record '{name}' is malformed: {reason}")]
    InvalidRecord {
        /// Schema type name of the record
        type_name: String,
        /// Record name
        name: String,
        /// Why the record was rejected
        reason: String,
    },

    /// Two library documents define the same record.
    #[error("{type_name} record '{name}' is defined more than once")]
    DuplicateRecord {
        /// Schema type name of the record
        type_name: String,
        /// Record name
        name: String,
    },

    /// Library records reference each other in a loop.
    #[error("Record references form a cycle: {}", .chain.join(" → "))]
    ReferenceCycle {
        /// `Type:Name` entries along the cycle
        chain: Vec<String>,
    },

    /// A mapping could not be constructed into the schema type.
    #[error("Failed to construct {type_name} '{name}': {reason}")]
    ConstructionValidation {
        /// Schema type being constructed
        type_name: String,
        /// Name of the component being constructed
        name: String,
        /// Deserialization or validation failure
        reason: String,
    },

    /// Two nested types were declared under the same field name.
    #[error(
        "Field name '{field}' is used for both {first} and {second} at different nesting levels"
    )]
    AmbiguousFieldName {
        /// The colliding field name
        field: String,
        /// Type bound first
        first: String,
        /// Type that collided with it
        second: String,
    },

    /// A schema type contains itself.
    #[error("Schema is recursive: {}", .path.join(" → "))]
    RecursiveSchema {
        /// Type names from the outermost occurrence back to the repeat
        path: Vec<String>,
    },

    /// A typed entry point was called with the wrong schema type.
    #[error("Expected a {expected} tree but found a {found} tree")]
    SchemaMismatch {
        /// Requested schema type
        expected: String,
        /// Schema type of the tree
        found: String,
    },

    /// A selector document contains a key that is not part of the tree shape.
    #[error("Unknown field '{field}' at '{path}'{}", format_suggestions(.suggestions))]
    UnknownTreeField {
        /// Colon-separated node path (`root` for the top level)
        path: String,
        /// The unrecognised key
        field: String,
        /// Closest accepted keys
        suggestions: Vec<String>,
    },

    /// A selector document has the wrong structure at some node.
    #[error("Invalid selector document at '{path}': {reason}")]
    InvalidTreeDocument {
        /// Colon-separated node path
        path: String,
        /// Why the node was rejected
        reason: String,
    },

    /// Converting between documents and values failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ComposeError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<serde_yaml::Error> for ComposeError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Error context wrapper that adds user-friendly details and suggestions.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error, rendered as the headline
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {:#}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Walks the error chain looking for a [`ComposeError`] (it is usually wrapped in
/// `anyhow` context by the CLI) and attaches a suggestion tailored to the
/// variant. Errors without a known cause are passed through unchanged.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let compose_error = error.chain().find_map(|cause| cause.downcast_ref::<ComposeError>()).cloned();

    let Some(compose_error) = compose_error else {
        return ErrorContext::new(error);
    };

    let context = ErrorContext::new(error);
    match compose_error {
        ComposeError::MissingContextField { available, .. } => context
            .with_details(format!("Available context fields: {}", available.join(", ")))
            .with_suggestion("Pass the field with --context KEY=VALUE or add it to [context] in the config file"),
        ComposeError::UnresolvableTree { errors } => context
            .with_details(format!("{} node(s) cannot resolve", errors.len()))
            .with_suggestion("Give every listed node a selector, or specify all of its children"),
        ComposeError::RecordNotFound { type_name, .. } => context.with_suggestion(format!(
            "Add the record under '{type_name}' in the component library or fix the selector's source fields"
        )),
        ComposeError::UnknownMergeKey { .. } => context
            .with_details("Child selections can only override fields the library record already defines")
            .with_suggestion("Check that the library record populates the overridden component"),
        ComposeError::UnknownTreeField { .. } => context
            .with_suggestion("Run 'sbem-compose template' to see the accepted document shape"),
        ComposeError::ConstructionValidation { .. } => context
            .with_suggestion("Select a library record for the node or specify every required child"),
        ComposeError::AmbiguousFieldName { .. } | ComposeError::RecursiveSchema { .. } => context
            .with_details("Schemas must be acyclic trees whose field names map to a single nested type"),
        _ => context,
    }
}
