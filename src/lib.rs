//! sbem-compose - schema-driven component composer for building energy models
//!
//! Building energy model inputs are deep trees of components (a zone holds
//! operations, which hold space use, which holds lighting, ...). Libraries
//! store fully specified records of every component type. sbem-compose builds
//! a concrete component by *selecting* library records through names derived
//! from a context, and *patching* them with more specific selections further
//! down the tree.
//!
//! # Core Modules
//!
//! - [`composer`] - Schema graph, name construction, resolution trees, strict
//!   merging and deep fetching
//! - [`components`] - The SBEM zone component schema
//! - [`library`] - In-memory component library loaded from YAML or JSON
//! - [`config`] - `sbem-compose.toml` settings
//! - [`core`] - Error types and user-facing error reporting
//! - [`cli`] - Command-line interface
//!
//! # Selector Documents
//!
//! A selector document mirrors the nesting of the root component. Any node may
//! carry a `selector` naming the context fields that build its library record
//! name:
//!
//! ```yaml
//! selector:
//!   source_fields: [typology]          # Zone "office"
//! Operations:
//!   SpaceUse:
//!     Lighting:
//!       selector:
//!         source_fields: [typology, lighting_type]   # Lighting "office_led"
//! ```
//!
//! With `typology=office` and `lighting_type=led`, the zone `office` is fetched
//! and its lighting replaced by the record `office_led`.

pub mod cli;
pub mod components;
pub mod composer;
pub mod config;
pub mod core;
pub mod library;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
