//! Test utilities for sbem-compose
//!
//! Shared by unit tests and, through the `test-utils` feature, by the
//! integration suite:
//! - [`init_test_logging`] for opt-in tracing output
//! - [`fixtures`] with small Root/Middle/Leaf schemas, a matching in-memory
//!   library, and file fixtures for the SBEM zone schema
//!
//! # Example
//!
//! ```rust,no_run
//! use sbem_compose::composer::Context;
//! use sbem_compose::test_utils::fixtures::{RootComponent, fixture_store, root_tree};
//!
//! let tree = root_tree(serde_json::json!({"selector": {"source_fields": ["k"]}}));
//! let context: Context = [("k", "R1")].into_iter().collect();
//! let root: RootComponent = tree.get_component(&context, &fixture_store()).unwrap();
//! assert_eq!(root.a.x.name, "AX");
//! ```

pub mod fixtures;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=sbem_compose=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
