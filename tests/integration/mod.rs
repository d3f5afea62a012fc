//! Integration test suite for sbem-compose
//!
//! End-to-end tests of the composer API and the `sbem-compose` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **composer**: Select-then-patch resolution through the public API
//! - **cli**: The `graph`, `template`, `validate` and `resolve` commands

mod cli;
mod composer;
