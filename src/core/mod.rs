//! Core types shared by every layer of the composer
//!
//! - [`ComposeError`] - Enumerated failure modes of the library
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI-facing error presentation
//! - [`suggest`] - "Did you mean" helpers used by error messages
//!
//! Every library operation returns [`Result<T>`], an alias over [`ComposeError`].
//! Application code (CLI, configuration) uses `anyhow` and converts to an
//! [`ErrorContext`] at the top level.

pub mod error;
pub mod suggest;

pub use error::{ComposeError, ErrorContext, user_friendly_error};

/// Result alias for composer operations.
pub type Result<T, E = ComposeError> = std::result::Result<T, E>;
