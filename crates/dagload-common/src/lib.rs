//! dagload common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging setup for the dagload workspace.
//!
//! - **Error Handling**: [`LoadError`] and the [`Result`] alias used by every
//!   stage of the loader
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{LoadError, Result};
