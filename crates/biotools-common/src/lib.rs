//! BioTools Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the BioTools workspace.
//!
//! - **Error Handling**: [`BioToolsError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by [`logging::LogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use biotools_common::logging::{init_logging, LogConfig};
//! use biotools_common::{BioToolsError, Result};
//!
//! fn check_cycles(cycles: u32) -> Result<()> {
//!     if cycles < 1 {
//!         return Err(BioToolsError::config("cycles must be at least 1"));
//!     }
//!     Ok(())
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     check_cycles(2)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{BioToolsError, Result};
