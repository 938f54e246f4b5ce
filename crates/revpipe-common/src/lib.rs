//! Revpipe Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the revpipe workspace members:
//!
//! - **Error Handling**: the common error and result types
//! - **Logging**: `tracing` subscriber configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use revpipe_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> revpipe_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CommonError, Result};
