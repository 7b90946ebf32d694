//! Startup plumbing for the binary.
//!
//! - [`config`] - Layered feed configuration
//! - [`logging`] - Tracing subscriber installation

pub mod config;
pub mod logging;

pub use config::FeedConfig;
pub use logging::init_logging;
