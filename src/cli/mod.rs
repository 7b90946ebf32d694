//! CLI module.
//!
//! Flags are parsed before anything else in `main`:
//!
//! ```ignore
//! use session_feed::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Version => handle_version_command(),
//!     CliCommand::Run(args) => { /* tail the feed */ }
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliArgs, CliCommand};
pub use version::{handle_version_command, VERSION};
