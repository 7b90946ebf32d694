//! Event feed connection management
//!
//! [`ConnectionMachine`] decides what happens on every connect, frame,
//! failure and timer tick. [`StreamManager`] runs it on tokio and performs
//! the I/O it asks for.

pub mod config;
pub mod machine;
pub mod manager;
pub mod state;

pub use config::{StreamConfig, StreamScope, DEFAULT_MAX_RETRIES, DEFAULT_RECONNECT_DELAY};
pub use machine::{Action, ConnectionMachine, StreamUpdate};
pub use manager::{StreamHandle, StreamManager};
pub use state::{ConnectionPhase, ConnectionState};
