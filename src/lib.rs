//! Session feed - a live view of a remote agent conversation
//!
//! Consumes the agent service's server-sent event feed, keeps the
//! subscription alive with a bounded retry policy, and merges message and
//! part updates into a local ordered cache.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod cli;
pub mod error;
pub mod events;
pub mod models;
pub mod prelude;
pub mod sse;
pub mod startup;
pub mod stream;
pub mod sync;
pub mod traits;
