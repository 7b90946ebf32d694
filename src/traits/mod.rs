//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, streaming GET)
//! - [`SessionProvisioner`] - Session creation and message listing
//! - [`RefetchTrigger`] - Cache invalidation requests

pub mod http;
pub mod provisioner;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
pub use provisioner::{RefetchReason, RefetchTrigger, SessionProvisioner};
