//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted feed subscriptions
//! - [`MockProvisioner`] - In-memory session provisioning

pub mod http;
pub mod provisioner;

pub use http::{sse_frame, LiveFeed, MockHttpClient, MockResponse, MockStream, RecordedRequest};
pub use provisioner::MockProvisioner;
