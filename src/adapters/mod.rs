//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Scripted responses and feed subscriptions
//! - [`mock::MockProvisioner`] - Recorded session provisioning

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, MockProvisioner};
pub use reqwest_http::ReqwestHttpClient;
