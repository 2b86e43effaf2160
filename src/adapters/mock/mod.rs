//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`InMemoryPreferences`] - in-memory preferences store

pub mod http;
pub mod preferences;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use preferences::InMemoryPreferences;
