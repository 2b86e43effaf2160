//! Concrete implementations of trait abstractions.
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FilePreferences`] - JSON-file preferences storage
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - configurable HTTP responses and chunked bodies
//! - [`mock::InMemoryPreferences`] - in-memory preferences storage

pub mod file_preferences;
pub mod mock;
pub mod reqwest_http;

pub use file_preferences::FilePreferences;
pub use mock::{InMemoryPreferences, MockHttpClient};
pub use reqwest_http::ReqwestHttpClient;
