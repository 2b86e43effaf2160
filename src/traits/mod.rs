//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP operations (GET, POST, PUT, PATCH, DELETE, streaming POST)
//! - [`PreferencesStore`] - persisted operator preferences

pub mod http;
pub mod preferences;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
pub use preferences::{PreferencesError, PreferencesStore};
