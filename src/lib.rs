//! QA Copilot client
//!
//! Client library for the SAP QA Copilot backend: streaming chat with
//! thinking-step events, REST wrappers for conversations, workspaces, jobs,
//! schedules and reports, plus the state containers and job poller a front
//! end needs.
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use qa_copilot::api::CopilotClient;
//! use qa_copilot::config::ClientConfig;
//! use qa_copilot::models::ChatRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! let client = CopilotClient::new(ClientConfig::from_env()?)?;
//! let mut events = client.stream_chat(&ChatRequest::new("Run FI smoke tests"), CancellationToken::new());
//! while let Some(event) = events.next().await {
//!     println!("{:?}", event);
//! }
//! ```

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod poller;
pub mod sse;
pub mod state;
pub mod traits;
