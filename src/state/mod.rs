//! Client-side state containers
//!
//! - `ThinkingTimeline` - ordered thinking steps of one chat turn
//! - `ChatState` - transcript, timeline and the running turn
//! - `WorkspaceSelection` - persisted workspace scope for chat turns
//!
//! None of these touch the network; they are fed by the API layer.

mod chat;
mod thinking;
mod workspaces;

pub use chat::ChatState;
pub use thinking::ThinkingTimeline;
pub use workspaces::WorkspaceSelection;
