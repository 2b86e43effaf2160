use super::{segment, CopilotClient};
use crate::error::CopilotResult;
use crate::models::{Conversation, ConversationSummary, RenameConversation};

impl CopilotClient {
    /// Saved conversations, most recent first as returned by the backend.
    pub async fn list_conversations(&self) -> CopilotResult<Vec<ConversationSummary>> {
        self.get_list("/api/conversations", "conversations", "list_conversations")
            .await
    }

    /// One conversation with its messages.
    pub async fn get_conversation(&self, id: &str) -> CopilotResult<Conversation> {
        self.get_json(
            &format!("/api/conversations/{}", segment(id)),
            "get_conversation",
        )
        .await
    }

    pub async fn rename_conversation(&self, id: &str, title: &str) -> CopilotResult<()> {
        let body = RenameConversation {
            title: title.to_string(),
        };
        self.patch_unit(
            &format!("/api/conversations/{}", segment(id)),
            &body,
            "rename_conversation",
        )
        .await
    }

    pub async fn delete_conversation(&self, id: &str) -> CopilotResult<()> {
        self.delete_unit(
            &format!("/api/conversations/{}", segment(id)),
            "delete_conversation",
        )
        .await
    }
}
