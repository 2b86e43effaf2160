use serde::Serialize;

use super::{encode_path, segment, CopilotClient};
use crate::error::CopilotResult;
use crate::models::{FileContent, NewWorkspace, Workspace};

#[derive(Serialize)]
struct WriteFile<'a> {
    content: &'a str,
}

fn file_path(workspace_id: &str, path: &str) -> String {
    format!(
        "/api/workspaces/{}/files/{}",
        segment(workspace_id),
        encode_path(path)
    )
}

impl CopilotClient {
    pub async fn list_workspaces(&self) -> CopilotResult<Vec<Workspace>> {
        self.get_list("/api/workspaces", "workspaces", "list_workspaces")
            .await
    }

    pub async fn get_workspace(&self, id: &str) -> CopilotResult<Workspace> {
        self.get_json(&format!("/api/workspaces/{}", segment(id)), "get_workspace")
            .await
    }

    pub async fn create_workspace(&self, workspace: &NewWorkspace) -> CopilotResult<Workspace> {
        self.post_json("/api/workspaces", workspace, "create_workspace")
            .await
    }

    pub async fn delete_workspace(&self, id: &str) -> CopilotResult<()> {
        self.delete_unit(&format!("/api/workspaces/{}", segment(id)), "delete_workspace")
            .await
    }

    /// Read one file. A response without `path` gets the requested path.
    pub async fn read_file(&self, workspace_id: &str, path: &str) -> CopilotResult<FileContent> {
        let mut file: FileContent = self
            .get_json(&file_path(workspace_id, path), "read_file")
            .await?;
        if file.path.is_empty() {
            file.path = path.to_string();
        }
        Ok(file)
    }

    /// Create or replace one file.
    pub async fn write_file(
        &self,
        workspace_id: &str,
        path: &str,
        content: &str,
    ) -> CopilotResult<()> {
        self.put_unit(
            &file_path(workspace_id, path),
            &WriteFile { content },
            "write_file",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::api::CopilotClient;
    use crate::config::ClientConfig;
    use crate::models::NewWorkspace;
    use crate::traits::Response;

    fn client_with(mock: &MockHttpClient) -> CopilotClient {
        CopilotClient::with_http_client(ClientConfig::default(), Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_list_workspaces_bare_array() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://localhost:8000/api/workspaces",
            MockResponse::Success(Response::new(
                200,
                Bytes::from(r#"[{"id":"ws-1","name":"S4 QA"},{"id":7,"name":"ECC"}]"#),
            )),
        );

        let workspaces = client_with(&mock).list_workspaces().await.unwrap();
        assert_eq!(workspaces.len(), 2);
        assert_eq!(workspaces[1].id, "7");
    }

    #[tokio::test]
    async fn test_create_workspace_posts_body() {
        let mock = MockHttpClient::new();
        mock.set_method_response(
            "POST",
            "http://localhost:8000/api/workspaces",
            MockResponse::Success(Response::new(
                201,
                Bytes::from(r#"{"id":"ws-9","name":"BW"}"#),
            )),
        );

        let created = client_with(&mock)
            .create_workspace(&NewWorkspace {
                name: "BW".to_string(),
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(created.id, "ws-9");
        assert_eq!(
            mock.get_requests()[0].json_body(),
            Some(serde_json::json!({"name": "BW"}))
        );
    }

    #[tokio::test]
    async fn test_read_file_encodes_path_and_fills_missing_path() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://localhost:8000/api/workspaces/ws-1/files/landscape/QA%20systems.yaml",
            MockResponse::Success(Response::new(
                200,
                Bytes::from(r#"{"content":"systems: []"}"#),
            )),
        );

        let file = client_with(&mock)
            .read_file("ws-1", "landscape/QA systems.yaml")
            .await
            .unwrap();

        assert_eq!(file.path, "landscape/QA systems.yaml");
        assert_eq!(file.content, "systems: []");
    }

    #[tokio::test]
    async fn test_write_file_puts_content() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::NoBody);

        client_with(&mock)
            .write_file("ws-1", "config/sap.json", "{\"client\":\"100\"}")
            .await
            .unwrap();

        let requests = mock.get_requests();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(
            requests[0].url,
            "http://localhost:8000/api/workspaces/ws-1/files/config/sap.json"
        );
        assert_eq!(
            requests[0].json_body(),
            Some(serde_json::json!({"content": "{\"client\":\"100\"}"}))
        );
    }
}
