use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named set of SAP landscape configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: Vec<WorkspaceFile>,
    #[serde(default, deserialize_with = "super::deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceFile {
    pub path: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, deserialize_with = "super::deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/workspaces`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWorkspace {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// File body as read from or written to a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    #[serde(default)]
    pub path: String,
    #[serde(default, deserialize_with = "super::deserialize_nullable_string")]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_with_files() {
        let workspace: Workspace = serde_json::from_str(
            r#"{"id":"ws-1","name":"S4 QA","files":[{"path":"landscape/systems.yaml","size":512}]}"#,
        )
        .unwrap();

        assert_eq!(workspace.name, "S4 QA");
        assert_eq!(workspace.files[0].path, "landscape/systems.yaml");
        assert_eq!(workspace.files[0].size, Some(512));
        assert!(workspace.description.is_none());
    }

    #[test]
    fn test_new_workspace_body() {
        let body = serde_json::to_value(NewWorkspace {
            name: "S4 QA".to_string(),
            description: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "S4 QA"}));
    }
}
