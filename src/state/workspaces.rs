//! Workspace selection backed by a [`PreferencesStore`].

use std::sync::Arc;

use crate::models::{Preferences, Workspace};
use crate::traits::{PreferencesError, PreferencesStore};

/// Which workspaces the next chat turn is scoped to.
///
/// Changes stay in memory until [`WorkspaceSelection::save`].
pub struct WorkspaceSelection {
    store: Arc<dyn PreferencesStore>,
    preferences: Preferences,
}

impl std::fmt::Debug for WorkspaceSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceSelection")
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}

impl WorkspaceSelection {
    /// Load the persisted selection. An unreadable store yields an empty
    /// selection.
    pub fn load(store: Arc<dyn PreferencesStore>) -> Self {
        let preferences = match store.load() {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::warn!("Failed to load preferences, using defaults: {}", e);
                Preferences::default()
            }
        };
        Self { store, preferences }
    }

    pub fn selected(&self) -> &[String] {
        &self.preferences.selected_workspace_ids
    }

    pub fn is_selected(&self, workspace_id: &str) -> bool {
        self.selected().iter().any(|id| id == workspace_id)
    }

    /// Flip one workspace. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, workspace_id: &str) -> bool {
        let ids = &mut self.preferences.selected_workspace_ids;
        if let Some(position) = ids.iter().position(|id| id == workspace_id) {
            ids.remove(position);
            false
        } else {
            ids.push(workspace_id.to_string());
            true
        }
    }

    /// Replace the selection. Duplicates are dropped, first occurrence wins.
    pub fn set<I, S>(&mut self, workspace_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = Vec::new();
        for id in workspace_ids {
            let id = id.into();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        self.preferences.selected_workspace_ids = ids;
    }

    /// Drop selected ids the backend no longer knows. Returns the dropped ids.
    pub fn retain_existing(&mut self, workspaces: &[Workspace]) -> Vec<String> {
        let (kept, dropped): (Vec<String>, Vec<String>) = self
            .preferences
            .selected_workspace_ids
            .drain(..)
            .partition(|id| workspaces.iter().any(|w| &w.id == id));
        self.preferences.selected_workspace_ids = kept;
        if !dropped.is_empty() {
            tracing::info!(?dropped, "Removed stale workspace selections");
        }
        dropped
    }

    pub fn last_conversation_id(&self) -> Option<&str> {
        self.preferences.last_conversation_id.as_deref()
    }

    pub fn set_last_conversation_id(&mut self, conversation_id: Option<String>) {
        self.preferences.last_conversation_id = conversation_id;
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn save(&self) -> Result<(), PreferencesError> {
        self.store.save(&self.preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::InMemoryPreferences;

    fn workspace(id: &str) -> Workspace {
        Workspace {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: None,
            files: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_load_existing_selection() {
        let store = InMemoryPreferences::with_preferences(Preferences {
            selected_workspace_ids: vec!["ws-1".to_string()],
            last_conversation_id: Some("c1".to_string()),
        });

        let selection = WorkspaceSelection::load(Arc::new(store));
        assert!(selection.is_selected("ws-1"));
        assert_eq!(selection.last_conversation_id(), Some("c1"));
    }

    #[test]
    fn test_toggle_and_set() {
        let mut selection = WorkspaceSelection::load(Arc::new(InMemoryPreferences::new()));

        assert!(selection.toggle("ws-1"));
        assert!(selection.toggle("ws-2"));
        assert!(!selection.toggle("ws-1"));
        assert_eq!(selection.selected(), ["ws-2"]);

        selection.set(["a", "b", "a"]);
        assert_eq!(selection.selected(), ["a", "b"]);
    }

    #[test]
    fn test_retain_existing() {
        let mut selection = WorkspaceSelection::load(Arc::new(InMemoryPreferences::new()));
        selection.set(["ws-1", "ws-gone", "ws-2"]);

        let dropped = selection.retain_existing(&[workspace("ws-2"), workspace("ws-1")]);

        assert_eq!(dropped, vec!["ws-gone"]);
        assert_eq!(selection.selected(), ["ws-1", "ws-2"]);
    }

    #[test]
    fn test_save_persists_to_store() {
        let store = InMemoryPreferences::new();
        let mut selection = WorkspaceSelection::load(Arc::new(store.clone()));
        selection.toggle("ws-7");
        selection.set_last_conversation_id(Some("c2".to_string()));

        selection.save().unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot().selected_workspace_ids, vec!["ws-7"]);
        assert_eq!(store.snapshot().last_conversation_id.as_deref(), Some("c2"));
    }

    #[test]
    fn test_failed_save_is_reported() {
        let store = InMemoryPreferences::new();
        store.set_fail_saves(true);
        let selection = WorkspaceSelection::load(Arc::new(store));

        assert!(selection.save().is_err());
    }
}
