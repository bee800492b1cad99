//! Authorized reference to a workspace resource

use std::collections::HashMap;

use serde::Deserialize;

/// Authorized reference to a remote workspace, as returned by the resource
/// manager. The (name, location) pair identifies the same underlying resource
/// regardless of which credential variant acquired it.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceHandle {
    /// Full ARM resource id
    pub id: String,
    /// Workspace name
    pub name: String,
    /// Azure region the workspace lives in
    pub location: String,
    /// Resource tags
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Workspace-specific properties
    #[serde(default)]
    pub properties: WorkspaceProperties,
}

/// Selected workspace properties from the ARM payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceProperties {
    /// Display name, when set
    #[serde(default)]
    pub friendly_name: Option<String>,
    /// Immutable workspace id
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Per-region discovery endpoint
    #[serde(default)]
    pub discovery_url: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

impl WorkspaceHandle {
    /// Subscription id parsed from the resource id.
    pub fn subscription_id(&self) -> Option<&str> {
        self.id_segment("subscriptions")
    }

    /// Resource group parsed from the resource id.
    pub fn resource_group(&self) -> Option<&str> {
        self.id_segment("resourceGroups")
    }

    /// ARM ids look like
    /// `/subscriptions/{sub}/resourceGroups/{rg}/providers/...`; return the
    /// segment following `key`.
    fn id_segment(&self, key: &str) -> Option<&str> {
        let mut segments = self.id.split('/');
        segments.find(|s| s.eq_ignore_ascii_case(key))?;
        segments.next().filter(|s| !s.is_empty())
    }
}
