//! Workspace lookup parameters

use crate::error::{Result, WorkspaceError};

/// Coordinates of a workspace: subscription, resource group, name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceParams {
    /// Subscription id (GUID)
    pub subscription_id: String,
    /// Resource group within the subscription
    pub resource_group: String,
    /// Workspace name within the resource group
    pub workspace_name: String,
}

impl WorkspaceParams {
    /// Bundle the three coordinates of a workspace.
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        workspace_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            workspace_name: workspace_name.into(),
        }
    }

    /// Validate all parameters before any network round trip.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::InvalidParams`] with an actionable message
    /// for the first failing field.
    pub fn validate(&self) -> Result<()> {
        if self.subscription_id.is_empty() {
            return Err(WorkspaceError::invalid_params(
                "subscription_id",
                "must not be empty; use the subscription GUID",
            ));
        }
        if self.resource_group.is_empty() {
            return Err(WorkspaceError::invalid_params(
                "resource_group",
                "must not be empty",
            ));
        }
        if self.workspace_name.is_empty() {
            return Err(WorkspaceError::invalid_params(
                "workspace_name",
                "must not be empty",
            ));
        }
        // Path segments end up in the request URL unescaped.
        for (field, value) in [
            ("subscription_id", &self.subscription_id),
            ("resource_group", &self.resource_group),
            ("workspace_name", &self.workspace_name),
        ] {
            if value.contains('/') || value.contains('?') {
                return Err(WorkspaceError::invalid_params(
                    field,
                    "must not contain '/' or '?'",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_params() {
        let params = WorkspaceParams::new("sub-1", "rg-1", "ws-1");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_empty_subscription_rejected() {
        let err = WorkspaceParams::new("", "rg-1", "ws-1").validate().unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::InvalidParams { ref field, .. } if field == "subscription_id"
        ));
    }

    #[test]
    fn test_empty_workspace_name_rejected() {
        let err = WorkspaceParams::new("sub-1", "rg-1", "").validate().unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::InvalidParams { ref field, .. } if field == "workspace_name"
        ));
    }

    #[test]
    fn test_path_metacharacters_rejected() {
        let err = WorkspaceParams::new("sub-1", "rg/../other", "ws-1")
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::InvalidParams { ref field, .. } if field == "resource_group"
        ));
    }
}
