//! Error types for workspace lookup
//!
//! Two conditions are the contract of this crate: `AccessDenied` (identity
//! lacks access to the subscription/resource-group pairing, or the pairing is
//! wrong) and `AmbiguousTenant` (identity belongs to several tenants and none
//! was specified). Both name the operator remedy; neither is retried locally.

use azimuth_identity::AuthError;
use thiserror::Error;

/// Workspace lookup error.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The identity cannot reach the requested subscription/resource group
    #[error(
        "Access denied to workspace '{workspace_name}' in resource group '{resource_group}' \
         of subscription '{subscription_id}': {detail}. Verify the subscription and resource \
         group ids, or pass an explicit tenant id"
    )]
    AccessDenied {
        /// Subscription that was addressed
        subscription_id: String,
        /// Resource group that was addressed
        resource_group: String,
        /// Workspace that was addressed
        workspace_name: String,
        /// Resource manager error detail
        detail: String,
    },

    /// The identity belongs to several tenants and none was specified
    #[error(
        "Tenant context is ambiguous: the identity belongs to {count} tenants and no tenant \
         id was specified. Pass the tenant id explicitly",
        count = .tenants.len()
    )]
    AmbiguousTenant {
        /// Tenant ids the identity can see
        tenants: Vec<String>,
    },

    /// The workspace itself does not exist
    #[error("Workspace '{workspace_name}' not found in resource group '{resource_group}'")]
    NotFound {
        /// Resource group that was addressed
        resource_group: String,
        /// Workspace that was addressed
        workspace_name: String,
    },

    /// A lookup parameter failed validation
    #[error("Invalid workspace parameters: {field}: {reason}")]
    InvalidParams {
        /// Offending field
        field: String,
        /// What is wrong and how to fix it
        reason: String,
    },

    /// Credential acquisition failed before any lookup happened
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Network-level failure talking to the resource manager
    #[error("Network error during workspace lookup: {0}")]
    Network(String),

    /// The resource manager answered with something we do not understand
    #[error("Resource manager returned unexpected HTTP {status}: {detail}")]
    Unexpected {
        /// HTTP status code
        status: u16,
        /// Response detail (sanitized)
        detail: String,
    },
}

impl WorkspaceError {
    pub(crate) fn invalid_params(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for workspace operations.
pub type Result<T> = std::result::Result<T, WorkspaceError>;
