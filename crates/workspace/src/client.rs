//! Resource manager client for workspace lookup
//!
//! Error-code mapping is the contract here: wrong subscription or resource
//! group pairings surface as `AccessDenied`, and a subscription-scope miss
//! without a tenant hint triggers the tenant probe that distinguishes
//! `AmbiguousTenant` from plain denial.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use azimuth_identity::TokenCredential;

use crate::error::{Result, WorkspaceError};
use crate::handle::WorkspaceHandle;
use crate::params::WorkspaceParams;

/// Resource-manager scope all lookups request tokens for.
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Default resource manager endpoint (public cloud).
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";

const WORKSPACE_API_VERSION: &str = "2024-04-01";
const TENANTS_API_VERSION: &str = "2022-12-01";

/// Resource manager error body (`{"error": {"code": ..., "message": ...}}`).
#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    #[serde(default)]
    error: Option<ArmErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ArmErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct TenantListResponse {
    #[serde(default)]
    value: Vec<TenantDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenantDescription {
    #[serde(default)]
    tenant_id: String,
}

/// Client for workspace lookups against the resource manager.
pub struct WorkspaceClient {
    credential: Arc<dyn TokenCredential>,
    endpoint: String,
    http: reqwest::Client,
}

impl WorkspaceClient {
    /// Create a client over the public-cloud resource manager endpoint.
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            credential,
            endpoint: DEFAULT_ARM_ENDPOINT.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at a different resource manager endpoint (sovereign
    /// clouds, mock servers in tests). A trailing slash is tolerated.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Fetch an authorized handle to the named workspace.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::AccessDenied`] when the identity lacks access to the
    /// subscription/resource-group pairing (or the pairing is wrong),
    /// [`WorkspaceError::AmbiguousTenant`] when no tenant was specified and
    /// the identity belongs to several, [`WorkspaceError::NotFound`] when the
    /// workspace itself is absent.
    #[tracing::instrument(
        skip(self),
        fields(
            subscription_id = %params.subscription_id,
            resource_group = %params.resource_group,
            workspace_name = %params.workspace_name,
        )
    )]
    pub async fn get_workspace(&self, params: &WorkspaceParams) -> Result<WorkspaceHandle> {
        params.validate()?;

        let url = format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}?api-version={}",
            self.endpoint,
            params.subscription_id,
            params.resource_group,
            params.workspace_name,
            WORKSPACE_API_VERSION,
        );

        debug!("Fetching workspace from resource manager");
        let (status, body) = self.get_authorized(&url).await?;

        if status.is_success() {
            let handle: WorkspaceHandle =
                serde_json::from_str(&body).map_err(|e| WorkspaceError::Unexpected {
                    status: status.as_u16(),
                    detail: format!("failed to parse workspace payload: {e}"),
                })?;
            info!(location = %handle.location, "Workspace acquired");
            return Ok(handle);
        }

        Err(self.map_failure(status, &body, params).await)
    }

    /// List tenant ids visible to the identity.
    pub async fn list_tenants(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}/tenants?api-version={}",
            self.endpoint, TENANTS_API_VERSION
        );
        let (status, body) = self.get_authorized(&url).await?;
        if !status.is_success() {
            return Err(WorkspaceError::Unexpected {
                status: status.as_u16(),
                detail: arm_error_detail(&body)
                    .map_or_else(|| "tenant list failed".to_string(), |(_, m)| m),
            });
        }
        let tenants: TenantListResponse =
            serde_json::from_str(&body).map_err(|e| WorkspaceError::Unexpected {
                status: status.as_u16(),
                detail: format!("failed to parse tenant list: {e}"),
            })?;
        Ok(tenants.value.into_iter().map(|t| t.tenant_id).collect())
    }

    async fn get_authorized(&self, url: &str) -> Result<(reqwest::StatusCode, String)> {
        let token = self.credential.get_token(&[ARM_SCOPE]).await?;
        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, token.authorization_value())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Request to resource manager failed");
                WorkspaceError::Network(e.to_string())
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkspaceError::Network(e.to_string()))?;
        Ok((status, body))
    }

    /// Map a non-success workspace response onto the error contract.
    async fn map_failure(
        &self,
        status: reqwest::StatusCode,
        body: &str,
        params: &WorkspaceParams,
    ) -> WorkspaceError {
        let (code, message) =
            arm_error_detail(body).unwrap_or_else(|| (String::new(), format!("HTTP {status}")));

        match status.as_u16() {
            401 | 403 => {
                warn!(code = %code, "Resource manager denied access");
                access_denied(params, &code, &message)
            }
            404 => match code.as_str() {
                "SubscriptionNotFound" => {
                    // The subscription may exist in another tenant the
                    // identity also belongs to. Without an explicit tenant
                    // the failure is ambiguity, not denial.
                    if self.credential.tenant().is_none() {
                        match self.list_tenants().await {
                            Ok(tenants) if tenants.len() > 1 => {
                                warn!(
                                    tenant_count = tenants.len(),
                                    "Subscription miss with multi-tenant identity"
                                );
                                return WorkspaceError::AmbiguousTenant { tenants };
                            }
                            Ok(_) => {}
                            Err(e) => {
                                debug!(error = %e, "Tenant probe failed, reporting denial");
                            }
                        }
                    }
                    access_denied(params, &code, &message)
                }
                "ResourceGroupNotFound" => access_denied(params, &code, &message),
                _ => WorkspaceError::NotFound {
                    resource_group: params.resource_group.clone(),
                    workspace_name: params.workspace_name.clone(),
                },
            },
            _ => {
                error!(status = %status, code = %code, "Unexpected resource manager response");
                WorkspaceError::Unexpected {
                    status: status.as_u16(),
                    detail: if message.is_empty() {
                        format!("HTTP {status}")
                    } else {
                        message
                    },
                }
            }
        }
    }
}

impl std::fmt::Debug for WorkspaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

fn access_denied(params: &WorkspaceParams, code: &str, message: &str) -> WorkspaceError {
    WorkspaceError::AccessDenied {
        subscription_id: params.subscription_id.clone(),
        resource_group: params.resource_group.clone(),
        workspace_name: params.workspace_name.clone(),
        detail: if code.is_empty() {
            message.to_string()
        } else {
            format!("{code}: {message}")
        },
    }
}

fn arm_error_detail(body: &str) -> Option<(String, String)> {
    serde_json::from_str::<ArmErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| (e.code, e.message))
}
