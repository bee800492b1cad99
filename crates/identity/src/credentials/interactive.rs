//! Interactive credential (`OAuth2` device-code flow)
//!
//! The first token request starts a device-code sign-in: the crate surfaces a
//! verification URI and a user code through the prompt callback, the operator
//! completes the sign-in in a browser, and the flow polls the token endpoint
//! until the grant is issued. The token is then cached for the process
//! lifetime.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::core::{AccessToken, AuthError, Result};
use crate::oauth::{
    Authority, DEFAULT_AUTHORITY_HOST, ORGANIZATIONS_TENANT, TokenRequestError, post_token_form,
};
use crate::traits::TokenCredential;

/// Well-known public client id of the Azure CLI, usable for device-code
/// sign-in without a dedicated app registration.
pub const AZURE_CLI_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

/// Fallback poll interval when the server omits one.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Sign-in instructions handed to the prompt callback.
#[derive(Debug, Clone)]
pub struct DeviceCodeInfo {
    /// Code the user types at the verification page
    pub user_code: String,
    /// Page the user opens in a browser
    pub verification_uri: String,
    /// Full human-readable instruction from the server
    pub message: String,
    /// How long the code stays valid
    pub expires_in: Duration,
}

type DevicePrompt = Box<dyn Fn(&DeviceCodeInfo) + Send + Sync>;

/// Interactive credential backed by the device-code grant.
pub struct InteractiveBrowserCredential {
    tenant: Option<String>,
    client_id: String,
    authority: Authority,
    prompt: DevicePrompt,
    http: reqwest::Client,
    cache: Mutex<Option<AccessToken>>,
}

/// Builder for [`InteractiveBrowserCredential`].
pub struct InteractiveBrowserCredentialBuilder {
    tenant: Option<String>,
    client_id: String,
    authority_host: String,
    prompt: Option<DevicePrompt>,
}

impl InteractiveBrowserCredentialBuilder {
    /// Pin the sign-in to one tenant instead of the multi-tenant
    /// `organizations` endpoint.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Use a different public client id.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Point at a different authority host (sovereign clouds, mock servers).
    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into();
        self
    }

    /// Replace the default prompt (which logs the sign-in instruction) with a
    /// custom presenter.
    pub fn with_prompt<F>(mut self, prompt: F) -> Self
    where
        F: Fn(&DeviceCodeInfo) + Send + Sync + 'static,
    {
        self.prompt = Some(Box::new(prompt));
        self
    }

    /// Build the credential.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfiguration`] for an empty client id or
    /// an unparsable authority host.
    pub fn build(self) -> Result<InteractiveBrowserCredential> {
        if self.client_id.is_empty() {
            return Err(AuthError::invalid_configuration(
                "client_id",
                "must not be empty",
            ));
        }
        let tenant_or_default = self.tenant.as_deref().unwrap_or(ORGANIZATIONS_TENANT);
        let authority = Authority::new(&self.authority_host, tenant_or_default)?;
        Ok(InteractiveBrowserCredential {
            tenant: self.tenant,
            client_id: self.client_id,
            authority,
            prompt: self.prompt.unwrap_or_else(|| {
                Box::new(|info: &DeviceCodeInfo| {
                    tracing::info!(
                        user_code = %info.user_code,
                        verification_uri = %info.verification_uri,
                        "{}", info.message
                    );
                })
            }),
            http: reqwest::Client::new(),
            cache: Mutex::new(None),
        })
    }
}

/// Response of the devicecode endpoint.
#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
    #[serde(default)]
    message: Option<String>,
}

impl InteractiveBrowserCredential {
    /// Start building an interactive credential with public-cloud defaults.
    pub fn builder() -> InteractiveBrowserCredentialBuilder {
        InteractiveBrowserCredentialBuilder {
            tenant: None,
            client_id: AZURE_CLI_CLIENT_ID.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            prompt: None,
        }
    }

    async fn run_device_code_flow(&self, scopes: &[&str]) -> Result<AccessToken> {
        let scope = scopes.join(" ");
        debug!(
            client_id = %self.client_id,
            tenant = %self.authority.tenant(),
            scope = %scope,
            "Starting device code flow"
        );

        let initiation = self
            .http
            .post(self.authority.device_code_endpoint())
            .form(&[("client_id", self.client_id.as_str()), ("scope", &scope)])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to initiate device code flow");
                AuthError::Network(e.to_string())
            })?;

        let status = initiation.status();
        if !status.is_success() {
            error!(status = %status, "Device code initiation rejected");
            return Err(AuthError::Network(format!(
                "device code endpoint returned HTTP {status}"
            )));
        }

        let device: DeviceCodeResponse = initiation.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse device code response");
            AuthError::Network(format!("failed to parse device code response: {e}"))
        })?;

        let info = DeviceCodeInfo {
            message: device.message.clone().unwrap_or_else(|| {
                format!(
                    "To sign in, open {} and enter the code {}",
                    device.verification_uri, device.user_code
                )
            }),
            user_code: device.user_code,
            verification_uri: device.verification_uri,
            expires_in: Duration::from_secs(device.expires_in),
        };
        (self.prompt)(&info);

        let mut interval = device
            .interval
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs);
        let deadline = tokio::time::Instant::now() + info.expires_in;

        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(AuthError::DeviceCodeExpired);
            }
            sleep(interval).await;

            let attempt = post_token_form(
                &self.http,
                &self.authority.token_endpoint(),
                &[
                    ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                    ("client_id", &self.client_id),
                    ("device_code", &device.device_code),
                ],
            )
            .await;

            match attempt {
                Ok(token) => {
                    info!(client_id = %self.client_id, "Device code sign-in completed");
                    return Ok(token.into_access_token());
                }
                Err(TokenRequestError::OAuth(body)) => match body.error.as_str() {
                    "authorization_pending" => {
                        debug!("Sign-in pending, polling again");
                    }
                    "slow_down" => {
                        // Server asked us to back off; RFC 8628 mandates +5s.
                        interval += Duration::from_secs(5);
                        debug!(interval = ?interval, "Server requested slower polling");
                    }
                    "authorization_declined" => return Err(AuthError::InteractionDeclined),
                    "expired_token" => return Err(AuthError::DeviceCodeExpired),
                    _ => {
                        return Err(AuthError::TokenExchange {
                            description: body.description().to_string(),
                            code: body.error,
                        });
                    }
                },
                Err(TokenRequestError::Transport(e)) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl TokenCredential for InteractiveBrowserCredential {
    #[tracing::instrument(skip(self, scopes), fields(credential = "interactive", client_id = %self.client_id))]
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if !token.should_refresh() {
                debug!("Reusing cached interactive token");
                return Ok(token.clone());
            }
        }
        let token = self.run_device_code_flow(scopes).await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }
}

impl std::fmt::Debug for InteractiveBrowserCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractiveBrowserCredential")
            .field("tenant", &self.tenant)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
