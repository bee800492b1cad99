//! Service-principal credential (`OAuth2` client credentials grant)

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::{AccessToken, AuthError, Result, SecretString};
use crate::oauth::{Authority, post_token_form};
use crate::traits::TokenCredential;

/// Environment variable holding the service-principal tenant id.
pub const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";
/// Environment variable holding the application (client) id.
pub const CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";
/// Environment variable holding the client secret.
pub const CLIENT_SECRET_VAR: &str = "AZURE_CLIENT_SECRET";

/// Non-human identity authenticating with an application id and secret.
///
/// The secret is sourced from the environment ([`ClientSecretCredential::from_env`])
/// or handed in as an already-resolved [`SecretString`]; it never appears in
/// logs or `Debug` output. The acquired token is cached for the process
/// lifetime and re-acquired shortly before expiry.
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: SecretString,
    authority: Authority,
    http: reqwest::Client,
    cache: Mutex<Option<AccessToken>>,
}

impl ClientSecretCredential {
    /// Create a credential for `tenant_id` / `client_id` with a resolved secret.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfiguration`] if tenant or client id is
    /// empty.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self> {
        let tenant_id = tenant_id.into();
        let client_id = client_id.into();
        if client_id.is_empty() {
            return Err(AuthError::invalid_configuration(
                "client_id",
                "must not be empty; use the application (client) id of the app registration",
            ));
        }
        let authority = Authority::public_cloud(&tenant_id)?;
        Ok(Self {
            tenant_id,
            client_id,
            client_secret,
            authority,
            http: reqwest::Client::new(),
            cache: Mutex::new(None),
        })
    }

    /// Create a credential from the conventional environment variables
    /// (`AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`).
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|var| std::env::var(var).ok())
    }

    /// Like [`Self::from_env`] but with an injected lookup (secret stores,
    /// tests).
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tenant_id = lookup(TENANT_ID_VAR).unwrap_or_default();
        if tenant_id.is_empty() {
            return Err(AuthError::invalid_configuration(
                TENANT_ID_VAR,
                "must be set to the directory (tenant) id",
            ));
        }
        let client_id = lookup(CLIENT_ID_VAR).unwrap_or_default();
        if client_id.is_empty() {
            return Err(AuthError::invalid_configuration(
                CLIENT_ID_VAR,
                "must be set to the application (client) id",
            ));
        }
        let client_secret = SecretString::from_env_with(CLIENT_SECRET_VAR, lookup)?;
        Self::new(tenant_id, client_id, client_secret)
    }

    /// Point the credential at a different authority host (sovereign clouds,
    /// mock servers in tests).
    pub fn with_authority_host(mut self, host: &str) -> Result<Self> {
        self.authority = Authority::new(host, &self.tenant_id)?;
        Ok(self)
    }

    async fn request_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let scope = scopes.join(" ");
        debug!(
            client_id = %self.client_id,
            tenant_id = %self.tenant_id,
            scope = %scope,
            "Requesting token via client credentials grant"
        );

        let token = post_token_form(
            &self.http,
            &self.authority.token_endpoint(),
            &[
                ("grant_type", "client_credentials"),
                ("client_id", &self.client_id),
                ("client_secret", self.client_secret.expose()),
                ("scope", &scope),
            ],
        )
        .await
        .map_err(crate::oauth::TokenRequestError::into_auth_error)?
        .into_access_token();

        info!(client_id = %self.client_id, "Service principal token acquired");
        Ok(token)
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    #[tracing::instrument(skip(self, scopes), fields(credential = "client_secret", client_id = %self.client_id))]
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if !token.should_refresh() {
                debug!("Reusing cached service principal token");
                return Ok(token.clone());
            }
        }
        let token = self.request_token(scopes).await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    fn tenant(&self) -> Option<&str> {
        Some(&self.tenant_id)
    }
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
