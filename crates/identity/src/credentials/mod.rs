//! The three credential variants and their tagged-choice wrapper

mod azure_cli;
mod client_secret;
mod interactive;

pub use azure_cli::AzureCliCredential;
pub use client_secret::{
    CLIENT_ID_VAR, CLIENT_SECRET_VAR, ClientSecretCredential, TENANT_ID_VAR,
};
pub use interactive::{
    AZURE_CLI_CLIENT_ID, DeviceCodeInfo, InteractiveBrowserCredential,
    InteractiveBrowserCredentialBuilder,
};

use async_trait::async_trait;

use crate::core::{AccessToken, Result};
use crate::traits::TokenCredential;

/// Tagged choice of the three supported authentication strategies.
#[derive(Debug)]
pub enum Credential {
    /// Browser-assisted device-code sign-in
    Interactive(InteractiveBrowserCredential),
    /// Token cached by an existing `az login` session
    Cli(AzureCliCredential),
    /// Unattended service-principal exchange
    ServicePrincipal(ClientSecretCredential),
}

#[async_trait]
impl TokenCredential for Credential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        match self {
            Self::Interactive(c) => c.get_token(scopes).await,
            Self::Cli(c) => c.get_token(scopes).await,
            Self::ServicePrincipal(c) => c.get_token(scopes).await,
        }
    }

    fn tenant(&self) -> Option<&str> {
        match self {
            Self::Interactive(c) => c.tenant(),
            Self::Cli(c) => c.tenant(),
            Self::ServicePrincipal(c) => c.tenant(),
        }
    }
}

impl From<InteractiveBrowserCredential> for Credential {
    fn from(c: InteractiveBrowserCredential) -> Self {
        Self::Interactive(c)
    }
}

impl From<AzureCliCredential> for Credential {
    fn from(c: AzureCliCredential) -> Self {
        Self::Cli(c)
    }
}

impl From<ClientSecretCredential> for Credential {
    fn from(c: ClientSecretCredential) -> Self {
        Self::ServicePrincipal(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_tenant_delegation() {
        let cred: Credential = AzureCliCredential::new().with_tenant("tenant-123").into();
        assert_eq!(cred.tenant(), Some("tenant-123"));

        let cred: Credential = AzureCliCredential::new().into();
        assert_eq!(cred.tenant(), None);
    }
}
