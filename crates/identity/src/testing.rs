//! Test-only credential helpers (feature `test-util`)

use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use crate::core::{AccessToken, Result};
use crate::traits::TokenCredential;

/// Credential that always hands out a fixed token. Test use only.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: String,
    tenant: Option<String>,
}

impl StaticTokenCredential {
    /// Credential producing `token` with no tenant hint.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            tenant: None,
        }
    }

    /// Attach a tenant hint.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken> {
        Ok(AccessToken::bearer(self.token.clone())
            .with_expiry(SystemTime::now() + Duration::from_secs(3600)))
    }

    fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }
}
