//! Core trait for credential implementations

use async_trait::async_trait;

use crate::core::{AccessToken, Result};

/// A source of bearer tokens for Azure resource scopes.
///
/// Implementations are cheap to share behind `Arc<dyn TokenCredential>`;
/// every variant caches its token internally, so `get_token` is safe to call
/// per request.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquire a token for the given scopes (e.g. the ARM `.default` scope).
    ///
    /// The first call may have side effects: the interactive variant starts a
    /// device-code sign-in, the CLI variant shells out to `az`. Later calls
    /// reuse the cached token until it nears expiry.
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken>;

    /// Tenant this credential is pinned to, if any.
    ///
    /// Used downstream to decide whether an empty subscription lookup should
    /// be reported as an ambiguous-tenant condition.
    fn tenant(&self) -> Option<&str> {
        None
    }
}
