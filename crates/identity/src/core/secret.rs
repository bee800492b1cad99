use secrecy::{ExposeSecret, SecretString as Inner};
use subtle::ConstantTimeEq;

use super::error::AuthError;

/// Secret value that zeros memory on drop.
///
/// Client secrets must come from the environment (or an injected lookup),
/// never from a literal in source. [`SecretString::from_env`] is therefore the
/// primary constructor for service-principal secrets; [`SecretString::new`]
/// exists for plumbing values that were already resolved elsewhere.
#[derive(Clone)]
pub struct SecretString(Inner);

impl SecretString {
    /// Wrap an already-resolved secret value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(Inner::from(s.into()))
    }

    /// Read a secret from the named environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSecret`] if the variable is unset, not
    /// valid UTF-8, or empty.
    pub fn from_env(var: &str) -> Result<Self, AuthError> {
        Self::from_env_with(var, |v| std::env::var(v).ok())
    }

    /// Like [`Self::from_env`] but with an injected lookup, so callers (and
    /// tests) can resolve from a secret store without touching process
    /// environment.
    pub fn from_env_with<F>(var: &str, lookup: F) -> Result<Self, AuthError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(value) if !value.is_empty() => Ok(Self::new(value)),
            _ => Err(AuthError::MissingSecret {
                var: var.to_string(),
            }),
        }
    }

    /// Expose the secret (use with caution).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Constant-time equality check.
    pub fn eq_ct(&self, other: &Self) -> bool {
        let a = self.0.expose_secret().as_bytes();
        let b = other.0.expose_secret().as_bytes();
        a.ct_eq(b).into()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretString[REDACTED]")
    }
}
