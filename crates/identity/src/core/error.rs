//! Error types for credential acquisition
//!
//! All three credential variants surface failures through [`AuthError`].
//! There is no local recovery or retry: every message names the remedy the
//! operator should apply (set the variable, log in, pass the tenant id).

use thiserror::Error;

/// Credential acquisition error.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required secret was not found in the environment
    #[error("Secret environment variable '{var}' is unset or empty")]
    MissingSecret {
        /// Name of the variable that was consulted
        var: String,
    },

    /// A constructor parameter failed validation
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration {
        /// Offending field
        field: String,
        /// What is wrong and how to fix it
        reason: String,
    },

    /// The identity provider rejected a token request
    #[error("Token exchange failed ({code}): {description}")]
    TokenExchange {
        /// OAuth2 error code (e.g. `invalid_client`)
        code: String,
        /// Provider error description (AADSTS message)
        description: String,
    },

    /// The user declined the device-code sign-in
    #[error("Interactive sign-in was declined by the user")]
    InteractionDeclined,

    /// The device code lapsed before the user completed sign-in
    #[error("Device code expired before sign-in completed; restart the flow")]
    DeviceCodeExpired,

    /// The `az` executable is not on PATH
    #[error("Azure CLI not found; install it or pick another credential variant")]
    CliNotFound,

    /// The CLI has no cached login session
    #[error("Azure CLI is not logged in; run `az login` first")]
    CliNotLoggedIn,

    /// The CLI produced output we could not use
    #[error("Unexpected Azure CLI output: {reason}")]
    CliOutput {
        /// What failed while reading the CLI response
        reason: String,
    },

    /// Network-level failure talking to the identity provider
    #[error("Network error during authentication: {0}")]
    Network(String),
}

impl AuthError {
    pub(crate) fn invalid_configuration(
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// Result type alias for credential operations.
pub type Result<T> = std::result::Result<T, AuthError>;
