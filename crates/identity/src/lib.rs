//! Azimuth Identity - credential acquisition for Azure resource access
//!
//! Three authentication strategies behind one [`TokenCredential`] trait:
//!
//! - **Interactive** - device-code sign-in through a browser, token cached
//!   for the process lifetime
//! - **CLI-delegated** - reuses the token cached by an existing `az login`
//!   session
//! - **Service principal** - unattended `client_credentials` exchange with a
//!   secret sourced from the environment, never from source text
//!
//! Failures carry the operator remedy (set the variable, run `az login`,
//! pass the tenant id); there is no retry or recovery inside the crate.
#![deny(unsafe_code)]
#![forbid(unsafe_code)]

/// Core types: tokens, secrets, errors
pub mod core;
/// The three credential variants and the `Credential` tagged choice
pub mod credentials;
/// Microsoft identity platform endpoint and wire types
pub mod oauth;
/// The `TokenCredential` trait
pub mod traits;

#[cfg(feature = "test-util")]
pub mod testing;

// ── Root re-exports ─────────────────────────────────────────────────────────

pub use crate::core::{AccessToken, AuthError, Result, SecretString};
pub use crate::credentials::{
    AZURE_CLI_CLIENT_ID, AzureCliCredential, ClientSecretCredential, Credential, DeviceCodeInfo,
    InteractiveBrowserCredential,
};
pub use crate::oauth::{Authority, DEFAULT_AUTHORITY_HOST};
pub use crate::traits::TokenCredential;

/// Commonly used types and traits
pub mod prelude {
    pub use crate::core::{AccessToken, AuthError, SecretString};
    pub use crate::credentials::{
        AzureCliCredential, ClientSecretCredential, Credential, InteractiveBrowserCredential,
    };
    pub use crate::traits::TokenCredential;
}
