//! CLI-delegated credential
//!
//! Reads the token cached by an existing `az login` session via
//! `az account get-access-token`. Holds no independent state: the CLI owns
//! the cache and its refresh behavior, so every `get_token` call defers to it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, error};

use crate::core::{AccessToken, AuthError, Result, SecretString};
use crate::traits::TokenCredential;

/// Credential delegating to a previously-established Azure CLI session.
#[derive(Debug, Default)]
pub struct AzureCliCredential {
    tenant: Option<String>,
}

/// Token payload printed by `az account get-access-token -o json`.
#[derive(Debug, Deserialize)]
struct CliTokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "tokenType", default)]
    token_type: Option<String>,
    /// Unix epoch seconds; emitted by newer CLI releases
    #[serde(rename = "expires_on", default)]
    expires_on_epoch: Option<i64>,
    /// Local-time string (`2026-08-30 11:03:21.000000`); always emitted
    #[serde(rename = "expiresOn", default)]
    expires_on_local: Option<String>,
}

impl AzureCliCredential {
    /// Create a credential against the CLI's current default tenant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request tokens for a specific tenant (`az --tenant`).
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    async fn run_cli(&self, scopes: &[&str]) -> Result<String> {
        // `az` takes a resource URI, not a scope; strip the `.default` suffix.
        let resource = scopes
            .first()
            .map(|s| s.trim_end_matches("/.default"))
            .ok_or_else(|| {
                AuthError::invalid_configuration("scopes", "at least one scope is required")
            })?;

        let program = if cfg!(windows) { "az.cmd" } else { "az" };
        let mut command = Command::new(program);
        command.args(["account", "get-access-token", "--output", "json"]);
        command.args(["--resource", resource]);
        if let Some(tenant) = &self.tenant {
            command.args(["--tenant", tenant]);
        }

        debug!(resource = %resource, tenant = ?self.tenant, "Invoking Azure CLI for access token");

        let output = command.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AuthError::CliNotFound
            } else {
                AuthError::CliOutput {
                    reason: format!("failed to launch az: {e}"),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = ?output.status.code(), "Azure CLI token request failed");
            if stderr.contains("az login") || stderr.contains("AADSTS") {
                return Err(AuthError::CliNotLoggedIn);
            }
            return Err(AuthError::CliOutput {
                reason: stderr.lines().next().unwrap_or("(no stderr)").to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| AuthError::CliOutput {
            reason: "stdout was not valid UTF-8".to_string(),
        })
    }
}

/// Parse the CLI's JSON token payload into an [`AccessToken`].
fn parse_cli_token(stdout: &str) -> Result<AccessToken> {
    let response: CliTokenResponse =
        serde_json::from_str(stdout).map_err(|e| AuthError::CliOutput {
            reason: format!("failed to parse token JSON: {e}"),
        })?;

    let expires_on = match (response.expires_on_epoch, &response.expires_on_local) {
        (Some(epoch), _) if epoch > 0 => {
            Some(UNIX_EPOCH + Duration::from_secs(epoch.unsigned_abs()))
        }
        (_, Some(local)) => Some(parse_local_expiry(local)?),
        _ => None,
    };

    Ok(AccessToken {
        token: SecretString::new(response.access_token),
        token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
        expires_on,
    })
}

/// The CLI's `expiresOn` field is a naive local timestamp.
fn parse_local_expiry(value: &str) -> Result<SystemTime> {
    let naive =
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").map_err(|e| {
            AuthError::CliOutput {
                reason: format!("unexpected expiresOn format '{value}': {e}"),
            }
        })?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| AuthError::CliOutput {
            reason: format!("expiresOn '{value}' is not a valid local time"),
        })?;
    let epoch = local.timestamp();
    if epoch < 0 {
        return Err(AuthError::CliOutput {
            reason: format!("expiresOn '{value}' predates the epoch"),
        });
    }
    Ok(UNIX_EPOCH + Duration::from_secs(epoch.unsigned_abs()))
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    #[tracing::instrument(skip(self, scopes), fields(credential = "azure_cli"))]
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
        let stdout = self.run_cli(scopes).await?;
        parse_cli_token(&stdout)
    }

    fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_token_with_epoch() {
        let stdout = r#"{
            "accessToken": "cli-token",
            "expiresOn": "2030-01-01 10:00:00.000000",
            "expires_on": 1893492000,
            "tokenType": "Bearer",
            "tenant": "tenant-123"
        }"#;
        let token = parse_cli_token(stdout).unwrap();
        assert_eq!(token.token.expose(), "cli-token");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(
            token.expires_on,
            Some(UNIX_EPOCH + Duration::from_secs(1_893_492_000))
        );
    }

    #[test]
    fn test_parse_cli_token_local_fallback() {
        let stdout = r#"{
            "accessToken": "cli-token",
            "expiresOn": "2030-01-01 10:00:00.000000",
            "tokenType": "Bearer"
        }"#;
        let token = parse_cli_token(stdout).unwrap();
        assert!(token.expires_on.is_some());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_parse_cli_token_malformed() {
        let err = parse_cli_token("definitely not json").unwrap_err();
        assert!(matches!(err, AuthError::CliOutput { .. }));
    }

    #[test]
    fn test_parse_cli_token_bad_expiry_format() {
        let stdout = r#"{"accessToken": "t", "expiresOn": "tomorrow-ish"}"#;
        let err = parse_cli_token(stdout).unwrap_err();
        assert!(matches!(err, AuthError::CliOutput { ref reason } if reason.contains("expiresOn")));
    }

    #[test]
    fn test_tenant_hint() {
        let cred = AzureCliCredential::new();
        assert_eq!(cred.tenant(), None);
        let pinned = AzureCliCredential::new().with_tenant("tenant-123");
        assert_eq!(pinned.tenant(), Some("tenant-123"));
    }
}
