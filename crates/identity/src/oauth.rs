//! Wire plumbing for the Microsoft identity platform v2 endpoints
//!
//! Shared between the service-principal and device-code flows: authority
//! endpoint construction, the token response/error body models, and the
//! form-post helper with sanitized error logging.

use std::time::{Duration, SystemTime};

use serde::Deserialize;
use tracing::error;
use url::Url;

use crate::core::{AccessToken, AuthError};

/// Default authority host for the public Azure cloud.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Multi-tenant endpoint used when no tenant id is supplied.
pub const ORGANIZATIONS_TENANT: &str = "organizations";

/// Maximum length for error response body to log (prevents log flooding)
const MAX_ERROR_BODY_LOG_LENGTH: usize = 500;

/// Sanitize response body for logging - truncate and remove potential secrets
pub(crate) fn sanitize_response_for_logging(body: &str) -> String {
    let truncated = if body.len() > MAX_ERROR_BODY_LOG_LENGTH {
        // The cut must land on a char boundary; the server controls the body.
        let mut cut = MAX_ERROR_BODY_LOG_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... [truncated, {} total bytes]",
            &body[..cut],
            body.len()
        )
    } else {
        body.to_string()
    };

    if let Ok(mut json) = serde_json::from_str::<serde_json::Value>(&truncated) {
        for field in [
            "access_token",
            "refresh_token",
            "id_token",
            "token",
            "secret",
            "password",
        ] {
            if json.get(field).is_some() {
                json[field] = serde_json::json!("[REDACTED]");
            }
        }
        json.to_string()
    } else {
        truncated
    }
}

/// Identity-provider directory endpoints for one tenant.
#[derive(Debug, Clone)]
pub struct Authority {
    host: Url,
    tenant: String,
}

impl Authority {
    /// Build an authority for `tenant` on the given host.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfiguration`] for an unparsable host URL
    /// or an empty tenant id.
    pub fn new(host: &str, tenant: &str) -> Result<Self, AuthError> {
        if tenant.is_empty() {
            return Err(AuthError::invalid_configuration(
                "tenant",
                "must not be empty; pass a tenant id or use the `organizations` endpoint",
            ));
        }
        let host = Url::parse(host)
            .map_err(|e| AuthError::invalid_configuration("authority_host", e.to_string()))?;
        Ok(Self {
            host,
            tenant: tenant.to_string(),
        })
    }

    /// Authority for `tenant` on the public-cloud host.
    pub fn public_cloud(tenant: &str) -> Result<Self, AuthError> {
        Self::new(DEFAULT_AUTHORITY_HOST, tenant)
    }

    /// Tenant this authority is scoped to.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// `POST` target for token grants.
    pub fn token_endpoint(&self) -> String {
        format!("{}{}/oauth2/v2.0/token", self.base(), self.tenant)
    }

    /// `POST` target for device-code initiation.
    pub fn device_code_endpoint(&self) -> String {
        format!("{}{}/oauth2/v2.0/devicecode", self.base(), self.tenant)
    }

    fn base(&self) -> String {
        let s = self.host.as_str();
        if s.ends_with('/') {
            s.to_string()
        } else {
            format!("{s}/")
        }
    }
}

/// Successful token response from the authorization server.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Convert into an [`AccessToken`], defaulting the lifetime to one hour
    /// when the server did not report one.
    pub fn into_access_token(self) -> AccessToken {
        let expires_in = self.expires_in.unwrap_or(3600);
        AccessToken {
            token: crate::core::SecretString::new(self.access_token),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_on: Some(SystemTime::now() + Duration::from_secs(expires_in)),
        }
    }
}

/// OAuth2 error body (`error` + AADSTS `error_description`).
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    pub(crate) fn description(&self) -> &str {
        self.error_description.as_deref().unwrap_or("(no detail)")
    }
}

/// Failure of one token-endpoint round trip.
///
/// The device-code poll loop needs the structured OAuth2 error (to tell
/// `authorization_pending` apart from terminal failures), so transport and
/// protocol failures stay distinct until the flow decides.
#[derive(Debug)]
pub(crate) enum TokenRequestError {
    /// Server answered with an OAuth2 error body
    OAuth(TokenErrorResponse),
    /// Request never produced a usable body
    Transport(AuthError),
}

impl TokenRequestError {
    /// Collapse into an [`AuthError`] for flows that have no special cases.
    pub(crate) fn into_auth_error(self) -> AuthError {
        match self {
            Self::OAuth(body) => AuthError::TokenExchange {
                description: body.description().to_string(),
                code: body.error,
            },
            Self::Transport(e) => e,
        }
    }
}

/// POST a form to a token-style endpoint and parse the response.
pub(crate) async fn post_token_form(
    http: &reqwest::Client,
    endpoint: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, TokenRequestError> {
    let response = http
        .post(endpoint)
        .form(form)
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, endpoint, "Failed to send token request");
            TokenRequestError::Transport(AuthError::Network(e.to_string()))
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        error!(error = %e, "Failed to read token response body");
        TokenRequestError::Transport(AuthError::Network(e.to_string()))
    })?;

    if status.is_success() {
        serde_json::from_str::<TokenResponse>(&body).map_err(|e| {
            let sanitized = sanitize_response_for_logging(&body);
            error!(error = %e, body = %sanitized, "Failed to parse token response");
            TokenRequestError::Transport(AuthError::Network(format!(
                "failed to parse token response: {e}"
            )))
        })
    } else if let Ok(oauth) = serde_json::from_str::<TokenErrorResponse>(&body) {
        Err(TokenRequestError::OAuth(oauth))
    } else {
        let sanitized = sanitize_response_for_logging(&body);
        error!(status = %status, body = %sanitized, "Token request failed");
        Err(TokenRequestError::Transport(AuthError::Network(format!(
            "token endpoint returned HTTP {status}"
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_endpoint_layout() {
        let authority = Authority::public_cloud("contoso.onmicrosoft.com").unwrap();
        assert_eq!(
            authority.token_endpoint(),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/token"
        );
        assert_eq!(
            authority.device_code_endpoint(),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/devicecode"
        );
    }

    #[test]
    fn test_authority_rejects_empty_tenant() {
        let err = Authority::public_cloud("").unwrap_err();
        assert!(matches!(err, AuthError::InvalidConfiguration { ref field, .. } if field == "tenant"));
    }

    #[test]
    fn test_authority_rejects_bad_host() {
        let err = Authority::new("not a url", "organizations").unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidConfiguration { ref field, .. } if field == "authority_host"
        ));
    }

    #[test]
    fn test_token_response_defaults() {
        let json = r#"{"access_token": "abc"}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        let token = parsed.into_access_token();
        assert_eq!(token.token_type, "Bearer");
        assert!(token.expires_on.is_some());
    }

    #[test]
    fn test_sanitize_redacts_token_fields() {
        let body = r#"{"access_token": "leak-me", "expires_in": 3600}"#;
        let sanitized = sanitize_response_for_logging(body);
        assert!(!sanitized.contains("leak-me"));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(2000);
        let sanitized = sanitize_response_for_logging(&body);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.len() < body.len());
    }

    #[test]
    fn test_sanitize_truncates_multibyte_bodies_on_char_boundary() {
        // 600 bytes of three-byte chars; a fixed byte cut at 500 would land
        // mid-character.
        let body = "€".repeat(200);
        let sanitized = sanitize_response_for_logging(&body);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.starts_with('€'));
    }
}
