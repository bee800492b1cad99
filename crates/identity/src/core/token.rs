use std::time::{Duration, SystemTime};

use super::SecretString;

/// Refresh this long before the actual expiry so a token handed to a caller
/// does not lapse mid-request.
const REFRESH_WINDOW: Duration = Duration::from_secs(300);

/// Bearer token with expiry metadata.
#[derive(Clone)]
pub struct AccessToken {
    /// The actual token value
    pub token: SecretString,

    /// Token type as reported by the issuer (practically always `Bearer`)
    pub token_type: String,

    /// When the token expires, if the issuer reported it
    pub expires_on: Option<SystemTime>,
}

impl AccessToken {
    /// Create a new bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token),
            token_type: "Bearer".to_string(),
            expires_on: None,
        }
    }

    /// Set the expiry (builder pattern).
    pub fn with_expiry(mut self, expires_on: SystemTime) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    /// Remaining lifetime, `None` if expired or no expiry known.
    pub fn ttl(&self) -> Option<Duration> {
        self.expires_on
            .and_then(|exp| exp.duration_since(SystemTime::now()).ok())
    }

    /// Whether the token has passed its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_on.is_some_and(|exp| exp <= SystemTime::now())
    }

    /// Whether a cached copy of this token should be re-acquired.
    ///
    /// True once the token is inside the early-refresh window, so cache
    /// consumers never hand out a token about to lapse.
    pub fn should_refresh(&self) -> bool {
        self.expires_on
            .is_some_and(|exp| exp <= SystemTime::now() + REFRESH_WINDOW)
    }

    /// Value for an `Authorization` header.
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.token.expose())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("expires_on", &self.expires_on)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_creation() {
        let token = AccessToken::bearer("abc");
        assert_eq!(token.token_type, "Bearer");
        assert!(token.expires_on.is_none());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_is_expired_when_past() {
        let past = SystemTime::now() - Duration::from_secs(10);
        let token = AccessToken::bearer("abc").with_expiry(past);
        assert!(token.is_expired());
        assert!(token.ttl().is_none());
    }

    #[test]
    fn test_should_refresh_inside_window() {
        let soon = SystemTime::now() + Duration::from_secs(60);
        let token = AccessToken::bearer("abc").with_expiry(soon);
        assert!(!token.is_expired());
        assert!(token.should_refresh());
    }

    #[test]
    fn test_should_not_refresh_fresh_token() {
        let later = SystemTime::now() + Duration::from_secs(3600);
        let token = AccessToken::bearer("abc").with_expiry(later);
        assert!(!token.should_refresh());
    }

    #[test]
    fn test_ttl_calculation() {
        let future = SystemTime::now() + Duration::from_secs(300);
        let token = AccessToken::bearer("abc").with_expiry(future);
        let ttl = token.ttl().expect("should have TTL");
        assert!(ttl.as_secs() >= 299 && ttl.as_secs() <= 300);
    }

    #[test]
    fn test_authorization_value() {
        let token = AccessToken::bearer("abc123");
        assert_eq!(token.authorization_value(), "Bearer abc123");
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let token = AccessToken::bearer("super-secret-token");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("AccessToken"));
    }
}
