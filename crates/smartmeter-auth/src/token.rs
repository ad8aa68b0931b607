//! Token endpoint response.

use std::fmt;

use serde::Deserialize;

/// Tokens returned from the authorization code exchange.
///
/// Held in memory only and never refreshed.
#[derive(Clone, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_expires_in: u64,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub session_state: String,
    #[serde(rename = "not-before-policy", default)]
    pub not_before_policy: i64,
}

impl TokenBundle {
    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBundle")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("scope", &self.scope)
            .field("session_state", &self.session_state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_keycloak_response() {
        let json = r#"{
            "access_token": "eyJhbGciOi",
            "expires_in": 300,
            "refresh_expires_in": 1800,
            "refresh_token": "eyJhbGciOr",
            "token_type": "Bearer",
            "id_token": "eyJhbGciOd",
            "not-before-policy": 0,
            "session_state": "6f3c",
            "scope": "openid email profile"
        }"#;

        let token: TokenBundle = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "eyJhbGciOi");
        assert_eq!(token.expires_in, 300);
        assert_eq!(token.refresh_expires_in, 1800);
        assert_eq!(token.session_state, "6f3c");
        assert_eq!(token.bearer(), "Bearer eyJhbGciOi");
    }

    #[test]
    fn test_decode_minimal_response() {
        let token: TokenBundle =
            serde_json::from_str(r#"{"access_token":"T","expires_in":300}"#).unwrap();
        assert_eq!(token.access_token, "T");
        assert!(token.refresh_token.is_empty());
    }

    #[test]
    fn test_missing_access_token_fails() {
        assert!(serde_json::from_str::<TokenBundle>(r#"{"expires_in":300}"#).is_err());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let token: TokenBundle = serde_json::from_str(
            r#"{"access_token":"secret-access","refresh_token":"secret-refresh"}"#,
        )
        .unwrap();
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }
}
