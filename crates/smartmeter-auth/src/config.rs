//! Provider endpoints, fixed identifiers and user credentials.

use std::fmt;

use url::Url;

use crate::error::Result;

/// Fixed endpoints and identifiers for one identity provider deployment.
///
/// Passed into the [`Authenticator`](crate::Authenticator) rather than read
/// from globals, so a mock provider and the real one can coexist.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// OpenID Connect base; `auth` and `token` are resolved against it.
    pub auth_base_url: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub scope: String,
    pub user_agent: String,
    /// Base URL of the Wiener Stadtwerke smart meter portal gateway.
    pub stadtwerke_api_url: String,
    /// Value for the gateway's `X-Gateway-APIKey` header.
    pub stadtwerke_api_key: String,
    /// Base URL of the Wiener Netze service API.
    pub netze_api_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::wiener_netze()
    }
}

impl ProviderConfig {
    /// Configuration for the production `log.wien` realm and the two
    /// smart meter APIs behind it.
    pub fn wiener_netze() -> Self {
        Self {
            auth_base_url: "https://log.wien/auth/realms/logwien/protocol/openid-connect/"
                .to_string(),
            redirect_uri: "https://smartmeter-web.wienernetze.at/".to_string(),
            client_id: "wn-smartmeter".to_string(),
            scope: "openid".to_string(),
            user_agent: "Please document your APIs! Thanks!".to_string(),
            stadtwerke_api_url: "https://api.wstw.at/gateway/WN_SMART_METER_PORTAL_API_B2C/1.0/"
                .to_string(),
            // Public key shipped with the web portal.
            stadtwerke_api_key: "afb0be74-6455-44f5-a34d-6994223020ba".to_string(),
            netze_api_url: "https://service.wienernetze.at/".to_string(),
        }
    }

    /// Point the login at a different OpenID Connect base URL.
    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }

    pub fn with_stadtwerke_api_url(mut self, url: impl Into<String>) -> Self {
        self.stadtwerke_api_url = url.into();
        self
    }

    pub fn with_stadtwerke_api_key(mut self, key: impl Into<String>) -> Self {
        self.stadtwerke_api_key = key.into();
        self
    }

    pub fn with_netze_api_url(mut self, url: impl Into<String>) -> Self {
        self.netze_api_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// The authorization endpoint (`<base>/auth`).
    pub fn authorize_url(&self) -> Result<Url> {
        Ok(normalized_base(&self.auth_base_url)?.join("auth")?)
    }

    /// The token endpoint (`<base>/token`).
    pub fn token_url(&self) -> Result<Url> {
        Ok(normalized_base(&self.auth_base_url)?.join("token")?)
    }
}

/// Parse a base URL and make sure `join` appends to it instead of replacing
/// its last path segment.
pub fn normalized_base(base: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

/// Username and password for the login form.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_wiener_netze() {
        let config = ProviderConfig::default();
        assert_eq!(config.client_id, "wn-smartmeter");
        assert_eq!(config.scope, "openid");
        assert!(config.auth_base_url.contains("log.wien"));
    }

    #[test]
    fn test_endpoint_urls() {
        let config = ProviderConfig::wiener_netze();
        assert_eq!(
            config.authorize_url().unwrap().as_str(),
            "https://log.wien/auth/realms/logwien/protocol/openid-connect/auth"
        );
        assert_eq!(
            config.token_url().unwrap().as_str(),
            "https://log.wien/auth/realms/logwien/protocol/openid-connect/token"
        );
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let config = ProviderConfig::wiener_netze().with_auth_base_url("http://127.0.0.1:9000/oidc");
        assert_eq!(
            config.token_url().unwrap().as_str(),
            "http://127.0.0.1:9000/oidc/token"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ProviderConfig::wiener_netze().with_auth_base_url("not a url");
        assert!(config.authorize_url().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
