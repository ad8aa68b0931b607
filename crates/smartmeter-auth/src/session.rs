//! Authenticated sessions for the two downstream APIs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::{Method, Response};
use serde::Serialize;
use url::Url;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::token::TokenBundle;
use crate::transport::{HeadersFn, HttpClient};

/// Header carrying the Wiener Stadtwerke gateway key.
pub const API_KEY_HEADER: &str = "X-Gateway-APIKey";

/// An HTTP client plus the header function that authenticates it.
///
/// The header function runs for every request, so whatever it reads is
/// picked up at send time.
#[derive(Clone)]
pub struct AuthenticatedSession {
    base: HttpClient,
    headers: HeadersFn,
    http: HttpClient,
}

impl AuthenticatedSession {
    /// Layer `headers` on top of `base`. `base` itself is left unchanged.
    pub fn new(base: &HttpClient, headers: HeadersFn) -> Self {
        Self {
            base: base.clone(),
            http: base.with_headers_fn(Arc::clone(&headers)),
            headers,
        }
    }

    /// Replace the header function of this session only.
    pub fn set_headers<F>(&mut self, headers: F)
    where
        F: Fn() -> HashMap<String, String> + Send + Sync + 'static,
    {
        let headers: HeadersFn = Arc::new(headers);
        self.http = self.base.with_headers_fn(Arc::clone(&headers));
        self.headers = headers;
    }

    /// Evaluate the header function once.
    pub fn headers(&self) -> HashMap<String, String> {
        (self.headers)()
    }

    /// The underlying client, header layers included.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub async fn get(&self, url: Url) -> Result<Response> {
        self.http.get(url).await
    }

    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        url: Url,
        query: &Q,
    ) -> Result<Response> {
        self.http
            .send(self.http.request(Method::GET, url).query(query))
            .await
    }
}

impl fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.headers().into_keys().collect();
        names.sort();
        f.debug_struct("AuthenticatedSession")
            .field("headers", &names)
            .field("http", &self.http)
            .finish()
    }
}

/// The result of a successful login: one session per downstream API,
/// both backed by the same token.
#[derive(Debug, Clone)]
pub struct Sessions {
    token: Arc<TokenBundle>,
    stadtwerke: AuthenticatedSession,
    netze: AuthenticatedSession,
}

impl Sessions {
    /// Build both sessions on top of the client the login ran on.
    ///
    /// The Wiener Stadtwerke session sends the bearer token and the gateway
    /// key; the Wiener Netze session sends only the bearer token.
    pub fn from_token(base: &HttpClient, config: &ProviderConfig, token: TokenBundle) -> Self {
        let token = Arc::new(token);

        let stadtwerke_token = Arc::clone(&token);
        let api_key = config.stadtwerke_api_key.clone();
        let stadtwerke = AuthenticatedSession::new(
            base,
            Arc::new(move || {
                HashMap::from([
                    ("Authorization".to_string(), stadtwerke_token.bearer()),
                    (API_KEY_HEADER.to_string(), api_key.clone()),
                ])
            }),
        );

        let netze_token = Arc::clone(&token);
        let netze = AuthenticatedSession::new(
            base,
            Arc::new(move || HashMap::from([("Authorization".to_string(), netze_token.bearer())])),
        );

        Self {
            token,
            stadtwerke,
            netze,
        }
    }

    pub fn token(&self) -> &TokenBundle {
        &self.token
    }

    /// Session for the Wiener Stadtwerke smart meter portal gateway.
    pub fn stadtwerke(&self) -> &AuthenticatedSession {
        &self.stadtwerke
    }

    /// Session for the Wiener Netze service API.
    pub fn netze(&self) -> &AuthenticatedSession {
        &self.netze
    }

    pub fn stadtwerke_mut(&mut self) -> &mut AuthenticatedSession {
        &mut self.stadtwerke
    }

    pub fn netze_mut(&mut self) -> &mut AuthenticatedSession {
        &mut self.netze
    }

    /// Split into `(stadtwerke, netze)`.
    pub fn into_parts(self) -> (AuthenticatedSession, AuthenticatedSession) {
        (self.stadtwerke, self.netze)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(access: &str) -> TokenBundle {
        serde_json::from_value(serde_json::json!({
            "access_token": access,
            "expires_in": 300,
        }))
        .unwrap()
    }

    #[test]
    fn test_session_header_sets() {
        let base = HttpClient::new().unwrap();
        let config = ProviderConfig::wiener_netze().with_stadtwerke_api_key("key-1");
        let sessions = Sessions::from_token(&base, &config, token("T"));

        let stadtwerke = sessions.stadtwerke().headers();
        assert_eq!(stadtwerke["Authorization"], "Bearer T");
        assert_eq!(stadtwerke[API_KEY_HEADER], "key-1");

        let netze = sessions.netze().headers();
        assert_eq!(netze["Authorization"], "Bearer T");
        assert!(!netze.contains_key(API_KEY_HEADER));
        assert_eq!(netze.len(), 1);
    }

    #[test]
    fn test_set_headers_affects_one_session() {
        let base = HttpClient::new().unwrap();
        let mut sessions =
            Sessions::from_token(&base, &ProviderConfig::wiener_netze(), token("T"));

        sessions
            .netze_mut()
            .set_headers(|| HashMap::from([("Authorization".to_string(), "Bearer X".to_string())]));

        assert_eq!(sessions.netze().headers()["Authorization"], "Bearer X");
        assert_eq!(sessions.stadtwerke().headers()["Authorization"], "Bearer T");
    }

    #[test]
    fn test_sessions_keep_redirect_following() {
        let base = HttpClient::new().unwrap();
        let sessions = Sessions::from_token(&base, &ProviderConfig::wiener_netze(), token("T"));
        assert!(sessions.stadtwerke().http().follows_redirects());
        assert!(sessions.netze().http().follows_redirects());
    }

    #[test]
    fn test_debug_lists_header_names_only() {
        let base = HttpClient::new().unwrap();
        let sessions =
            Sessions::from_token(&base, &ProviderConfig::wiener_netze(), token("very-secret"));
        let debug = format!("{:?}", sessions.stadtwerke());
        assert!(debug.contains("Authorization"));
        assert!(!debug.contains("very-secret"));
    }
}
