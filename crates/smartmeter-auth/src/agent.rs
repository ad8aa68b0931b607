//! The headless login sequence.
//!
//! ```text
//! Start ─GET auth?…──────────▶ LoginPageFetched
//!       ─POST username───────▶ UsernameSubmitted
//!       ─POST password───────▶ PasswordSubmitted   (redirect not followed)
//!       ─read Location#code──▶ CodeExtracted
//!       ─POST token──────────▶ TokenExchanged
//!       ─build sessions──────▶ Done
//! ```
//!
//! Any step can fail; the attempt is then over. Nothing is retried.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::Response;
use reqwest::header::LOCATION;
use tracing::{debug, info};
use url::Url;

use crate::config::{Credentials, ProviderConfig};
use crate::error::{AuthError, Result};
use crate::form;
use crate::pkce::PkceChallenge;
use crate::session::Sessions;
use crate::token::TokenBundle;
use crate::transport::HttpClient;

/// Position in the login sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    Start,
    LoginPageFetched,
    UsernameSubmitted,
    PasswordSubmitted,
    CodeExtracted,
    TokenExchanged,
    Done,
}

impl fmt::Display for LoginStage {
    /// Describes the work done while leaving the stage, which is what a
    /// failure in that stage was doing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            LoginStage::Start => "requesting login page",
            LoginStage::LoginPageFetched => "submitting username",
            LoginStage::UsernameSubmitted => "submitting password",
            LoginStage::PasswordSubmitted => "reading authorization code",
            LoginStage::CodeExtracted => "exchanging code for token",
            LoginStage::TokenExchanged => "building sessions",
            LoginStage::Done => "logged in",
        };
        f.write_str(action)
    }
}

/// Logs a user in by driving the provider's HTML login form.
///
/// Each call to [`login`](Self::login) gets its own cookie jar, transport
/// stack and PKCE pair, so one `Authenticator` can serve concurrent logins.
#[derive(Debug, Clone)]
pub struct Authenticator {
    config: Arc<ProviderConfig>,
}

impl Authenticator {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Log in and return the two API sessions built from the token.
    pub async fn login(&self, credentials: &Credentials) -> Result<Sessions> {
        let (client, token) = self.authenticate(credentials).await?;
        let sessions = Sessions::from_token(&client, &self.config, token);
        debug!(stage = %LoginStage::Done, "Sessions ready");
        Ok(sessions)
    }

    /// Run the login sequence up to the token exchange.
    ///
    /// Returns the cookie-carrying client the sequence ran on, which still
    /// injects the `User-Agent` header, together with the tokens.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<(HttpClient, TokenBundle)> {
        let user_agent = self.config.user_agent.clone();
        let client = HttpClient::new()?.with_headers(move || {
            HashMap::from([("User-Agent".to_string(), user_agent.clone())])
        });

        let pkce = PkceChallenge::generate()?;
        let login_url = authorization_url(&self.config, &pkce)?;

        debug!(stage = %LoginStage::Start, "Requesting login page");
        let login_page = client
            .get(login_url)
            .await
            .map_err(|e| e.during(LoginStage::Start))?;

        debug!(stage = %LoginStage::LoginPageFetched, "Submitting username");
        let password_page =
            form::submit_field(&client, login_page, "username", &credentials.username)
                .await
                .map_err(|e| e.during(LoginStage::LoginPageFetched))?;

        debug!(stage = %LoginStage::UsernameSubmitted, "Submitting password");
        let redirect =
            form::submit_field(&client, password_page, "password", &credentials.password)
                .await
                .map_err(|e| e.during(LoginStage::UsernameSubmitted))?;

        debug!(
            stage = %LoginStage::PasswordSubmitted,
            status = %redirect.status(),
            "Reading authorization code"
        );
        let code = code_from_response(redirect)?;

        debug!(stage = %LoginStage::CodeExtracted, "Exchanging code for token");
        let token = exchange_code(&client, &self.config, &code, &pkce.verifier)
            .await
            .map_err(|e| e.during(LoginStage::CodeExtracted))?;

        info!(
            expires_in = token.expires_in,
            scope = %token.scope,
            "Logged in to log.wien"
        );
        Ok((client, token))
    }
}

/// Build the authorization request URL for one PKCE pair.
pub fn authorization_url(config: &ProviderConfig, pkce: &PkceChallenge) -> Result<Url> {
    let mut url = config.authorize_url()?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_mode", "fragment")
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scope)
        .append_pair("code_challenge_method", pkce.method)
        .append_pair("code_challenge", &pkce.challenge);
    Ok(url)
}

/// Pull the authorization code out of the response to the password POST.
///
/// The response is dropped here; only its `Location` header matters.
fn code_from_response(response: Response) -> Result<String> {
    let location = match response.headers().get(LOCATION) {
        Some(value) => Some(value.to_str().map_err(|_| {
            AuthError::Protocol("Location header is not valid UTF-8".to_string())
        })?),
        None => None,
    };
    code_from_location(location, response.url())
}

/// Extract `code` from the fragment of a redirect target.
///
/// A missing `Location` means the provider re-rendered the login page
/// instead of redirecting, i.e. it rejected the credentials.
pub fn code_from_location(location: Option<&str>, base: &Url) -> Result<String> {
    let location = location.ok_or(AuthError::CredentialsRejected)?;

    let target = base.join(location).map_err(|e| {
        AuthError::Protocol(format!("redirect target '{}' is not a valid URL: {}", location, e))
    })?;

    let fragment = target
        .fragment()
        .ok_or_else(|| AuthError::Protocol("redirect target has no fragment".to_string()))?;

    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AuthError::Protocol("code not found in redirect fragment".to_string()))
}

/// Trade the authorization code and PKCE verifier for tokens.
async fn exchange_code(
    client: &HttpClient,
    config: &ProviderConfig,
    code: &str,
    verifier: &str,
) -> Result<TokenBundle> {
    let form = [
        ("code", code),
        ("grant_type", "authorization_code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code_verifier", verifier),
    ];

    let response = client.post_form(config.token_url()?, &form).await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(AuthError::Protocol(format!(
            "token exchange failed ({}): {}",
            status, body
        )));
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body)
        .map_err(|e| AuthError::Protocol(format!("failed to decode token response: {}", e)))
}
