//! Main client implementation.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use smartmeter_auth::config::normalized_base;
use smartmeter_auth::{
    AuthenticatedSession, Authenticator, Credentials, ProviderConfig, Sessions, TokenBundle,
};
use url::Url;

use crate::api::{NetzeApi, StadtwerkeApi};
use crate::error::{Error, Result};

/// Client for both smart meter APIs.
///
/// Created by logging in; holds the two authenticated sessions.
///
/// # Example
///
/// ```no_run
/// use smartmeter_auth::{Credentials, ProviderConfig};
/// use smartmeter_client::SmartMeterClient;
///
/// # async fn example() -> smartmeter_client::Result<()> {
/// let client = SmartMeterClient::login(
///     ProviderConfig::wiener_netze(),
///     &Credentials::new("user", "secret"),
/// )
/// .await?;
///
/// for meter in client.stadtwerke().meters().await? {
///     println!("{} ({})", meter.id, meter.label);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SmartMeterClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    sessions: Sessions,
    stadtwerke_url: Url,
    netze_url: Url,
}

/// Query for requests without parameters.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// Which of the two APIs a request goes to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Backend {
    Stadtwerke,
    Netze,
}

impl SmartMeterClient {
    /// Log in with `credentials` and build a client on the resulting sessions.
    pub async fn login(config: ProviderConfig, credentials: &Credentials) -> Result<Self> {
        let agent = Authenticator::new(config);
        let sessions = agent.login(credentials).await?;
        Self::from_sessions(agent.config(), sessions)
    }

    /// Build a client from sessions obtained elsewhere.
    pub fn from_sessions(config: &ProviderConfig, sessions: Sessions) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(ClientInner {
                sessions,
                stadtwerke_url: normalized_base(&config.stadtwerke_api_url)?,
                netze_url: normalized_base(&config.netze_api_url)?,
            }),
        })
    }

    /// Tokens of the login this client was created from.
    pub fn token(&self) -> &TokenBundle {
        self.inner.sessions.token()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the Wiener Stadtwerke gateway (meters, base information).
    pub fn stadtwerke(&self) -> StadtwerkeApi {
        StadtwerkeApi::new(self.clone())
    }

    /// Access the Wiener Netze API (profile, consumption export).
    pub fn netze(&self) -> NetzeApi {
        NetzeApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    fn session(&self, backend: Backend) -> &AuthenticatedSession {
        match backend {
            Backend::Stadtwerke => self.inner.sessions.stadtwerke(),
            Backend::Netze => self.inner.sessions.netze(),
        }
    }

    /// Build a URL for an API path.
    pub(crate) fn url(&self, backend: Backend, path: &str) -> Result<Url> {
        let base = match backend {
            Backend::Stadtwerke => &self.inner.stadtwerke_url,
            Backend::Netze => &self.inner.netze_url,
        };
        base.join(path.trim_start_matches('/')).map_err(Error::from)
    }

    /// GET a path and return the body of a successful response.
    async fn fetch<Q>(&self, backend: Backend, path: &str, query: &Q) -> Result<Vec<u8>>
    where
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(backend, path)?;
        tracing::debug!(?backend, path = url.path(), "GET");

        let response = self.session(backend).get_with_query(url, query).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// GET a path and decode a single JSON value.
    pub(crate) async fn get_json<T, Q>(&self, backend: Backend, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let body = self.fetch(backend, path, query).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET a path whose body may hold several concatenated JSON values.
    pub(crate) async fn get_json_stream<T>(&self, backend: Backend, path: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let body = self.fetch(backend, path, NO_QUERY).await?;
        decode_stream(&body)
    }
}

/// Decode every JSON value in `body`, in order.
pub(crate) fn decode_stream<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>> {
    serde_json::Deserializer::from_slice(body)
        .into_iter::<T>()
        .enumerate()
        .map(|(index, value)| value.map_err(|source| Error::Decode { index, source }))
        .collect()
}
