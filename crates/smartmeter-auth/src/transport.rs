//! Request-sending plumbing shared by the login agent and the sessions.
//!
//! [`Transport`] is the "send a request, get a response" seam. The bottom
//! of every stack is a `reqwest::Client`; [`HeaderInjecting`] decorates any
//! transport with a header function that is re-evaluated for every request.
//!
//! [`HttpClient`] bundles a cookie jar, a redirect policy and a list of
//! header layers. Deriving a new client ([`HttpClient::with_headers`],
//! [`HttpClient::without_redirect`]) copies the bundle and overrides one
//! part; the client it was derived from keeps behaving exactly as before.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Method, Request, RequestBuilder, Response};
use serde::Serialize;
use url::Url;

use crate::error::{AuthError, Result};

/// Produces the headers to add to one outgoing request.
pub type HeadersFn = Arc<dyn Fn() -> HashMap<String, String> + Send + Sync>;

/// Anything that can send a request and hand back the response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn send(&self, request: Request) -> Result<Response> {
        Ok(self.execute(request).await?)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        (**self).send(request).await
    }
}

/// Transport decorator that appends the output of a header function to
/// every request before handing it to the inner transport.
///
/// Headers are appended, never replaced, so a name already present on the
/// request ends up with several values.
pub struct HeaderInjecting<T> {
    inner: T,
    headers: HeadersFn,
}

impl<T: Transport> HeaderInjecting<T> {
    pub fn new(inner: T, headers: HeadersFn) -> Self {
        Self { inner, headers }
    }
}

#[async_trait]
impl<T: Transport> Transport for HeaderInjecting<T> {
    async fn send(&self, mut request: Request) -> Result<Response> {
        for (name, value) in (self.headers)() {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| AuthError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(&value).map_err(|e| AuthError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            request.headers_mut().append(header_name, header_value);
        }
        self.inner.send(request).await
    }
}

/// Cookie-carrying HTTP client with a fixed redirect policy and a stack of
/// header layers.
#[derive(Clone)]
pub struct HttpClient {
    jar: Arc<Jar>,
    follow_redirects: bool,
    client: reqwest::Client,
    layers: Vec<HeadersFn>,
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    /// Create a client with a fresh cookie jar that follows redirects.
    pub fn new() -> Result<Self> {
        Self::with_jar(Arc::new(Jar::default()))
    }

    /// Create a client around an existing cookie jar.
    pub fn with_jar(jar: Arc<Jar>) -> Result<Self> {
        Self::assemble(jar, true, Vec::new())
    }

    fn assemble(jar: Arc<Jar>, follow_redirects: bool, layers: Vec<HeadersFn>) -> Result<Self> {
        let policy = if follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(policy)
            .build()
            .map_err(|e| AuthError::ClientBuild(e.to_string()))?;

        let transport = layers
            .iter()
            .fold(Arc::new(client.clone()) as Arc<dyn Transport>, |inner, headers| {
                Arc::new(HeaderInjecting::new(inner, Arc::clone(headers)))
            });

        Ok(Self {
            jar,
            follow_redirects,
            client,
            layers,
            transport,
        })
    }

    /// Derive a client that additionally injects `headers` into every request.
    pub fn with_headers<F>(&self, headers: F) -> Self
    where
        F: Fn() -> HashMap<String, String> + Send + Sync + 'static,
    {
        self.with_headers_fn(Arc::new(headers))
    }

    /// Same as [`with_headers`](Self::with_headers) for an already shared function.
    pub fn with_headers_fn(&self, headers: HeadersFn) -> Self {
        let mut derived = self.clone();
        derived.layers.push(Arc::clone(&headers));
        derived.transport = Arc::new(HeaderInjecting::new(
            Arc::clone(&self.transport),
            headers,
        ));
        derived
    }

    /// Derive a client that returns redirect responses instead of following
    /// them. Cookie jar and header layers are shared with `self`.
    pub fn without_redirect(&self) -> Result<Self> {
        Self::assemble(Arc::clone(&self.jar), false, self.layers.clone())
    }

    pub fn follows_redirects(&self) -> bool {
        self.follow_redirects
    }

    /// The cookie jar shared by this client and everything derived from it.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// Start building a request; send it with [`send`](Self::send).
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request through the header layers.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        self.transport.send(request).await
    }

    pub async fn get(&self, url: Url) -> Result<Response> {
        self.send(self.request(Method::GET, url)).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form<T: Serialize + ?Sized>(&self, url: Url, form: &T) -> Result<Response> {
        self.send(self.request(Method::POST, url).form(form)).await
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("follow_redirects", &self.follow_redirects)
            .field("header_layers", &self.layers.len())
            .finish()
    }
}
