//! Error types for the login agent.

use crate::agent::LoginStage;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while logging in or sending session requests.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Network failure during one step of the login sequence.
    #[error("{stage}: request failed: {source}")]
    Transport {
        stage: LoginStage,
        #[source]
        source: reqwest::Error,
    },

    /// Network failure outside the login sequence.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The login page no longer carries the form we expect.
    #[error("form target not found: {0}")]
    FormNotFound(String),

    /// The provider did not redirect after the password was submitted.
    #[error("authentication rejected: no redirect after password submission (wrong credentials?)")]
    CredentialsRejected,

    /// A response did not have the shape the protocol requires.
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// The OS random source could not be read.
    #[error("secure random source unavailable: {0}")]
    Randomness(String),

    /// A header produced by a header function is not valid HTTP.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// URL parsing failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl AuthError {
    /// Check if the provider turned the credentials down.
    pub fn is_credentials_rejected(&self) -> bool {
        matches!(self, AuthError::CredentialsRejected)
    }

    /// Check if this is a scrape failure (page structure changed).
    pub fn is_scrape_error(&self) -> bool {
        matches!(self, AuthError::FormNotFound(_))
    }

    /// Check if this is a protocol-shape failure.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, AuthError::Protocol(_))
    }

    /// Attribute a bare network error to the login stage it happened in.
    pub(crate) fn during(self, stage: LoginStage) -> Self {
        match self {
            AuthError::Http(source) => AuthError::Transport { stage, source },
            other => other,
        }
    }
}
