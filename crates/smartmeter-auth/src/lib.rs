//! Headless login against the `log.wien` identity provider.
//!
//! The provider offers no programmatic login API, so this crate walks the
//! Keycloak login pages the way a browser would: it keeps the session
//! cookies, scrapes the one-time form targets out of each page, stops at the
//! final redirect to read the authorization code out of its URL fragment,
//! and exchanges that code (PKCE-bound) for a bearer token.
//!
//! # Components
//!
//! - [`pkce`]: S256 verifier/challenge generation
//! - [`transport`]: the [`Transport`] seam, header injection, and the
//!   cookie-carrying [`HttpClient`] with copy-and-override redirect suppression
//! - [`form`]: form target scraping and single-field form submission
//! - [`agent`]: the login state machine
//! - [`session`]: the two authenticated sessions built from the token
//!
//! # Example
//!
//! ```no_run
//! use smartmeter_auth::{Authenticator, Credentials, ProviderConfig};
//!
//! # async fn example() -> smartmeter_auth::Result<()> {
//! let agent = Authenticator::new(ProviderConfig::wiener_netze());
//! let sessions = agent.login(&Credentials::new("user", "secret")).await?;
//! let url = url::Url::parse("https://service.wienernetze.at/rest/smp/1.0/w/user/profile")?;
//! let response = sessions.netze().get(url).await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod form;
pub mod pkce;
pub mod session;
pub mod token;
pub mod transport;

pub use agent::{Authenticator, LoginStage};
pub use config::{Credentials, ProviderConfig};
pub use error::{AuthError, Result};
pub use pkce::PkceChallenge;
pub use session::{AuthenticatedSession, Sessions};
pub use token::TokenBundle;
pub use transport::{HeaderInjecting, HeadersFn, HttpClient, Transport};
