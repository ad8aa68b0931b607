//! Typed clients for the Wiener Netze smart meter APIs.
//!
//! Logging in goes through [`smartmeter_auth`]; this crate turns the two
//! resulting sessions into typed calls.
//!
//! # API Coverage
//!
//! - **Wiener Stadtwerke gateway**: meter list, base information
//! - **Wiener Netze**: user profile, consumption export

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::SmartMeterClient;
pub use error::{Error, Result};
pub use types::*;

pub use smartmeter_auth::{Credentials, ProviderConfig};
