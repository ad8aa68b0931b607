//! PKCE (RFC 7636) verifier and challenge generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::{AuthError, Result};

/// The only challenge method the provider is asked to use.
pub const CHALLENGE_METHOD: &str = "S256";

const VERIFIER_BYTES: usize = 32;

/// PKCE code verifier and challenge pair.
///
/// Lives for one login attempt; the verifier is sent with the token
/// exchange and then dropped.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub method: &'static str,
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge pair from the OS random source.
    pub fn generate() -> Result<Self> {
        let mut verifier_bytes = [0u8; VERIFIER_BYTES];
        OsRng
            .try_fill_bytes(&mut verifier_bytes)
            .map_err(|e| AuthError::Randomness(e.to_string()))?;
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);
        let challenge = challenge_for(&verifier);

        Ok(Self {
            method: CHALLENGE_METHOD,
            verifier,
            challenge,
        })
    }
}

/// Compute the S256 challenge for a verifier: `BASE64URL(SHA256(verifier))`.
pub fn challenge_for(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
