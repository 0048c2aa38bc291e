//! RSA-PSS authentication for the WebSocket upgrade.
//!
//! The exchange authenticates each connection attempt with three headers:
//! the API key id, a base64 RSA-PSS/SHA-256 signature over the canonical
//! request string `<timestamp_ms>GET<path>`, and the timestamp itself.
//! Signatures embed the timestamp, so headers must be minted fresh for every
//! attempt; the reconnection controller asks for a new bundle each time.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::SigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use sha2::Sha256;

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// WebSocket path signed into every auth header bundle.
pub const WS_PATH: &str = "/trade-api/ws/v2";

pub const HEADER_ACCESS_KEY: &str = "KALSHI-ACCESS-KEY";
pub const HEADER_ACCESS_SIGNATURE: &str = "KALSHI-ACCESS-SIGNATURE";
pub const HEADER_ACCESS_TIMESTAMP: &str = "KALSHI-ACCESS-TIMESTAMP";

/// Environment variables read by [`KalshiAuth::from_env`].
pub const ENV_KEY_ID: &str = "KALSHI_API_KEY";
pub const ENV_PRIVATE_KEY: &str = "KALSHI_PRIVATE_KEY";
pub const ENV_PRIVATE_KEY_PATH: &str = "KALSHI_PRIVATE_KEY_PATH";

/// A single HTTP header to inject into the upgrade request.
pub type Header = (String, String);

/// Errors returned by credential loading and signing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing key id")]
    MissingKeyId,
    #[error("missing private key")]
    MissingPrivateKey,
    #[error("signing failed: {detail}")]
    SigningFailed { detail: String },
}

impl AuthError {
    fn signing(detail: impl Into<String>) -> Self {
        AuthError::SigningFailed {
            detail: detail.into(),
        }
    }
}

/// API credentials with the private key decoded once at construction.
#[derive(Clone)]
pub struct KalshiAuth {
    key_id: String,
    key: RsaPrivateKey,
}

impl fmt::Debug for KalshiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KalshiAuth")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl KalshiAuth {
    /// Load credentials from PEM content (PKCS#8, with PKCS#1 fallback).
    ///
    /// OpenSSH-format keys are refused up front with a detail instructing
    /// conversion, since only PEM-encoded PKCS#8/PKCS#1 keys can be decoded.
    pub fn from_pem_str(key_id: impl Into<String>, pem: &str) -> Result<Self, AuthError> {
        let key_id = key_id.into();
        if key_id.is_empty() {
            return Err(AuthError::MissingKeyId);
        }
        if pem.trim().is_empty() {
            return Err(AuthError::MissingPrivateKey);
        }
        if pem.contains("BEGIN OPENSSH PRIVATE KEY") {
            return Err(AuthError::signing(
                "OpenSSH private key format detected; convert to PEM (PKCS#8) first",
            ));
        }

        let key = RsaPrivateKey::from_pkcs8_pem(pem).or_else(|pkcs8_err| {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|_| AuthError::signing(pkcs8_err.to_string()))
        })?;

        Ok(Self { key_id, key })
    }

    /// Load credentials from a PEM file on disk.
    pub fn from_pem_file(
        key_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, AuthError> {
        let pem = fs::read_to_string(path).map_err(|_| AuthError::MissingPrivateKey)?;
        Self::from_pem_str(key_id, &pem)
    }

    /// Load credentials from the process environment.
    ///
    /// Reads `KALSHI_API_KEY` for the key id and either `KALSHI_PRIVATE_KEY`
    /// (PEM contents) or `KALSHI_PRIVATE_KEY_PATH` (file to read) for the key.
    pub fn from_env() -> Result<Self, AuthError> {
        let key_id = env::var(ENV_KEY_ID).map_err(|_| AuthError::MissingKeyId)?;

        if let Ok(pem) = env::var(ENV_PRIVATE_KEY) {
            return Self::from_pem_str(key_id, &pem);
        }
        if let Ok(path) = env::var(ENV_PRIVATE_KEY_PATH) {
            return Self::from_pem_file(key_id, path);
        }
        Err(AuthError::MissingPrivateKey)
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign a message with RSA-PSS/SHA-256, salt length equal to the digest
    /// length, returning the base64-encoded signature without line breaks.
    pub fn sign(&self, message: &str) -> Result<String, AuthError> {
        let signing_key = SigningKey::<Sha256>::new(self.key.clone());
        let mut rng = rand::thread_rng();
        let signature = signing_key
            .try_sign_with_rng(&mut rng, message.as_bytes())
            .map_err(|err| AuthError::signing(err.to_string()))?;
        Ok(BASE64.encode(signature.to_bytes()))
    }

    /// Build the three upgrade headers for a given timestamp.
    pub fn build_ws_headers(
        &self,
        path: &str,
        timestamp_ms: i64,
    ) -> Result<Vec<Header>, AuthError> {
        let signature = self.sign(&canonical_request(timestamp_ms, path))?;
        Ok(vec![
            (HEADER_ACCESS_KEY.to_string(), self.key_id.clone()),
            (HEADER_ACCESS_SIGNATURE.to_string(), signature),
            (HEADER_ACCESS_TIMESTAMP.to_string(), timestamp_ms.to_string()),
        ])
    }

    /// Build upgrade headers stamped with the current wall clock.
    pub fn ws_headers_now(&self, path: &str) -> Result<Vec<Header>, AuthError> {
        self.build_ws_headers(path, unix_ms())
    }
}

/// The exact byte sequence signed for authentication:
/// `<timestamp_ms_decimal>GET<path>`.
pub fn canonical_request(timestamp_ms: i64, path: &str) -> String {
    format!("{timestamp_ms}GET{path}")
}

/// Current wall clock in milliseconds since the Unix epoch.
pub fn unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
