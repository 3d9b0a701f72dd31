//! Configuration loading for the bridge.

use anyhow::{Context, Result};
use cert_token::SivCipher;
use serde::Deserialize;

/// Key material and log level, read from the environment.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64 AES-256 key (32 bytes). **Required.**
    pub cipher_key: String,

    /// Base64 nonce (12 bytes). **Required.**
    pub cipher_iv: String,

    /// Base64 HMAC key for the integrity tag. **Required.**
    pub tag_key: String,

    /// Tracing log level. Quiet by default so callers only see the result.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("cipher_key", &"[REDACTED]")
            .field("cipher_iv", &"[REDACTED]")
            .field("tag_key", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build cert-bridge configuration")?;

        cfg.try_deserialize()
            .context("failed to deserialise cert-bridge configuration")
    }

    /// Build the cipher capability, failing on malformed key material.
    pub fn build_cipher(&self) -> Result<SivCipher> {
        SivCipher::from_base64(&self.cipher_key, &self.cipher_iv, &self.tag_key)
            .context("CIPHER_KEY, CIPHER_IV or TAG_KEY is invalid")
    }
}
