//! Configuration loading and validation for the token service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use cert_token::SivCipher;
use serde::Deserialize;

use crate::server::state::Issuer;

/// Validated token service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64 AES-256 key (32 bytes). **Required.**
    pub cipher_key: String,

    /// Base64 nonce (12 bytes) used for every encryption. **Required.**
    pub cipher_iv: String,

    /// Base64 HMAC key for the integrity tag (at least 16 bytes). **Required.**
    pub tag_key: String,

    /// Relying-party identifier assigned by the authority. Enables `POST /cert-request`.
    #[serde(default)]
    pub cp_id: Option<String>,

    /// Return-URL code registered with the authority. Enables `POST /cert-request`.
    #[serde(default)]
    pub url_code: Option<String>,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// OTLP endpoint for span export. Spans are only logged locally when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("Config")
            .field("cipher_key", &"[REDACTED]")
            .field("cipher_iv", &"[REDACTED]")
            .field("tag_key", &"[REDACTED]")
            .field("cp_id", &self.cp_id)
            .field("url_code", &self.url_code)
            .field("listen_port", &self.listen_port)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Build the cipher capability from the configured key material.
    ///
    /// # Errors
    ///
    /// Returns an error if the key material is not valid base64 or has the
    /// wrong length.
    pub fn build_cipher(&self) -> Result<SivCipher> {
        SivCipher::from_base64(&self.cipher_key, &self.cipher_iv, &self.tag_key)
            .context("CIPHER_KEY, CIPHER_IV or TAG_KEY is invalid")
    }

    /// Relying-party identity, when both `CP_ID` and `URL_CODE` are set.
    pub fn issuer(&self) -> Option<Issuer> {
        let cp_id = self.cp_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let url_code = self
            .url_code
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())?;
        Some(Issuer {
            cp_id: cp_id.to_owned(),
            url_code: url_code.to_owned(),
        })
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.cipher_key, "CIPHER_KEY")?;
        ensure_non_empty(&self.cipher_iv, "CIPHER_IV")?;
        ensure_non_empty(&self.tag_key, "TAG_KEY")?;
        self.build_cipher()?;

        if self.cp_id.is_some() != self.url_code.is_some() {
            anyhow::bail!("CP_ID and URL_CODE must be set together");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
