//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use cert_token::CertCipher;

/// Relying-party identity used when the service builds request tokens itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer {
    pub cp_id: String,
    pub url_code: String,
}

/// Application state shared across all request handlers.
///
/// All fields are `Arc`-wrapped so that Axum can clone the state for each
/// request without copying key material.
#[derive(Clone)]
pub struct AppState {
    /// Cipher capability for the single configured key context.
    pub cipher: Arc<dyn CertCipher>,
    /// Present only when `CP_ID` and `URL_CODE` are configured.
    pub issuer: Option<Arc<Issuer>>,
}

impl AppState {
    /// Create a new [`AppState`] around a cipher and optional issuer identity.
    pub fn new(cipher: Arc<dyn CertCipher>, issuer: Option<Issuer>) -> Self {
        Self {
            cipher,
            issuer: issuer.map(Arc::new),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State with a fixed test key and the given issuer.
    pub fn for_tests(issuer: Option<Issuer>) -> Self {
        let cipher = cert_token::SivCipher::new(&[0x42u8; 32], &[0x07u8; 12], &[0x19u8; 32])
            .expect("fixed test key material is valid");
        Self::new(Arc::new(cipher), issuer)
    }
}
