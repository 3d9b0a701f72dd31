//! Request and response types exchanged with `certd` callers.
//!
//! Field names follow the wire names used by relying parties
//! (`cpId`, `rec_cert`, `tr_cert`, ...). Request fields are optional at the
//! serde level so that a missing value becomes a `400` with a readable message
//! rather than a body-rejection.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request token
// ---------------------------------------------------------------------------

/// Request body for `POST /encrypt-step1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptStep1Request {
    pub cp_id: Option<String>,
    pub url_code: Option<String>,
    pub cert_num: Option<String>,
    pub date: Option<String>,
    /// Verification method; `M` when absent, may be empty.
    pub cert_met: Option<String>,
    pub plus_info: Option<String>,
    /// Reserved extension; 16 zeroes when absent.
    pub extend_var: Option<String>,
}

/// Request body for `POST /cert-request`.
///
/// The service fills in its own `cpId`/`urlCode` and generates the request
/// number and timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertRequestBody {
    pub cert_met: Option<String>,
    pub plus_info: Option<String>,
}

/// Response body for `POST /encrypt-step1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrCertResponse {
    pub tr_cert: String,
}

/// Response body for `POST /cert-request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertRequestResponse {
    pub tr_cert: String,
    #[serde(rename = "certNum")]
    pub cert_num: String,
    pub date: String,
}

// ---------------------------------------------------------------------------
// Result token
// ---------------------------------------------------------------------------

/// Request body for `POST /decrypt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecryptRequest {
    pub rec_cert: Option<String>,
}

/// Decoded verification result, keyed by wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertData {
    #[serde(rename = "certNum")]
    pub cert_num: String,
    pub date: String,
    #[serde(rename = "CI")]
    pub ci: String,
    #[serde(rename = "phoneNo")]
    pub phone_no: String,
    #[serde(rename = "phoneCorp")]
    pub phone_corp: String,
    pub birth: String,
    pub gender: String,
    pub nation: String,
    pub name: String,
    pub result: String,
    #[serde(rename = "certMet")]
    pub cert_met: String,
    pub ip: String,
    pub reserve1: String,
    pub reserve2: String,
    pub reserve3: String,
    pub reserve4: String,
    #[serde(rename = "plusInfo")]
    pub plus_info: String,
    #[serde(rename = "DI")]
    pub di: String,
}

/// Response body for `POST /decrypt`.
///
/// Exactly one of `data` (on success) and `message` (on failure) is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CertData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DecryptResponse {
    pub fn ok(data: CertData) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Request body for `POST /decrypt-simple`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecryptSimpleRequest {
    pub data: Option<String>,
}

/// Response body for `POST /decrypt-simple`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptSimpleResponse {
    pub decrypted: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"`.
    pub status: String,
    /// Crate version of the running service.
    pub version: String,
}
