//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cert_token::{
    issue,
    schema::{DEFAULT_CERT_METHOD, DEFAULT_EXTENSION},
    CertRecord, RequestRecord, TokenDecoder, TokenEncoder, TokenError,
};
use common::protocol::{
    CertData, CertRequestBody, CertRequestResponse, DecryptRequest, DecryptResponse,
    DecryptSimpleRequest, DecryptSimpleResponse, EncryptStep1Request, ErrorResponse,
    HealthResponse, TrCertResponse,
};
use common::ServiceError;
use tracing::{info, warn};

use super::state::AppState;

/// `POST /encrypt-step1` — build a request token from caller-supplied fields.
///
/// `certMet` falls back to `M` and `extendVar` to sixteen zeroes when absent.
pub async fn encrypt_step1(
    State(state): State<AppState>,
    Json(req): Json<EncryptStep1Request>,
) -> Response {
    let (cp_id, url_code, cert_num, date) = match (req.cp_id, req.url_code, req.cert_num, req.date) {
        (Some(cp_id), Some(url_code), Some(cert_num), Some(date)) => (cp_id, url_code, cert_num, date),
        _ => {
            return error_response(&ServiceError::BadRequest(
                "cpId, urlCode, certNum and date are required".into(),
            ))
        }
    };

    let request = RequestRecord::new(cp_id, url_code, cert_num, date)
        .with_cert_method(req.cert_met.unwrap_or_else(|| DEFAULT_CERT_METHOD.into()))
        .with_plus_info(req.plus_info.unwrap_or_default())
        .with_extension(req.extend_var.unwrap_or_else(|| DEFAULT_EXTENSION.into()));

    match TokenEncoder::new(&*state.cipher).encode_request(&request) {
        Ok(token) => {
            info!("request token issued");
            (
                StatusCode::OK,
                Json(TrCertResponse {
                    tr_cert: token.into_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "request token encoding failed");
            error_response(&encode_error(e))
        }
    }
}

/// `POST /cert-request` — build a request token for the configured relying party.
///
/// The request number and timestamp are generated here from the same instant.
/// Returns `503` when `CP_ID`/`URL_CODE` are not configured.
pub async fn cert_request(
    State(state): State<AppState>,
    Json(req): Json<CertRequestBody>,
) -> Response {
    let Some(issuer) = state.issuer.as_deref() else {
        return error_response(&ServiceError::Unavailable(
            "CP_ID and URL_CODE are not configured".into(),
        ));
    };

    let now = chrono::Local::now();
    let date = issue::generate_date(&now);
    let cert_num = issue::generate_cert_num(&now);

    let request = RequestRecord::new(
        issuer.cp_id.clone(),
        issuer.url_code.clone(),
        cert_num.clone(),
        date.clone(),
    )
    .with_cert_method(req.cert_met.unwrap_or_else(|| DEFAULT_CERT_METHOD.into()))
    .with_plus_info(req.plus_info.unwrap_or_default());

    match TokenEncoder::new(&*state.cipher).encode_request(&request) {
        Ok(token) => (
            StatusCode::OK,
            Json(CertRequestResponse {
                tr_cert: token.into_string(),
                cert_num,
                date,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "request token encoding failed");
            error_response(&encode_error(e))
        }
    }
}

/// `POST /decrypt` — decode a result token returned by the authority.
///
/// Failures are reported as `{success: false, message}` rather than the
/// standard error body, with `400` for missing input and `422` for a rejected
/// token.
pub async fn decrypt(State(state): State<AppState>, Json(req): Json<DecryptRequest>) -> Response {
    let Some(rec_cert) = req.rec_cert.filter(|s| !s.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(DecryptResponse::failed("rec_cert is required")),
        )
            .into_response();
    };

    match TokenDecoder::new(&*state.cipher).decode(&rec_cert) {
        Ok(record) => {
            if !record.ci.is_decrypted() || !record.di.is_decrypted() {
                info!(
                    ci = record.ci.is_decrypted(),
                    di = record.di.is_decrypted(),
                    "result token decoded with undecrypted identifiers"
                );
            }
            (StatusCode::OK, Json(DecryptResponse::ok(cert_data(record)))).into_response()
        }
        Err(e) => {
            warn!(error = %e, "result token rejected");
            let err = decode_error(e);
            (status_of(&err), Json(DecryptResponse::failed(err.to_string()))).into_response()
        }
    }
}

/// `POST /decrypt-simple` — undo a single cipher pass over `data`.
pub async fn decrypt_simple(
    State(state): State<AppState>,
    Json(req): Json<DecryptSimpleRequest>,
) -> Response {
    let Some(data) = req.data.filter(|s| !s.is_empty()) else {
        return error_response(&ServiceError::BadRequest("data is required".into()));
    };

    match TokenDecoder::new(&*state.cipher).decode_simple(&data) {
        Ok(decrypted) => (StatusCode::OK, Json(DecryptSimpleResponse { decrypted })).into_response(),
        Err(e) => {
            warn!(error = %e, "simple decode failed");
            error_response(&decode_error(e))
        }
    }
}

/// `GET /health` — liveness check.
pub async fn health() -> impl IntoResponse {
    let body = HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    };
    (StatusCode::OK, Json(body))
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn encode_error(e: TokenError) -> ServiceError {
    match e {
        TokenError::InvalidInput(msg) => ServiceError::BadRequest(msg),
        e @ TokenError::CipherFailure { .. } => ServiceError::EncryptionFailure(e.to_string()),
        other => ServiceError::Internal(other.to_string()),
    }
}

fn decode_error(e: TokenError) -> ServiceError {
    match e {
        TokenError::InvalidInput(msg) => ServiceError::BadRequest(msg),
        other => ServiceError::InvalidToken(other.to_string()),
    }
}

fn status_of(err: &ServiceError) -> StatusCode {
    StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn error_response(err: &ServiceError) -> Response {
    (status_of(err), Json(ErrorResponse::from(err))).into_response()
}

fn cert_data(record: CertRecord) -> CertData {
    CertData {
        ci: record.ci.value().to_owned(),
        di: record.di.value().to_owned(),
        cert_num: record.cert_num,
        date: record.date,
        phone_no: record.phone_no,
        phone_corp: record.phone_corp,
        birth: record.birth,
        gender: record.gender,
        nation: record.nation,
        name: record.name,
        result: record.result,
        cert_met: record.cert_method,
        ip: record.ip,
        reserve1: record.reserve1,
        reserve2: record.reserve2,
        reserve3: record.reserve3,
        reserve4: record.reserve4,
        plus_info: record.plus_info,
    }
}
