//! Maps [`hg_domain::error::Error`] onto the gateway's HTTP error envelope
//! (§6.1): `{code, message, status, traceId?}`. Only Turn-Controller-level
//! failures ever reach this — backend/store/TTS outages are absorbed
//! upstream and never construct an `ApiError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use hg_domain::error::Error;
use serde::Serialize;

pub struct ApiError {
    pub error: Error,
    pub trace_id: Option<String>,
}

impl ApiError {
    pub fn new(error: Error, trace_id: Option<String>) -> Self {
        Self { error, trace_id }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "traceId")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "retryAfter")]
    retry_after: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = StatusCode::from_u16(self.error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            code: self.error.code(),
            message: self.error.to_string(),
            status: self.error.status(),
            trace_id: self.trace_id,
            retry_after: self.error.retry_after(),
        };

        if status_code.is_server_error() {
            tracing::error!(code = %body.code, error = %self.error, "request failed");
        } else {
            tracing::warn!(code = %body.code, error = %self.error, "request rejected");
        }

        (status_code, Json(body)).into_response()
    }
}
