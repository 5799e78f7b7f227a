//! `POST /chat` — the gateway's one external contract (§6.1).

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use base64::Engine;
use serde::{Deserialize, Serialize};

use hg_domain::error::Error;
use hg_domain::session::{ToolInvocationTrace, Warning};
use hg_domain::turn::{AudioInput, TurnInput};

use crate::runtime::cancel::{CancelGuard, CancelToken};
use crate::state::AppState;

use super::error::ApiError;

const MIME_AUDIO_MPEG: &str = "audio/mpeg";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub session_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub audio: Option<AudioBody>,
    #[serde(default)]
    pub voice_mode: bool,
    #[serde(default)]
    pub client: Option<ClientMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioBody {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    pub trace_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseBody {
    pub session_id: String,
    pub language: String,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioResponseBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_trace: Option<Vec<ToolInvocationTrace>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<Warning>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioResponseBody {
    pub mime_type: String,
    pub data: String,
}

pub async fn chat(State(state): State<AppState>, headers: HeaderMap, Json(body): Json<ChatRequestBody>) -> Response {
    let trace_id = body.client.as_ref().map(|c| c.trace_id.clone());

    match handle(state, headers, body).await {
        Ok(resp) => resp,
        Err(error) => ApiError::new(error, trace_id).into_response(),
    }
}

async fn handle(state: AppState, headers: HeaderMap, body: ChatRequestBody) -> Result<Response, Error> {
    let bearer = extract_bearer(&headers)?;
    let wants_audio = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains(MIME_AUDIO_MPEG))
        .unwrap_or(false);

    let audio = body
        .audio
        .map(|a| -> Result<AudioInput, Error> {
            let data = base64::engine::general_purpose::STANDARD
                .decode(a.data)
                .map_err(|e| Error::BadRequest(format!("audio.data is not valid base64: {e}")))?;
            Ok(AudioInput { mime_type: a.mime_type, data })
        })
        .transpose()?;

    let input = TurnInput {
        session_id: body.session_id,
        user_text: body.message,
        audio,
        voice_mode: body.voice_mode || wants_audio,
        bearer_credential: bearer,
        trace_id: body.client.map(|c| c.trace_id),
    };

    let cancel = CancelToken::new();
    let mut guard = CancelGuard::new(cancel.clone());
    let output = state.turns.handle(input, &cancel).await?;
    guard.disarm();

    let tool_trace = if output.tool_trace.is_empty() { None } else { Some(output.tool_trace) };
    let warnings = if output.warnings.is_empty() { None } else { Some(output.warnings) };

    if wants_audio {
        if let Some(audio) = &output.audio {
            let mut response = (StatusCode::OK, audio.data.clone()).into_response();
            response.headers_mut().insert(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_str(&audio.mime_type).unwrap_or_else(|_| HeaderValue::from_static(MIME_AUDIO_MPEG)),
            );
            let escaped = urlencoding_escape(&output.reply);
            if let Ok(value) = HeaderValue::from_str(&escaped) {
                response.headers_mut().insert("X-Agent-Text", value);
            }
            return Ok(response);
        }
        // TTS unavailable: fall through to the JSON envelope with a warning.
    }

    let body = ChatResponseBody {
        session_id: output.session_id,
        language: output.language,
        reply: output.reply,
        audio: output.audio.map(|a| AudioResponseBody {
            mime_type: a.mime_type,
            data: base64::engine::general_purpose::STANDARD.encode(a.data),
        }),
        tool_trace,
        warnings,
    };

    Ok(Json(body).into_response())
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, Error> {
    let raw = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing Authorization header".into()))?
        .to_str()
        .map_err(|_| Error::Unauthorized("Authorization header is not valid UTF-8".into()))?;

    if !raw.starts_with("Bearer ") || raw.len() <= "Bearer ".len() {
        return Err(Error::Unauthorized("Authorization header must be 'Bearer <credential>'".into()));
    }
    Ok(raw.to_owned())
}

/// Minimal percent-encoding for header placement — headers cannot carry
/// non-ASCII or control bytes (§6.1: "URL-escaped").
fn urlencoding_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(*byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_required() {
        let headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_err());
    }

    #[test]
    fn bearer_header_must_have_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());
    }

    #[test]
    fn bearer_header_is_forwarded_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer(&headers).unwrap(), "Bearer abc123");
    }

    #[test]
    fn empty_bearer_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer(&headers).is_err());
    }

    #[test]
    fn url_escape_leaves_ascii_alnum_untouched() {
        assert_eq!(urlencoding_escape("hello"), "hello");
    }

    #[test]
    fn url_escape_encodes_spaces_and_unicode() {
        let escaped = urlencoding_escape("cześć świecie");
        assert!(!escaped.contains(' '));
        assert!(escaped.contains("%C5"));
    }
}
