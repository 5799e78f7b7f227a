//! Typed HTTP client to the hotel REST backend.
//!
//! Forwards the caller's bearer credential verbatim on every request, applies
//! a per-call timeout, and classifies failures. Never retries — a failed
//! call is handed back to the FC orchestrator, which decides whether the
//! model should try again next round.

use std::time::Duration;

use serde_json::Value;

use crate::registry::HttpMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    Timeout,
    Backend4xx,
    Backend5xx,
    Network,
}

#[derive(Debug, Clone)]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout_sec: u64) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Issue one backend call. `bearer` is forwarded verbatim (no
    /// validation, no stripping of the `Bearer ` prefix beyond what the
    /// caller already supplied).
    pub async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        body: &Value,
        bearer: &str,
    ) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url).json(body),
            HttpMethod::Put => self.http.put(&url).json(body),
            HttpMethod::Delete => self.http.delete(&url),
        };
        req = req.header("Authorization", bearer);

        let resp = req.send().await.map_err(classify_send_error)?;
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if status.is_success() {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| BackendError {
                kind: BackendErrorKind::Backend5xx,
                message: format!("malformed backend response: {e}"),
            });
        }

        let kind = if status.is_client_error() {
            BackendErrorKind::Backend4xx
        } else {
            BackendErrorKind::Backend5xx
        };
        Err(BackendError {
            kind,
            message: format!("HTTP {}: {}", status.as_u16(), text),
        })
    }
}

fn classify_send_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError { kind: BackendErrorKind::Timeout, message: e.to_string() }
    } else {
        BackendError { kind: BackendErrorKind::Network, message: e.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display_includes_kind_and_message() {
        let e = BackendError { kind: BackendErrorKind::Timeout, message: "deadline exceeded".into() };
        assert!(e.to_string().contains("Timeout"));
        assert!(e.to_string().contains("deadline exceeded"));
    }
}
