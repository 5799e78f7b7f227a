//! Unified error type for the gateway.
//!
//! Every component surfaces failures through this enum. Variants that can
//! reach the HTTP boundary carry a stable `code` and `status`; variants that
//! are always absorbed internally (store/limiter/TTS outages) still route
//! through here so they get one consistent log shape via `tracing`.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session store: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("malformed input: {0}")]
    BadRequest(String),

    #[error("missing or invalid credential: {0}")]
    Unauthorized(String),

    #[error("payload exceeds the inline size limit")]
    PayloadTooLarge,

    #[error("rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("backend rejected the request: {0}")]
    Unprocessable(String),

    #[error("backend returned a server error: {0}")]
    Backend5xx(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("config: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable wire-level code, per the gateway's error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Json(_) => "BAD_REQUEST",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Error::Unprocessable(_) => "UNPROCESSABLE",
            Error::RateLimited { .. } => "RATE_LIMITED",
            Error::Backend5xx(_) => "BACKEND_5XX",
            Error::Timeout(_) => "INTERNAL_ERROR",
            Error::Io(_) | Error::Http(_) | Error::Redis(_) | Error::Config(_) | Error::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// HTTP status that corresponds to [`Self::code`].
    pub fn status(&self) -> u16 {
        match self {
            Error::BadRequest(_) | Error::Json(_) => 400,
            Error::Unauthorized(_) => 401,
            Error::PayloadTooLarge => 413,
            Error::Unprocessable(_) => 422,
            Error::RateLimited { .. } => 429,
            Error::Backend5xx(_) => 502,
            _ => 500,
        }
    }

    /// Seconds the client should wait before retrying. Only ever present
    /// on [`Error::RateLimited`].
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
