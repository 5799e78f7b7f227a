use serde::Serialize;

/// Structured trace events emitted across the gateway crates.
///
/// Kept as a closed, tagged enum (rather than ad-hoc `tracing::info!` call
/// sites) so downstream log processors can rely on a stable event taxonomy.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionLoaded {
        session_id: String,
        found: bool,
    },
    SessionSaved {
        session_id: String,
        message_count: usize,
    },
    SessionStoreUnavailable {
        session_id: String,
        operation: &'static str,
        error: String,
    },
    RateLimited {
        session_id: String,
        retry_after: u64,
    },
    LanguageDetected {
        session_id: String,
        language: String,
        fallback: bool,
    },
    LlmRequest {
        role: &'static str,
        model: String,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    ToolDispatched {
        name: String,
        status: String,
        duration_ms: u64,
    },
    BackendCallFailed {
        name: String,
        error: String,
    },
    TtsUnavailable {
        session_id: String,
        error: String,
    },
    TurnAborted {
        session_id: String,
        rounds: u32,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "hg_event");
    }
}
