use hg_domain::error::Result;

/// Provider-agnostic speech synthesis request. Fields beyond `text` are
/// optional hints — an adapter that can't honor one (e.g. `speed`) just
/// ignores it rather than erroring.
#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub text: String,
    pub voice_id: Option<String>,
    /// Requested audio container, e.g. `"mp3"`. Adapters may ignore this
    /// and always return their native format.
    pub format: Option<String>,
}

impl TtsRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: None,
            format: None,
        }
    }

    pub fn voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TtsResponse {
    pub audio: Vec<u8>,
    pub mime_type: String,
}

/// Trait every TTS adapter implements. The gateway only ever calls this
/// after `EMIT` — synthesis failures are caught by the caller and
/// downgraded to a `warnings` entry, never an `Err` that reaches the
/// client (see [`hg_domain::error::Error`]).
#[async_trait::async_trait]
pub trait TtsRenderer: Send + Sync {
    async fn synthesize(&self, req: &TtsRequest) -> Result<TtsResponse>;
}
