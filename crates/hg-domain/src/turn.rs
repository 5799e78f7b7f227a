//! The external per-turn contract: what the Turn Controller receives and
//! what it hands back to the HTTP layer. Distinct from [`crate::tool::Message`]
//! and [`crate::session::SessionMessage`] — those are the LLM-facing and
//! persisted shapes respectively; these are the `/chat` request/response
//! shapes once decoded off the wire.

use crate::session::{ToolInvocationTrace, Warning};

/// Inline request payloads (audio bytes, credentials excluded) above this
/// size are rejected with `PAYLOAD_TOO_LARGE` before any work is done.
pub const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AudioInput {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TurnInput {
    pub session_id: String,
    pub user_text: Option<String>,
    pub audio: Option<AudioInput>,
    pub voice_mode: bool,
    pub bearer_credential: String,
    pub trace_id: Option<String>,
}

impl TurnInput {
    /// `userText`/`audio` must not both be absent, and inline bytes
    /// (credential excluded) must stay within [`MAX_INLINE_BYTES`].
    pub fn validate(&self) -> Result<(), TurnInputError> {
        if self.user_text.is_none() && self.audio.is_none() {
            return Err(TurnInputError::MissingContent);
        }
        let inline_bytes = self.user_text.as_ref().map(|t| t.len()).unwrap_or(0)
            + self.audio.as_ref().map(|a| a.data.len()).unwrap_or(0);
        if inline_bytes > MAX_INLINE_BYTES {
            return Err(TurnInputError::TooLarge);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnInputError {
    MissingContent,
    TooLarge,
}

#[derive(Debug, Clone)]
pub struct AudioOutput {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TurnOutput {
    pub session_id: String,
    pub language: String,
    pub reply: String,
    pub audio: Option<AudioOutput>,
    pub tool_trace: Vec<ToolInvocationTrace>,
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TurnInput {
        TurnInput {
            session_id: "s1".into(),
            user_text: Some("hello".into()),
            audio: None,
            voice_mode: false,
            bearer_credential: "tok".into(),
            trace_id: None,
        }
    }

    #[test]
    fn valid_with_user_text_only() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_when_neither_text_nor_audio_present() {
        let mut input = base();
        input.user_text = None;
        assert_eq!(input.validate().unwrap_err(), TurnInputError::MissingContent);
    }

    #[test]
    fn rejects_oversized_inline_payload() {
        let mut input = base();
        input.user_text = Some("x".repeat(MAX_INLINE_BYTES + 1));
        assert_eq!(input.validate().unwrap_err(), TurnInputError::TooLarge);
    }

    #[test]
    fn accepts_payload_at_exact_boundary() {
        let mut input = base();
        input.user_text = Some("x".repeat(MAX_INLINE_BYTES));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn audio_only_is_valid() {
        let mut input = base();
        input.user_text = None;
        input.audio = Some(AudioInput { mime_type: "audio/wav".into(), data: vec![0u8; 10] });
        assert!(input.validate().is_ok());
    }
}
