//! Optional text-to-speech rendering for the gateway's `voiceMode` replies.
//!
//! Failures here are never fatal to a turn — callers catch the `Err` and
//! degrade to a text-only reply plus a `TTS_UNAVAILABLE` warning.

pub mod openai_compat;
pub mod traits;

pub use openai_compat::OpenAiCompatTts;
pub use traits::{TtsRenderer, TtsRequest, TtsResponse};
