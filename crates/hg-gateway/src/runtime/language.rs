//! One-shot language detection, invoked only when a session has no cached
//! `language` yet (see [`super::turn`]).

use hg_domain::session::Warning;
use hg_domain::tool::Message;
use hg_domain::trace::TraceEvent;
use hg_providers::{ChatRequest, LlmProvider};
use regex::Regex;

const DEFAULT_LANGUAGE: &str = "en-US";
const DIRECTIVE: &str =
    "Return only a BCP-47 language tag (e.g. en-US, pl-PL) for the dominant language of the user's text. Respond with nothing else.";

pub struct LanguageDetector {
    tag_pattern: Regex,
}

impl LanguageDetector {
    pub fn new() -> Self {
        Self {
            // ^[a-z]{2,3}(-[A-Z]{2})?$ per the detector's validation contract.
            tag_pattern: Regex::new(r"^[a-z]{2,3}(-[A-Z]{2})?$").expect("static regex"),
        }
    }

    /// Detect the dominant language of `text` via `provider`/`model`. Never
    /// fails the caller: LLM errors and malformed responses fall back to
    /// [`DEFAULT_LANGUAGE`] plus a warning.
    pub async fn detect(
        &self,
        provider: &dyn LlmProvider,
        model: &str,
        session_id: &str,
        text: &str,
    ) -> (String, Option<Warning>) {
        let req = ChatRequest {
            messages: vec![Message::system(DIRECTIVE), Message::user(text)],
            tools: Vec::new(),
            temperature: Some(0.0),
            max_tokens: Some(16),
            json_mode: false,
            model: Some(model.to_owned()),
        };

        let resp = match provider.chat(&req).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "language detection LLM call failed");
                return self.fallback(session_id, "llm_error");
            }
        };

        let candidate = resp.content.trim();
        if self.tag_pattern.is_match(candidate) {
            TraceEvent::LanguageDetected {
                session_id: session_id.to_owned(),
                language: candidate.to_owned(),
                fallback: false,
            }
            .emit();
            (candidate.to_owned(), None)
        } else {
            tracing::warn!(session_id = %session_id, response = %candidate, "language detector returned an invalid tag");
            self.fallback(session_id, "invalid_tag")
        }
    }

    fn fallback(&self, session_id: &str, reason: &str) -> (String, Option<Warning>) {
        TraceEvent::LanguageDetected {
            session_id: session_id.to_owned(),
            language: DEFAULT_LANGUAGE.to_owned(),
            fallback: true,
        }
        .emit();
        (
            DEFAULT_LANGUAGE.to_owned(),
            Some(Warning {
                code: "LANGUAGE_DETECTION_FALLBACK".into(),
                message: format!("language detection fell back to {DEFAULT_LANGUAGE} ({reason})"),
            }),
        )
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hg_domain::capability::LlmCapabilities;
    use hg_domain::error::Result;
    use hg_providers::ChatResponse;
    use std::sync::Mutex;

    struct FakeProvider {
        reply: Mutex<String>,
        calls: Mutex<u32>,
    }

    impl FakeProvider {
        fn new(reply: &str) -> Self {
            Self { reply: Mutex::new(reply.to_owned()), calls: Mutex::new(0) }
        }
    }

    #[async_trait]
    impl LlmProvider for FakeProvider {
        async fn chat(&self, _req: &ChatRequest) -> Result<ChatResponse> {
            *self.calls.lock().unwrap() += 1;
            Ok(ChatResponse {
                content: self.reply.lock().unwrap().clone(),
                tool_calls: Vec::new(),
                usage: None,
                model: "fake-detect".into(),
                finish_reason: Some("stop".into()),
            })
        }
        fn capabilities(&self) -> &LlmCapabilities {
            static CAPS: LlmCapabilities = LlmCapabilities {
                supports_tools: hg_domain::capability::ToolSupport::None,
                supports_json_mode: false,
                context_window_tokens: None,
                max_output_tokens: None,
            };
            &CAPS
        }
        fn provider_id(&self) -> &str {
            "fake"
        }
    }

    #[tokio::test]
    async fn valid_tag_passes_through() {
        let provider = FakeProvider::new("pl-PL");
        let detector = LanguageDetector::new();
        let (lang, warning) = detector.detect(&provider, "detect-model", "s1", "Cześć").await;
        assert_eq!(lang, "pl-PL");
        assert!(warning.is_none());
    }

    #[tokio::test]
    async fn bare_two_letter_tag_is_valid() {
        let provider = FakeProvider::new("en");
        let detector = LanguageDetector::new();
        let (lang, warning) = detector.detect(&provider, "detect-model", "s1", "hi").await;
        assert_eq!(lang, "en");
        assert!(warning.is_none());
    }

    #[tokio::test]
    async fn garbage_response_falls_back_to_default_with_warning() {
        let provider = FakeProvider::new("I am not sure, maybe French?");
        let detector = LanguageDetector::new();
        let (lang, warning) = detector.detect(&provider, "detect-model", "s1", "bonjour").await;
        assert_eq!(lang, "en-US");
        assert!(warning.is_some());
        assert_eq!(warning.unwrap().code, "LANGUAGE_DETECTION_FALLBACK");
    }

    #[tokio::test]
    async fn trims_surrounding_whitespace_before_validating() {
        let provider = FakeProvider::new("  de-DE\n");
        let detector = LanguageDetector::new();
        let (lang, warning) = detector.detect(&provider, "detect-model", "s1", "Hallo").await;
        assert_eq!(lang, "de-DE");
        assert!(warning.is_none());
    }
}
