//! Turn Controller — the per-turn coordinator. Composes the rate limiter,
//! session store, language detector, FC orchestrator, and TTS renderer into
//! the sequence described in SPEC_FULL.md §4.7.
//!
//! Side effects after the orchestrator returns (history append, session
//! save, TTS) are all best-effort: a failure there must never change the
//! reply already computed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::Instrument;

use hg_backend::{BackendClient, ToolRegistry};
use hg_domain::capability::ModelRole;
use hg_domain::config::Config;
use hg_domain::error::{Error, Result};
use hg_domain::session::{Session, Warning};
use hg_domain::turn::{TurnInput, TurnInputError, TurnOutput};
use hg_providers::ProviderRegistry;
use hg_sessions::{RateLimiter, SessionStore};
use hg_tts::{TtsRenderer, TtsRequest};

use super::cancel::CancelToken;
use super::language::LanguageDetector;
use super::orchestrator::{self, RunContext};
use super::{apology_for, build_system_instruction, history_to_messages};

pub struct TurnController {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub limiter: Arc<RateLimiter>,
    pub providers: Arc<ProviderRegistry>,
    pub registry: Arc<ToolRegistry>,
    pub backend: Arc<BackendClient>,
    pub tts: Option<Arc<dyn TtsRenderer>>,
    pub language_detector: LanguageDetector,
}

const AUDIO_ONLY_PLACEHOLDER: &str =
    "[voice message received — audio transcription is not available in this version]";

impl TurnController {
    pub async fn handle(&self, input: TurnInput, cancel: &CancelToken) -> Result<TurnOutput> {
        let span = tracing::info_span!("chat_turn", session_id = %input.session_id, trace_id = input.trace_id.as_deref().unwrap_or(""));
        self.handle_inner(input, cancel).instrument(span).await
    }

    async fn handle_inner(&self, input: TurnInput, cancel: &CancelToken) -> Result<TurnOutput> {
        // Step 1: validate.
        input.validate().map_err(|e| match e {
            TurnInputError::MissingContent => Error::BadRequest("one of message/audio is required".into()),
            TurnInputError::TooLarge => Error::PayloadTooLarge,
        })?;

        // Step 2: rate limit.
        let now = Utc::now();
        let admission = self.limiter.admit(&input.session_id, now);
        if !admission.allowed {
            hg_domain::trace::TraceEvent::RateLimited { session_id: input.session_id.clone(), retry_after: admission.retry_after }.emit();
            return Err(Error::RateLimited { retry_after: admission.retry_after });
        }

        // Step 3: load session.
        let mut session = self.sessions.load(&input.session_id).await.unwrap_or_else(|| Session::new(now));

        // Step 4: resolve language.
        let user_text_for_turn = input
            .user_text
            .clone()
            .unwrap_or_else(|| AUDIO_ONLY_PLACEHOLDER.to_owned());

        let mut warnings: Vec<Warning> = Vec::new();
        let language = match &session.language {
            Some(lang) => lang.clone(),
            None => {
                if let Some(text) = &input.user_text {
                    let model = self.providers.model_for_role(ModelRole::Detect)?;
                    let (lang, warning) = self
                        .language_detector
                        .detect(&*self.providers.provider(), model, &input.session_id, text)
                        .await;
                    if let Some(w) = warning {
                        warnings.push(w);
                    }
                    lang
                } else {
                    "en-US".to_owned()
                }
            }
        };

        // Step 5: run the FC orchestrator, bounded by the coarse turn deadline.
        let apology = apology_for(&language);
        let system_instruction = build_system_instruction(&language);
        let history = history_to_messages(&session);
        let model = self.providers.model_for_role(ModelRole::Main)?.to_owned();
        let provider = self.providers.provider();

        let run_future = orchestrator::run(
            RunContext {
                provider: &*provider,
                model: &model,
                registry: &self.registry,
                backend: &self.backend,
                bearer: &input.bearer_credential,
                system_instruction: &system_instruction,
                history,
                user_utterance: &user_text_for_turn,
                max_rounds: self.config.max_fc_rounds,
                session_id: &input.session_id,
                cancel,
            },
            apology,
        );

        let outcome = tokio::time::timeout(Duration::from_secs(self.config.turn_deadline_sec), run_future)
            .await
            .map_err(|_| Error::Timeout("turn deadline exceeded".into()))??;

        // Step 6: append to history, trim, persist (best-effort).
        session.append_turn(&user_text_for_turn, &outcome.reply, now, self.config.session_max_messages);
        session.language = Some(language.clone());
        self.sessions.save(&input.session_id, &session).await;

        // Step 7: optional TTS.
        let mut audio = None;
        if input.voice_mode {
            match &self.tts {
                Some(renderer) => match renderer.synthesize(&TtsRequest::new(outcome.reply.clone())).await {
                    Ok(resp) => audio = Some(hg_domain::turn::AudioOutput { mime_type: resp.mime_type, data: resp.audio }),
                    Err(e) => {
                        hg_domain::trace::TraceEvent::TtsUnavailable { session_id: input.session_id.clone(), error: e.to_string() }.emit();
                        warnings.push(Warning { code: "TTS_UNAVAILABLE".into(), message: "speech synthesis failed".into() });
                    }
                },
                None => {
                    warnings.push(Warning { code: "TTS_UNAVAILABLE".into(), message: "no TTS provider configured".into() });
                }
            }
        }

        Ok(TurnOutput {
            session_id: input.session_id,
            language,
            reply: outcome.reply,
            audio,
            tool_trace: outcome.tool_trace,
            warnings,
        })
    }
}
