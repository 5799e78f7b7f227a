//! The FC (function-calling) orchestrator: the turn's inner state machine.
//!
//! `CALL_MODEL → DISPATCH_TOOL → RETURN_TOOL_RESULT → CALL_MODEL → … → EMIT`,
//! bounded by a round counter (`ABORT` on overrun). The orchestrator never
//! raises tool failures out to its caller — they're folded back into the
//! conversation as structured tool results so the model can recover. An LLM
//! call itself failing *is* raised, because there is no defined recovery
//! path for that — see [`hg_domain::error::Error::Internal`].

use std::sync::Arc;
use std::time::Instant;

use hg_backend::{BackendClient, BackendErrorKind, ToolRegistry};
use hg_domain::error::{Error, Result};
use hg_domain::session::{ToolCallStatus, ToolInvocationTrace};
use hg_domain::tool::{Message, Role};
use hg_domain::trace::TraceEvent;
use hg_providers::{ChatRequest, LlmProvider};

use super::cancel::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    CallModel,
    Abort,
}

pub struct RunContext<'a> {
    pub provider: &'a dyn LlmProvider,
    pub model: &'a str,
    pub registry: &'a ToolRegistry,
    pub backend: &'a BackendClient,
    pub bearer: &'a str,
    pub system_instruction: &'a str,
    pub history: Vec<Message>,
    pub user_utterance: &'a str,
    pub max_rounds: u32,
    pub session_id: &'a str,
    pub cancel: &'a CancelToken,
}

pub struct OrchestratorOutcome {
    pub reply: String,
    pub tool_trace: Vec<ToolInvocationTrace>,
    /// `true` when the run hit `MAX_ROUNDS` without the model emitting
    /// plain text — `reply` is then the locale apology, not model output.
    pub aborted: bool,
}

/// Drive one turn's worth of LLM/tool rounds to completion. Returns
/// `Err` only for a failure with no defined recovery path (the LLM call
/// itself erroring); tool failures and schema violations are always
/// absorbed into the conversation and returned as `Ok`.
pub async fn run(ctx: RunContext<'_>, apology: &str) -> Result<OrchestratorOutcome> {
    let tool_defs = Arc::new(ctx.registry.definitions());
    let mut messages = Vec::with_capacity(ctx.history.len() + 2);
    messages.push(Message::system(ctx.system_instruction));
    messages.extend(ctx.history.iter().cloned());
    messages.push(Message::user(ctx.user_utterance));

    let mut tool_trace = Vec::new();
    let mut state = State::CallModel;
    let mut rounds = 0u32;

    loop {
        match state {
            State::CallModel => {
                rounds += 1;
                if rounds > ctx.max_rounds {
                    state = State::Abort;
                    continue;
                }
                if ctx.cancel.is_cancelled() {
                    return Err(Error::Internal("turn cancelled".into()));
                }

                let started = Instant::now();
                let resp = ctx
                    .provider
                    .chat(&ChatRequest {
                        messages: messages.clone(),
                        tools: (*tool_defs).clone(),
                        temperature: None,
                        max_tokens: None,
                        json_mode: false,
                        model: Some(ctx.model.to_owned()),
                    })
                    .await
                    .map_err(|e| {
                        tracing::error!(session_id = %ctx.session_id, error = %e, "llm call failed during orchestration");
                        Error::Internal(format!("llm call failed: {e}"))
                    })?;
                TraceEvent::LlmRequest {
                    role: "main",
                    model: resp.model.clone(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    prompt_tokens: resp.usage.map(|u| u.prompt_tokens),
                    completion_tokens: resp.usage.map(|u| u.completion_tokens),
                }
                .emit();

                if resp.tool_calls.is_empty() {
                    // Plain text answer: EMIT. Tie-break handled in the
                    // branch below — a tool call always wins when present,
                    // so reaching here means there genuinely was none.
                    return Ok(OrchestratorOutcome {
                        reply: resp.content,
                        tool_trace,
                        aborted: false,
                    });
                }

                // Tool call(s) present: discard any accompanying text per
                // the tie-break rule and dispatch sequentially.
                messages.push(assistant_tool_call_message(&resp.tool_calls));

                let mut network_abort = false;
                for call in &resp.tool_calls {
                    if ctx.cancel.is_cancelled() {
                        return Err(Error::Internal("turn cancelled".into()));
                    }
                    if network_abort {
                        break;
                    }

                    let result_text = match ctx.registry.validate(&call.tool_name, &call.arguments) {
                        Err(detail) => {
                            serde_json::json!({"error": "INVALID_ARGS", "detail": detail}).to_string()
                        }
                        Ok(()) => {
                            let (path, body) = match ctx.registry.project(&call.tool_name, &call.arguments) {
                                Ok(pb) => pb,
                                Err(detail) => {
                                    let result = serde_json::json!({"error": "INVALID_ARGS", "detail": detail}).to_string();
                                    messages.push(Message::tool_result(&call.call_id, result));
                                    continue;
                                }
                            };
                            let decl = ctx.registry.get(&call.tool_name).expect("validated above");
                            let call_started = Instant::now();
                            let dispatch = ctx.backend.call(decl.method, &path, &body, ctx.bearer).await;
                            let duration_ms = call_started.elapsed().as_millis() as u64;

                            match dispatch {
                                Ok(value) => {
                                    tool_trace.push(ToolInvocationTrace {
                                        name: call.tool_name.clone(),
                                        status: ToolCallStatus::Ok,
                                        duration_ms,
                                    });
                                    TraceEvent::ToolDispatched { name: call.tool_name.clone(), status: "OK".into(), duration_ms }.emit();
                                    value.to_string()
                                }
                                Err(err) => {
                                    let status = match err.kind {
                                        BackendErrorKind::Timeout => ToolCallStatus::Timeout,
                                        _ => ToolCallStatus::Error,
                                    };
                                    tool_trace.push(ToolInvocationTrace {
                                        name: call.tool_name.clone(),
                                        status,
                                        duration_ms,
                                    });
                                    TraceEvent::BackendCallFailed { name: call.tool_name.clone(), error: err.to_string() }.emit();
                                    if err.kind == BackendErrorKind::Network {
                                        network_abort = true;
                                    }
                                    serde_json::json!({"error": format!("{:?}", err.kind), "detail": err.message}).to_string()
                                }
                            }
                        }
                    };
                    messages.push(Message::tool_result(&call.call_id, result_text));
                }

                state = State::CallModel;
            }
            State::Abort => {
                TraceEvent::TurnAborted { session_id: ctx.session_id.to_owned(), rounds }.emit();
                return Ok(OrchestratorOutcome {
                    reply: apology.to_owned(),
                    tool_trace,
                    aborted: true,
                });
            }
        }
    }
}

fn assistant_tool_call_message(calls: &[hg_domain::tool::ToolCall]) -> Message {
    use hg_domain::tool::{ContentPart, MessageContent};
    Message {
        role: Role::Assistant,
        content: MessageContent::Parts(
            calls
                .iter()
                .map(|c| ContentPart::ToolUse {
                    id: c.call_id.clone(),
                    name: c.tool_name.clone(),
                    input: c.arguments.clone(),
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hg_backend::ToolRegistry;
    use hg_domain::capability::LlmCapabilities;
    use hg_domain::tool::ToolCall;
    use hg_providers::ChatResponse;
    use std::sync::Mutex;

    struct ScriptedProvider {
        responses: Mutex<Vec<ChatResponse>>,
        calls: Mutex<u32>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<ChatResponse>) -> Self {
            Self { responses: Mutex::new(responses), calls: Mutex::new(0) }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(&self, _req: &ChatRequest) -> Result<ChatResponse> {
            let mut calls = self.calls.lock().unwrap();
            let mut responses = self.responses.lock().unwrap();
            let idx = *calls as usize;
            *calls += 1;
            responses.get(idx).cloned().ok_or_else(|| Error::Internal("script exhausted".into()))
        }
        fn capabilities(&self) -> &LlmCapabilities {
            static CAPS: LlmCapabilities = LlmCapabilities {
                supports_tools: hg_domain::capability::ToolSupport::StrictJson,
                supports_json_mode: false,
                context_window_tokens: None,
                max_output_tokens: None,
            };
            &CAPS
        }
        fn provider_id(&self) -> &str {
            "scripted"
        }
    }

    fn text_response(text: &str) -> ChatResponse {
        ChatResponse { content: text.into(), tool_calls: Vec::new(), usage: None, model: "fake".into(), finish_reason: Some("stop".into()) }
    }

    fn tool_call_response(name: &str, args: serde_json::Value) -> ChatResponse {
        ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall { call_id: "call_1".into(), tool_name: name.into(), arguments: args }],
            usage: None,
            model: "fake".into(),
            finish_reason: Some("tool_calls".into()),
        }
    }

    fn backend(base_url: &str) -> BackendClient {
        BackendClient::new(base_url, 1).unwrap()
    }

    #[tokio::test]
    async fn plain_text_response_emits_immediately() {
        let provider = ScriptedProvider::new(vec![text_response("Dzień dobry!")]);
        let registry = ToolRegistry::new();
        let backend = backend("http://127.0.0.1:1");
        let cancel = CancelToken::new();

        let outcome = run(
            RunContext {
                provider: &provider,
                model: "main",
                registry: &registry,
                backend: &backend,
                bearer: "Bearer tok",
                system_instruction: "sys",
                history: Vec::new(),
                user_utterance: "Cześć",
                max_rounds: 6,
                session_id: "s1",
                cancel: &cancel,
            },
            "apology",
        )
        .await
        .unwrap();

        assert_eq!(outcome.reply, "Dzień dobry!");
        assert!(outcome.tool_trace.is_empty());
        assert!(!outcome.aborted);
    }

    #[tokio::test]
    async fn invalid_tool_args_are_self_corrected_without_a_trace_entry() {
        let provider = ScriptedProvider::new(vec![
            tool_call_response("rooms_get", serde_json::json!({})),
            text_response("Sorry, I need a room id."),
        ]);
        let registry = ToolRegistry::new();
        let backend = backend("http://127.0.0.1:1");
        let cancel = CancelToken::new();

        let outcome = run(
            RunContext {
                provider: &provider,
                model: "main",
                registry: &registry,
                backend: &backend,
                bearer: "Bearer tok",
                system_instruction: "sys",
                history: Vec::new(),
                user_utterance: "tell me about the room",
                max_rounds: 6,
                session_id: "s1",
                cancel: &cancel,
            },
            "apology",
        )
        .await
        .unwrap();

        assert_eq!(outcome.reply, "Sorry, I need a room id.");
        // Schema violations never reach the backend — no trace entry.
        assert!(outcome.tool_trace.is_empty());
    }

    #[tokio::test]
    async fn exceeding_max_rounds_aborts_with_apology() {
        let responses: Vec<ChatResponse> = (0..10)
            .map(|_| tool_call_response("rooms_list", serde_json::json!({})))
            .collect();
        let provider = ScriptedProvider::new(responses);
        let registry = ToolRegistry::new();
        let backend = backend("http://127.0.0.1:1");
        let cancel = CancelToken::new();

        let outcome = run(
            RunContext {
                provider: &provider,
                model: "main",
                registry: &registry,
                backend: &backend,
                bearer: "Bearer tok",
                system_instruction: "sys",
                history: Vec::new(),
                user_utterance: "loop forever",
                max_rounds: 3,
                session_id: "s1",
                cancel: &cancel,
            },
            "Przepraszam, nie udało się tego załatwić.",
        )
        .await
        .unwrap();

        assert!(outcome.aborted);
        assert_eq!(outcome.reply, "Przepraszam, nie udało się tego załatwić.");
    }

    #[tokio::test]
    async fn cancelled_token_is_checked_before_the_next_model_call() {
        let provider = ScriptedProvider::new(vec![tool_call_response("rooms_list", serde_json::json!({})), text_response("never reached")]);
        let registry = ToolRegistry::new();
        let backend = backend("http://127.0.0.1:1");
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = run(
            RunContext {
                provider: &provider,
                model: "main",
                registry: &registry,
                backend: &backend,
                bearer: "Bearer tok",
                system_instruction: "sys",
                history: Vec::new(),
                user_utterance: "hi",
                max_rounds: 6,
                session_id: "s1",
                cancel: &cancel,
            },
            "apology",
        )
        .await;

        assert!(result.is_err());
    }
}
