use std::sync::Arc;

use crate::runtime::TurnController;

/// Shared application state passed to every API handler. Thin by design —
/// almost everything lives behind the [`TurnController`], which itself
/// holds the session store, rate limiter, tool registry, backend client,
/// LLM provider registry, and optional TTS renderer.
#[derive(Clone)]
pub struct AppState {
    pub turns: Arc<TurnController>,
}
