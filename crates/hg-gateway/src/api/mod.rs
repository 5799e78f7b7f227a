pub mod chat;
pub mod error;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Inline audio is base64, which inflates raw bytes by ~4/3; give the body
/// limit enough headroom over [`hg_domain::turn::MAX_INLINE_BYTES`] that a
/// 20 MiB payload survives transport before [`TurnInput::validate`] gets
/// the precise, decoded-byte answer.
const HTTP_BODY_LIMIT_BYTES: usize = hg_domain::turn::MAX_INLINE_BYTES * 2;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/chat", post(chat::chat))
        .layer(DefaultBodyLimit::max(HTTP_BODY_LIMIT_BYTES))
        .with_state(state)
}
