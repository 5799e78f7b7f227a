//! Per-turn cancellation.
//!
//! Each `/chat` request gets one [`CancelToken`], checked at every
//! suspension point inside the FC orchestrator (before each LLM call and
//! before each backend dispatch). Wired to axum's connection-drop
//! detection in [`crate::api::chat`] via a guard that cancels on drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancels its token when dropped, unless [`CancelGuard::disarm`] was
/// called first. Held across the lifetime of a request future so that
/// the client disconnecting (which drops the future) cancels in-flight
/// LLM/backend/TTS calls instead of leaving them to run to completion.
pub struct CancelGuard {
    token: CancelToken,
    armed: bool,
}

impl CancelGuard {
    pub fn new(token: CancelToken) -> Self {
        Self { token, armed: true }
    }

    /// Call once the turn has completed normally so the guard's `Drop`
    /// does not cancel a token nobody is listening on anymore.
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_uncancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn guard_cancels_on_drop_when_armed() {
        let token = CancelToken::new();
        {
            let _guard = CancelGuard::new(token.clone());
        }
        assert!(token.is_cancelled());
    }

    #[test]
    fn disarmed_guard_does_not_cancel_on_drop() {
        let token = CancelToken::new();
        {
            let mut guard = CancelGuard::new(token.clone());
            guard.disarm();
        }
        assert!(!token.is_cancelled());
    }
}
