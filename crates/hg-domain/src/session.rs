//! Data shapes owned by the session store: the per-session document, the
//! rate-limiter bucket, and the small observability records handed back to
//! callers (tool trace, warnings).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One turn's worth of persisted conversation history. Tool calls and tool
/// results never appear here — they live only inside one turn's
/// orchestration (see the FC orchestrator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: HistoryRole,
    pub content: String,
    pub ts: DateTime<Utc>,
}

/// The persisted, per-session document. Keyed externally by the client's
/// opaque session id (`sessions:<id>` in the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub created_at: DateTime<Utc>,
    /// BCP-47 tag detected on the first turn. Immutable once set.
    pub language: Option<String>,
    /// Oldest first.
    pub messages: Vec<SessionMessage>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            language: None,
            messages: Vec::new(),
        }
    }

    /// Append the user utterance and the assistant reply, then trim the
    /// history to `max_messages` (oldest dropped first).
    pub fn append_turn(&mut self, user_text: &str, reply: &str, now: DateTime<Utc>, max_messages: usize) {
        self.messages.push(SessionMessage {
            role: HistoryRole::User,
            content: user_text.to_owned(),
            ts: now,
        });
        self.messages.push(SessionMessage {
            role: HistoryRole::Assistant,
            content: reply.to_owned(),
            ts: now,
        });
        if self.messages.len() > max_messages {
            let excess = self.messages.len() - max_messages;
            self.messages.drain(0..excess);
        }
    }
}

/// A per-session sliding-window rate-limit counter.
#[derive(Debug, Clone, Copy)]
pub struct RateBucket {
    pub window_start: DateTime<Utc>,
    pub count: u32,
}

/// Observability record for one tool dispatch. Never carries argument
/// values or backend payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocationTrace {
    pub name: String,
    pub status: ToolCallStatus,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ToolCallStatus {
    Ok,
    Error,
    Timeout,
}

/// A non-fatal degradation surfaced to the client alongside a successful
/// reply (e.g. TTS unavailable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn new_session_has_no_language_and_no_messages() {
        let s = Session::new(now());
        assert!(s.language.is_none());
        assert!(s.messages.is_empty());
    }

    #[test]
    fn append_turn_adds_two_messages_in_order() {
        let mut s = Session::new(now());
        s.append_turn("hi", "hello", now(), 20);
        assert_eq!(s.messages.len(), 2);
        assert_eq!(s.messages[0].role, HistoryRole::User);
        assert_eq!(s.messages[0].content, "hi");
        assert_eq!(s.messages[1].role, HistoryRole::Assistant);
        assert_eq!(s.messages[1].content, "hello");
    }

    #[test]
    fn append_turn_trims_oldest_first_at_boundary() {
        let mut s = Session::new(now());
        for i in 0..15 {
            s.append_turn(&format!("u{i}"), &format!("a{i}"), now(), 20);
        }
        assert_eq!(s.messages.len(), 20);
        // 15 turns = 30 raw messages, trimmed to 20: oldest 10 dropped.
        assert_eq!(s.messages[0].content, "u5");
    }

    #[test]
    fn append_turn_never_exceeds_max_messages() {
        let mut s = Session::new(now());
        for i in 0..50 {
            s.append_turn(&format!("u{i}"), &format!("a{i}"), now(), 20);
            assert!(s.messages.len() <= 20);
        }
    }
}
