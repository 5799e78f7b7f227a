//! Redis-backed session store.
//!
//! Keys are namespaced `sessions:<id>`. Every `load`/`save`/`touch` refreshes
//! the TTL (sliding window). The store never raises on the hot path: any
//! Redis error is caught, logged via [`TraceEvent::SessionStoreUnavailable`],
//! and treated as absence so the turn can proceed without history.

use hg_domain::session::Session;
use hg_domain::trace::TraceEvent;
use redis::AsyncCommands;

fn session_key(id: &str) -> String {
    format!("sessions:{id}")
}

pub struct SessionStore {
    manager: redis::aio::ConnectionManager,
    ttl_secs: u64,
}

impl SessionStore {
    pub async fn connect(redis_url: &str, ttl_min: u64) -> redis::RedisResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self {
            manager,
            ttl_secs: ttl_min * 60,
        })
    }

    /// Returns the stored session, or `None` on absence or store failure.
    /// Never propagates an error.
    pub async fn load(&self, id: &str) -> Option<Session> {
        let mut conn = self.manager.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(session_key(id)).await;
        match result {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    TraceEvent::SessionLoaded { session_id: id.to_owned(), found: true }.emit();
                    Some(session)
                }
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "session payload corrupt, treating as absent");
                    None
                }
            },
            Ok(None) => {
                TraceEvent::SessionLoaded { session_id: id.to_owned(), found: false }.emit();
                None
            }
            Err(e) => {
                TraceEvent::SessionStoreUnavailable {
                    session_id: id.to_owned(),
                    operation: "load",
                    error: e.to_string(),
                }
                .emit();
                None
            }
        }
    }

    /// Upsert the session with a refreshed TTL. Errors are logged, never
    /// returned — a save failure degrades the next turn to absence, it
    /// never aborts the current one.
    pub async fn save(&self, id: &str, session: &Session) {
        let raw = match serde_json::to_string(session) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "failed to serialize session");
                return;
            }
        };
        let mut conn = self.manager.clone();
        let result: redis::RedisResult<()> = conn.set_ex(session_key(id), raw, self.ttl_secs).await;
        match result {
            Ok(()) => {
                TraceEvent::SessionSaved { session_id: id.to_owned(), message_count: session.messages.len() }.emit();
            }
            Err(e) => {
                TraceEvent::SessionStoreUnavailable {
                    session_id: id.to_owned(),
                    operation: "save",
                    error: e.to_string(),
                }
                .emit();
            }
        }
    }

    /// Refresh TTL without mutating the value.
    pub async fn touch(&self, id: &str) {
        let mut conn = self.manager.clone();
        let result: redis::RedisResult<bool> = conn.expire(session_key(id), self.ttl_secs as i64).await;
        if let Err(e) = result {
            TraceEvent::SessionStoreUnavailable {
                session_id: id.to_owned(),
                operation: "touch",
                error: e.to_string(),
            }
            .emit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_is_namespaced() {
        assert_eq!(session_key("abc-123"), "sessions:abc-123");
    }
}
