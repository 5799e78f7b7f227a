//! Per-session sliding-window rate limiter.
//!
//! In-process only (no external backing store to fail): a session id maps
//! to a [`RateBucket`] behind a lock. There is nothing to fail open from,
//! but the shape mirrors the store's fail-soft posture so a future
//! externalized limiter can swap in without changing the caller contract.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hg_domain::session::RateBucket;
use parking_lot::RwLock;

const WINDOW_SECS: i64 = 60;

pub struct Admission {
    pub allowed: bool,
    pub retry_after: u64,
}

pub struct RateLimiter {
    limit_per_min: u32,
    buckets: RwLock<HashMap<String, RateBucket>>,
}

impl RateLimiter {
    pub fn new(limit_per_min: u32) -> Self {
        Self {
            limit_per_min,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Admit or reject a turn for `session_id`, rolling the window over if
    /// `now` is ≥ 60s past the bucket's `window_start`.
    pub fn admit(&self, session_id: &str, now: DateTime<Utc>) -> Admission {
        let mut buckets = self.buckets.write();
        let bucket = buckets.entry(session_id.to_owned()).or_insert(RateBucket {
            window_start: now,
            count: 0,
        });

        if (now - bucket.window_start).num_seconds() >= WINDOW_SECS {
            bucket.window_start = now;
            bucket.count = 0;
        }

        bucket.count += 1;

        if bucket.count > self.limit_per_min {
            let elapsed = (now - bucket.window_start).num_seconds().max(0);
            let retry_after = (WINDOW_SECS - elapsed).max(0) as u64;
            Admission { allowed: false, retry_after }
        } else {
            Admission { allowed: true, retry_after: 0 }
        }
    }

    /// Drop buckets whose window has been stale for longer than one full
    /// window, bounding memory for sessions that never return.
    pub fn sweep(&self, now: DateTime<Utc>) {
        let mut buckets = self.buckets.write();
        buckets.retain(|_, b| (now - b.window_start).num_seconds() < WINDOW_SECS * 2);
    }
}
