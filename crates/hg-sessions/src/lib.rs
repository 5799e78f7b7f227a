//! Session state and rate limiting for the gateway.
//!
//! A Redis-backed [`SessionStore`] owns per-session history and cached
//! language; an in-process [`RateLimiter`] enforces a sliding per-session
//! turn rate.

pub mod limiter;
pub mod store;

pub use limiter::{Admission, RateLimiter};
pub use store::SessionStore;
