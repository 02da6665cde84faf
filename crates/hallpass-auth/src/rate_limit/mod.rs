//! Per-user, per-operation request throttling.
//!
//! Counters live behind the [`RateLimitStore`] trait so the limiter can
//! be backed by a shared store in multi-node deployments. The store must
//! apply each attempt atomically per key.

pub mod entry;
pub mod limiter;
pub mod memory;
pub mod store;

pub use entry::{Attempt, EscalationPolicy, RateLimitEntry, RateLimitKey};
pub use limiter::{RateLimitDecision, RateLimitStatus, RateLimiter};
pub use memory::MemoryRateLimitStore;
pub use store::RateLimitStore;
