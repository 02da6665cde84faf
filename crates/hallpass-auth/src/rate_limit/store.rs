//! Rate limit storage trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use hallpass_core::config::RateLimitRule;
use hallpass_core::result::AppResult;
use hallpass_core::types::UserId;

use super::entry::{Attempt, EscalationPolicy, RateLimitEntry, RateLimitKey};

/// Backing store for rate limit counters.
///
/// Implementations must make [`RateLimitStore::record_attempt`] atomic per
/// key: two concurrent attempts for the same key must never both observe
/// the same count.
#[async_trait]
pub trait RateLimitStore: Send + Sync + std::fmt::Debug {
    /// Apply one attempt and return the entry as left by it.
    async fn record_attempt(
        &self,
        key: &RateLimitKey,
        now: DateTime<Utc>,
        rule: RateLimitRule,
        policy: &EscalationPolicy,
    ) -> AppResult<(RateLimitEntry, Attempt)>;

    /// Read an entry without counting an attempt.
    async fn get(&self, key: &RateLimitKey) -> AppResult<Option<RateLimitEntry>>;

    /// Remove one entry. Returns whether it existed.
    async fn remove(&self, key: &RateLimitKey) -> AppResult<bool>;

    /// Remove every entry for a user. Returns how many were removed.
    async fn remove_user(&self, user_id: UserId) -> AppResult<usize>;

    /// Remove entries whose window has elapsed at `now`.
    async fn remove_expired(&self, now: DateTime<Utc>) -> AppResult<usize>;
}
