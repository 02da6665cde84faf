//! In-memory rate limit store for single-node deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use hallpass_core::config::RateLimitRule;
use hallpass_core::result::AppResult;
use hallpass_core::types::UserId;

use super::entry::{Attempt, EscalationPolicy, RateLimitEntry, RateLimitKey};
use super::store::RateLimitStore;

/// Counters held in a `DashMap`; each attempt runs under the key's shard lock.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    entries: DashMap<RateLimitKey, RateLimitEntry>,
}

impl MemoryRateLimitStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn record_attempt(
        &self,
        key: &RateLimitKey,
        now: DateTime<Utc>,
        rule: RateLimitRule,
        policy: &EscalationPolicy,
    ) -> AppResult<(RateLimitEntry, Attempt)> {
        let result = match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let attempt = occupied.get_mut().record(now, rule, policy);
                (*occupied.get(), attempt)
            }
            Entry::Vacant(vacant) => {
                let entry = RateLimitEntry::fresh(now, rule);
                vacant.insert(entry);
                (entry, Attempt::Allowed)
            }
        };
        Ok(result)
    }

    async fn get(&self, key: &RateLimitKey) -> AppResult<Option<RateLimitEntry>> {
        Ok(self.entries.get(key).map(|e| *e.value()))
    }

    async fn remove(&self, key: &RateLimitKey) -> AppResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn remove_user(&self, user_id: UserId) -> AppResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.user_id != user_id);
        Ok(before.saturating_sub(self.entries.len()))
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before.saturating_sub(self.entries.len()))
    }
}
