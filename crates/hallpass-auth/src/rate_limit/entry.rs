//! Fixed-window counter state and the per-attempt transition.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use hallpass_core::config::{RateLimitConfig, RateLimitRule};
use hallpass_core::types::UserId;

/// Counter key: one window per user per operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimitKey {
    /// The throttled user.
    pub user_id: UserId,
    /// Operation name, e.g. `"pass_creation"`.
    pub operation: String,
}

impl RateLimitKey {
    /// Build a key.
    pub fn new(user_id: UserId, operation: impl Into<String>) -> Self {
        Self {
            user_id,
            operation: operation.into(),
        }
    }
}

/// How hard the limiter pushes back on clients that keep hammering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Attempts closer together than this while limited count as abuse.
    pub abuse_gap: Duration,
    /// Longest a ban may be pushed out from the current attempt.
    pub max_ban: Duration,
}

impl EscalationPolicy {
    /// Derive the policy from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            abuse_gap: Duration::milliseconds(config.abuse_gap_ms as i64),
            max_ban: Duration::seconds(config.max_ban_seconds as i64),
        }
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

/// What happened to one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// Counted and let through.
    Allowed,
    /// Refused. `escalated` is set when the window was pushed out.
    Denied {
        /// Whether this attempt extended the ban.
        escalated: bool,
    },
}

impl Attempt {
    /// Whether the attempt was let through.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Counter state for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    /// Attempts counted in the current window.
    pub count: u32,
    /// When the current window (or ban) ends.
    pub window_reset_at: DateTime<Utc>,
    /// The most recent attempt, allowed or not.
    pub last_attempt_at: DateTime<Utc>,
}

impl RateLimitEntry {
    /// A new window holding one attempt.
    pub fn fresh(now: DateTime<Utc>, rule: RateLimitRule) -> Self {
        Self {
            count: 1,
            window_reset_at: now + rule.window(),
            last_attempt_at: now,
        }
    }

    /// Whether the window has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_reset_at
    }

    /// Attempts left before the limit is hit.
    pub fn remaining(&self, rule: RateLimitRule) -> u32 {
        rule.max_requests.saturating_sub(self.count)
    }

    /// Apply one attempt at `now`.
    ///
    /// An elapsed window is replaced. Under the limit the attempt is
    /// counted. At the limit the attempt is refused; if it follows the
    /// previous attempt within the abuse gap, the remaining window is
    /// doubled (capped at `max_ban` from now).
    pub fn record(
        &mut self,
        now: DateTime<Utc>,
        rule: RateLimitRule,
        policy: &EscalationPolicy,
    ) -> Attempt {
        if self.is_expired(now) {
            *self = Self::fresh(now, rule);
            return Attempt::Allowed;
        }

        let gap = now - self.last_attempt_at;
        self.last_attempt_at = now;

        if self.count < rule.max_requests {
            self.count += 1;
            return Attempt::Allowed;
        }

        if gap >= policy.abuse_gap {
            return Attempt::Denied { escalated: false };
        }

        let remaining = self.window_reset_at - now;
        let doubled = now + remaining * 2;
        let extended = doubled.min(now + policy.max_ban).max(self.window_reset_at);
        let escalated = extended > self.window_reset_at;
        self.window_reset_at = extended;
        Attempt::Denied { escalated }
    }
}
