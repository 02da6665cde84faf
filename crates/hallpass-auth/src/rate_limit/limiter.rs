//! The rate limiter service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use hallpass_core::config::{RateLimitConfig, RateLimitRule};
use hallpass_core::error::AppError;
use hallpass_core::events::{DomainEvent, EventBus, SecurityEvent};
use hallpass_core::result::AppResult;
use hallpass_core::types::UserId;

use super::entry::{Attempt, EscalationPolicy, RateLimitKey};
use super::store::RateLimitStore;

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Configured maximum per window. `u32::MAX` for unlimited operations.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// When the window (or ban) ends.
    pub reset_at: DateTime<Utc>,
    /// Whether this check extended the ban.
    pub escalated: bool,
}

impl RateLimitDecision {
    fn unlimited(now: DateTime<Utc>) -> Self {
        Self {
            allowed: true,
            limit: u32::MAX,
            remaining: u32::MAX,
            reset_at: now,
            escalated: false,
        }
    }

    fn fail_open(now: DateTime<Utc>, rule: RateLimitRule) -> Self {
        Self {
            allowed: true,
            limit: rule.max_requests,
            remaining: rule.max_requests,
            reset_at: now + rule.window(),
            escalated: false,
        }
    }
}

/// Read-only view of a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    /// Attempts counted in the live window.
    pub count: u32,
    /// Configured maximum per window.
    pub limit: u32,
    /// Requests left in the live window.
    pub remaining: u32,
    /// When the live window ends; `None` if there is none.
    pub reset_at: Option<DateTime<Utc>>,
}

/// Per-(user, operation) fixed-window limiter with abuse escalation.
///
/// Fails open: if the store errors, the request is allowed and a warning
/// is logged. Operations without a configured rule are never limited.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    policy: EscalationPolicy,
    store: Arc<dyn RateLimitStore>,
    events: EventBus,
}

impl RateLimiter {
    /// Create a limiter over `store`, publishing escalations on `events`.
    pub fn new(config: RateLimitConfig, store: Arc<dyn RateLimitStore>, events: EventBus) -> Self {
        Self {
            policy: EscalationPolicy::from_config(&config),
            config: Arc::new(config),
            store,
            events,
        }
    }

    /// Count one attempt by `user_id` at `operation`.
    pub async fn check(&self, user_id: UserId, operation: &str) -> RateLimitDecision {
        self.check_at(user_id, operation, Utc::now()).await
    }

    /// Count one attempt at an explicit time.
    pub async fn check_at(
        &self,
        user_id: UserId,
        operation: &str,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let Some(rule) = self.config.rule(operation) else {
            debug!(operation = %operation, "No rate limit configured for operation");
            return RateLimitDecision::unlimited(now);
        };

        let key = RateLimitKey::new(user_id, operation);
        let (entry, attempt) = match self
            .store
            .record_attempt(&key, now, rule, &self.policy)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    operation = %operation,
                    error = %e,
                    "Rate limit store failed, allowing request"
                );
                return RateLimitDecision::fail_open(now, rule);
            }
        };

        let escalated = matches!(attempt, Attempt::Denied { escalated: true });
        if escalated {
            warn!(
                user_id = %user_id,
                operation = %operation,
                attempts = entry.count,
                reset_at = %entry.window_reset_at,
                "Rapid requests while rate limited, ban extended"
            );
            self.events.publish(DomainEvent::security(
                Some(user_id.into_uuid()),
                SecurityEvent::RateLimitEscalated {
                    user_id: user_id.into_uuid(),
                    operation: operation.to_string(),
                    attempts: entry.count,
                    reset_at: entry.window_reset_at,
                },
            ));
        } else if !attempt.is_allowed() {
            warn!(
                user_id = %user_id,
                operation = %operation,
                reset_at = %entry.window_reset_at,
                "Rate limit exceeded"
            );
        }

        RateLimitDecision {
            allowed: attempt.is_allowed(),
            limit: rule.max_requests,
            remaining: entry.remaining(rule),
            reset_at: entry.window_reset_at,
            escalated,
        }
    }

    /// Count one attempt and turn a denial into a `RateLimit` error.
    pub async fn enforce(&self, user_id: UserId, operation: &str) -> AppResult<RateLimitDecision> {
        let decision = self.check(user_id, operation).await;
        if decision.allowed {
            Ok(decision)
        } else {
            Err(AppError::rate_limited(
                format!("Too many {operation} requests, try again after {}", decision.reset_at),
                decision.reset_at,
            ))
        }
    }

    /// Current counter for `user_id` at `operation` without counting an attempt.
    ///
    /// Returns `None` for operations with no configured rule.
    pub async fn status(&self, user_id: UserId, operation: &str) -> AppResult<Option<RateLimitStatus>> {
        self.status_at(user_id, operation, Utc::now()).await
    }

    /// [`RateLimiter::status`] at an explicit time.
    pub async fn status_at(
        &self,
        user_id: UserId,
        operation: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<RateLimitStatus>> {
        let Some(rule) = self.config.rule(operation) else {
            return Ok(None);
        };
        let entry = self
            .store
            .get(&RateLimitKey::new(user_id, operation))
            .await?
            .filter(|e| !e.is_expired(now));

        Ok(Some(match entry {
            Some(e) => RateLimitStatus {
                count: e.count,
                limit: rule.max_requests,
                remaining: e.remaining(rule),
                reset_at: Some(e.window_reset_at),
            },
            None => RateLimitStatus {
                count: 0,
                limit: rule.max_requests,
                remaining: rule.max_requests,
                reset_at: None,
            },
        }))
    }

    /// Clear one operation's counter, or all of the user's counters.
    pub async fn reset(&self, user_id: UserId, operation: Option<&str>) -> AppResult<usize> {
        let removed = match operation {
            Some(op) => usize::from(self.store.remove(&RateLimitKey::new(user_id, op)).await?),
            None => self.store.remove_user(user_id).await?,
        };
        info!(
            user_id = %user_id,
            operation = operation.unwrap_or("*"),
            removed,
            "Rate limit reset"
        );
        Ok(removed)
    }

    /// Drop every counter whose window has elapsed.
    pub async fn cleanup(&self) -> AppResult<usize> {
        self.cleanup_at(Utc::now()).await
    }

    /// [`RateLimiter::cleanup`] at an explicit time.
    pub async fn cleanup_at(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let removed = self.store.remove_expired(now).await?;
        if removed > 0 {
            info!(removed, "Swept expired rate limit entries");
        } else {
            debug!("No expired rate limit entries");
        }
        Ok(removed)
    }
}
