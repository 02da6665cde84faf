//! Rate limiting configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Well-known operation names used as rate-limit keys.
pub mod operations {
    /// Creating a new pass.
    pub const PASS_CREATION: &str = "pass_creation";
    /// Any transition or update on an existing pass.
    pub const PASS_UPDATE: &str = "pass_update";
    /// Staff login attempts.
    pub const LOGIN: &str = "login";
}

/// Fixed-window limit for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    /// Maximum requests allowed per window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_seconds: u64,
}

impl RateLimitRule {
    /// Create a rule.
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }

    /// Window length as a chrono duration.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_seconds as i64)
    }
}

/// Rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// Operation name → limit.
    #[serde(default = "default_rules")]
    pub rules: HashMap<String, RateLimitRule>,
    /// Two attempts closer together than this (while already limited)
    /// are treated as automated abuse and extend the ban.
    #[serde(default = "default_abuse_gap_ms")]
    #[validate(range(min = 1, max = 60000))]
    pub abuse_gap_ms: u64,
    /// Upper bound on how far an escalated ban may extend.
    #[serde(default = "default_max_ban_seconds")]
    #[validate(range(min = 60))]
    pub max_ban_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            abuse_gap_ms: default_abuse_gap_ms(),
            max_ban_seconds: default_max_ban_seconds(),
        }
    }
}

impl RateLimitConfig {
    /// Look up the rule for an operation.
    pub fn rule(&self, operation: &str) -> Option<RateLimitRule> {
        self.rules.get(operation).copied()
    }

    /// Reject rules that could never allow a request.
    pub fn check_rules(&self) -> Result<(), AppError> {
        for (operation, rule) in &self.rules {
            if rule.max_requests == 0 || rule.window_seconds == 0 {
                return Err(AppError::configuration(format!(
                    "Rate limit rule '{operation}' must have non-zero max_requests and window_seconds"
                )));
            }
        }
        Ok(())
    }
}

fn default_rules() -> HashMap<String, RateLimitRule> {
    let mut rules = HashMap::new();
    rules.insert(operations::PASS_CREATION.to_string(), RateLimitRule::new(5, 60));
    rules.insert(operations::PASS_UPDATE.to_string(), RateLimitRule::new(10, 60));
    rules.insert(operations::LOGIN.to_string(), RateLimitRule::new(5, 300));
    rules
}

fn default_abuse_gap_ms() -> u64 {
    1000
}

fn default_max_ban_seconds() -> u64 {
    86_400
}
