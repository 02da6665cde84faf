//! # hallpass-auth
//!
//! Gatekeeping for pass operations.
//!
//! ## Modules
//!
//! - `rate_limit` - per-(user, operation) fixed-window throttling with abuse escalation
//! - `policy` - pure evaluation of restrictions, groups and location rules

pub mod policy;
pub mod rate_limit;

pub use policy::{LocationRules, PolicyContext, PolicyDecision, PolicyEngine};
pub use rate_limit::{MemoryRateLimitStore, RateLimitDecision, RateLimitStore, RateLimiter};
