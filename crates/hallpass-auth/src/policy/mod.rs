//! Movement policy evaluation.
//!
//! The engine is pure: callers fetch restrictions, groups and location
//! rules and hand them in. Denials are decisions, not errors.

pub mod context;
pub mod decision;
pub mod engine;

pub use context::{LocationRules, PolicyContext};
pub use decision::PolicyDecision;
pub use engine::PolicyEngine;
