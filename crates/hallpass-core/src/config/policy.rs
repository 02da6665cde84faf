//! Policy engine configuration.

use serde::{Deserialize, Serialize};

/// Toggles for the individual policy evaluation steps.
///
/// Each flag independently enables or disables its step. A disabled step
/// contributes nothing to the decision and reports no matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Evaluate positive/negative group membership.
    #[serde(default = "default_true")]
    pub enable_group_rules: bool,
    /// Evaluate global and class-level restrictions.
    #[serde(default = "default_true")]
    pub enable_restrictions: bool,
    /// Evaluate per-location leave/arrive rules.
    #[serde(default = "default_true")]
    pub enable_classroom_policies: bool,
    /// Static emergency switch. The live switch in settings is OR-ed in.
    #[serde(default)]
    pub emergency_mode: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enable_group_rules: true,
            enable_restrictions: true,
            enable_classroom_policies: true,
            emergency_mode: false,
        }
    }
}

fn default_true() -> bool {
    true
}
