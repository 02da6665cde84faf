//! Policy evaluation result.

use serde::{Deserialize, Serialize};

use hallpass_core::types::{GroupId, RestrictionId, UserId};

/// Outcome of evaluating one movement.
///
/// `requires_approval` implies `allowed == false`; the movement may only
/// proceed after `approver_id` signs off outside this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Whether the movement may proceed now.
    pub allowed: bool,
    /// Whether the movement needs sign-off.
    pub requires_approval: bool,
    /// Human-readable explanation.
    pub reason: String,
    /// Restrictions that contributed to a denial.
    pub matched_restrictions: Vec<RestrictionId>,
    /// Groups that matched (negative on denial, positive otherwise).
    pub matched_groups: Vec<GroupId>,
    /// Who must approve, for `Require Approval` outcomes.
    pub approver_id: Option<UserId>,
}

impl PolicyDecision {
    /// An allow decision.
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            requires_approval: false,
            reason: reason.into(),
            matched_restrictions: Vec::new(),
            matched_groups: Vec::new(),
            approver_id: None,
        }
    }

    /// A plain denial.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            ..Self::allow(reason)
        }
    }

    /// A denial pending approval.
    pub fn approval(reason: impl Into<String>, approver_id: Option<UserId>) -> Self {
        Self {
            requires_approval: true,
            approver_id,
            ..Self::deny(reason)
        }
    }

    /// Attach matched restrictions.
    pub fn with_restrictions(mut self, ids: Vec<RestrictionId>) -> Self {
        self.matched_restrictions = ids;
        self
    }

    /// Attach matched groups.
    pub fn with_groups(mut self, ids: Vec<GroupId>) -> Self {
        self.matched_groups = ids;
        self
    }

    /// Whether the movement is refused outright (not pending approval).
    pub fn is_denied(&self) -> bool {
        !self.allowed && !self.requires_approval
    }
}
