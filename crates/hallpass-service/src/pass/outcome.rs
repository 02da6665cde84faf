//! Result of an orchestrated pass operation.

use serde::Serialize;

use hallpass_auth::policy::PolicyDecision;
use hallpass_entity::pass::Pass;

/// What happened to a create or transition request.
///
/// Policy refusals are ordinary outcomes, not errors; nothing is written
/// when the outcome is `Denied` or `ApprovalRequired`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum PassOutcome {
    /// The pass was written.
    Completed(Pass),
    /// Policy forbids the movement.
    Denied(PolicyDecision),
    /// The movement needs sign-off before it can happen.
    ApprovalRequired(PolicyDecision),
}

impl PassOutcome {
    /// Map a blocking decision to its outcome; `None` when allowed.
    pub(crate) fn blocked_by(decision: PolicyDecision) -> Option<Self> {
        if decision.allowed {
            None
        } else if decision.requires_approval {
            Some(Self::ApprovalRequired(decision))
        } else {
            Some(Self::Denied(decision))
        }
    }

    /// Whether the pass was written.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The written pass, if any.
    pub fn pass(&self) -> Option<&Pass> {
        match self {
            Self::Completed(pass) => Some(pass),
            _ => None,
        }
    }

    /// Consume into the written pass, if any.
    pub fn into_pass(self) -> Option<Pass> {
        match self {
            Self::Completed(pass) => Some(pass),
            _ => None,
        }
    }

    /// The policy decision behind a refusal.
    pub fn decision(&self) -> Option<&PolicyDecision> {
        match self {
            Self::Completed(_) => None,
            Self::Denied(d) | Self::ApprovalRequired(d) => Some(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_by_maps_decisions() {
        assert!(PassOutcome::blocked_by(PolicyDecision::allow("ok")).is_none());
        assert!(matches!(
            PassOutcome::blocked_by(PolicyDecision::deny("no")),
            Some(PassOutcome::Denied(_))
        ));
        assert!(matches!(
            PassOutcome::blocked_by(PolicyDecision::approval("ask", None)),
            Some(PassOutcome::ApprovalRequired(_))
        ));
    }
}
