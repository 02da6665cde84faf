//! Location rule entity model.

use std::fmt;

use serde::{Deserialize, Serialize};

use hallpass_core::types::{LocationId, StudentId, UserId};

/// Outcome a location rule prescribes for a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleDecision {
    /// Movement is permitted.
    #[default]
    Allow,
    /// Movement is forbidden.
    Disallow,
    /// Movement needs sign-off from the location's approver.
    #[serde(rename = "Require Approval")]
    RequireApproval,
}

impl RuleDecision {
    /// Strictness rank: higher is more restrictive.
    pub fn strictness(&self) -> u8 {
        match self {
            Self::Allow => 0,
            Self::RequireApproval => 1,
            Self::Disallow => 2,
        }
    }
}

impl fmt::Display for RuleDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("Allow"),
            Self::Disallow => f.write_str("Disallow"),
            Self::RequireApproval => f.write_str("Require Approval"),
        }
    }
}

/// Leave/arrive policy for one location, optionally for one student.
///
/// A rule with `student_id = None` is the location-wide default; a rule
/// with a student set is a per-student override and wins over the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRule {
    /// The location the rule governs.
    pub location_id: LocationId,
    /// Set for per-student overrides.
    pub student_id: Option<StudentId>,
    /// Policy for leaving this location.
    #[serde(default)]
    pub student_leave: RuleDecision,
    /// Policy for arriving at this location.
    #[serde(default)]
    pub student_arrive: RuleDecision,
    /// Staff member who approves `Require Approval` movements.
    pub approver_id: Option<UserId>,
}

impl LocationRule {
    /// A location-wide default rule.
    pub fn location_default(
        location_id: LocationId,
        student_leave: RuleDecision,
        student_arrive: RuleDecision,
    ) -> Self {
        Self {
            location_id,
            student_id: None,
            student_leave,
            student_arrive,
            approver_id: None,
        }
    }

    /// A per-student override.
    pub fn student_override(
        location_id: LocationId,
        student_id: StudentId,
        student_leave: RuleDecision,
        student_arrive: RuleDecision,
    ) -> Self {
        Self {
            student_id: Some(student_id),
            ..Self::location_default(location_id, student_leave, student_arrive)
        }
    }

    /// Set the approver.
    pub fn with_approver(mut self, approver_id: UserId) -> Self {
        self.approver_id = Some(approver_id);
        self
    }
}
