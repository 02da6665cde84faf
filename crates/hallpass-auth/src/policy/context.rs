//! Inputs to a policy evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hallpass_core::types::{LocationId, StudentId};
use hallpass_entity::pass::PassAction;
use hallpass_entity::policy::{LocationRule, RuleDecision};

/// The movement being asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyContext {
    /// The student who wants to move.
    pub student_id: StudentId,
    /// Where the student is now.
    pub location_id: LocationId,
    /// Where the student wants to go.
    pub destination_location_id: LocationId,
    /// The action that triggered the check.
    pub action: PassAction,
    /// When the movement is requested.
    pub timestamp: DateTime<Utc>,
}

impl PolicyContext {
    /// Build a context stamped at `timestamp`.
    pub fn new(
        student_id: StudentId,
        location_id: LocationId,
        destination_location_id: LocationId,
        action: PassAction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            student_id,
            location_id,
            destination_location_id,
            action,
            timestamp,
        }
    }
}

/// Location rules relevant to one movement.
///
/// Each side has an optional location-wide default and an optional
/// per-student override; the override wins when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRules {
    /// Default rule for the origin.
    pub origin_default: Option<LocationRule>,
    /// Student override for the origin.
    pub origin_override: Option<LocationRule>,
    /// Default rule for the destination.
    pub destination_default: Option<LocationRule>,
    /// Student override for the destination.
    pub destination_override: Option<LocationRule>,
}

/// A resolved leave or arrive decision with its approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EffectiveRule {
    pub decision: RuleDecision,
    pub approver_id: Option<hallpass_core::types::UserId>,
}

impl LocationRules {
    /// Effective policy for leaving the origin.
    pub(crate) fn leave(&self) -> EffectiveRule {
        resolve(
            self.origin_override.as_ref(),
            self.origin_default.as_ref(),
            |r| r.student_leave,
        )
    }

    /// Effective policy for arriving at the destination.
    pub(crate) fn arrive(&self) -> EffectiveRule {
        resolve(
            self.destination_override.as_ref(),
            self.destination_default.as_ref(),
            |r| r.student_arrive,
        )
    }
}

fn resolve(
    over: Option<&LocationRule>,
    default: Option<&LocationRule>,
    pick: impl Fn(&LocationRule) -> RuleDecision,
) -> EffectiveRule {
    let fallback_approver = default.and_then(|r| r.approver_id);
    match over.or(default) {
        Some(rule) => EffectiveRule {
            decision: pick(rule),
            approver_id: rule.approver_id.or(fallback_approver),
        },
        None => EffectiveRule {
            decision: RuleDecision::Allow,
            approver_id: None,
        },
    }
}
