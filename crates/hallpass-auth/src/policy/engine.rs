//! The policy engine.

use tracing::debug;

use hallpass_core::config::PolicyConfig;
use hallpass_entity::policy::{Group, GroupType, Restriction, RestrictionType, RuleDecision};
use hallpass_entity::student::Student;

use super::context::{LocationRules, PolicyContext};
use super::decision::PolicyDecision;

/// Evaluates a movement against restrictions, groups and location rules.
///
/// Steps run most restrictive first and the first denial wins:
///
/// 1. emergency mode
/// 2. active global restriction
/// 3. active class-level restriction on the origin
/// 4. negative group membership
/// 5. positive group membership (informational)
/// 6. leave/arrive location rules
///
/// Each step can be switched off through [`PolicyConfig`]; a disabled step
/// reports no matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine {
    flags: PolicyConfig,
}

impl PolicyEngine {
    /// Create an engine with the given step toggles.
    pub fn new(flags: PolicyConfig) -> Self {
        Self { flags }
    }

    /// A copy of this engine with emergency mode forced on when `active`.
    pub fn with_emergency_mode(self, active: bool) -> Self {
        Self {
            flags: PolicyConfig {
                emergency_mode: self.flags.emergency_mode || active,
                ..self.flags
            },
        }
    }

    /// The step toggles in effect.
    pub fn flags(&self) -> &PolicyConfig {
        &self.flags
    }

    /// Evaluate one movement. Performs no I/O.
    pub fn evaluate(
        &self,
        ctx: &PolicyContext,
        student: &Student,
        groups: &[Group],
        restrictions: &[Restriction],
        rules: &LocationRules,
    ) -> PolicyDecision {
        let decision = self.decide(ctx, student, groups, restrictions, rules);
        debug!(
            student_id = %ctx.student_id,
            action = %ctx.action,
            origin = %ctx.location_id,
            destination = %ctx.destination_location_id,
            allowed = decision.allowed,
            requires_approval = decision.requires_approval,
            reason = %decision.reason,
            "Policy evaluated"
        );
        decision
    }

    fn decide(
        &self,
        ctx: &PolicyContext,
        student: &Student,
        groups: &[Group],
        restrictions: &[Restriction],
        rules: &LocationRules,
    ) -> PolicyDecision {
        if self.flags.emergency_mode {
            return PolicyDecision::deny("Emergency mode is active; all movement is suspended");
        }

        if self.flags.enable_restrictions {
            let active: Vec<&Restriction> = restrictions
                .iter()
                .filter(|r| r.student_id == student.id && r.is_active_at(ctx.timestamp))
                .collect();

            let global: Vec<_> = active
                .iter()
                .filter(|r| r.restriction_type == RestrictionType::Global)
                .map(|r| r.id)
                .collect();
            if !global.is_empty() {
                return PolicyDecision::deny("Student has an active global restriction")
                    .with_restrictions(global);
            }

            let class_level: Vec<_> = active
                .iter()
                .filter(|r| r.applies_to_location(ctx.location_id))
                .map(|r| r.id)
                .collect();
            if !class_level.is_empty() {
                return PolicyDecision::deny(
                    "Student has an active restriction for the current location",
                )
                .with_restrictions(class_level);
            }
        }

        let mut positive = Vec::new();
        if self.flags.enable_group_rules {
            let member_of = groups.iter().filter(|g| g.contains(student.id));
            let mut negative = Vec::new();
            let mut negative_names = Vec::new();
            for group in member_of {
                match group.group_type {
                    GroupType::Negative => {
                        negative.push(group.id);
                        negative_names.push(group.name.as_str());
                    }
                    GroupType::Positive => positive.push(group.id),
                }
            }
            if !negative.is_empty() {
                return PolicyDecision::deny(format!(
                    "Student is in a restricted group: {}",
                    negative_names.join(", ")
                ))
                .with_groups(negative);
            }
        }

        if self.flags.enable_classroom_policies {
            let leave = rules.leave();
            let arrive = rules.arrive();

            if leave.decision == RuleDecision::Disallow {
                return PolicyDecision::deny("Leaving the current location is not allowed")
                    .with_groups(positive);
            }
            if arrive.decision == RuleDecision::Disallow {
                return PolicyDecision::deny("Arriving at the destination is not allowed")
                    .with_groups(positive);
            }
            if leave.decision == RuleDecision::RequireApproval {
                return PolicyDecision::approval(
                    "Leaving the current location requires approval",
                    leave.approver_id,
                )
                .with_groups(positive);
            }
            if arrive.decision == RuleDecision::RequireApproval {
                return PolicyDecision::approval(
                    "Arriving at the destination requires approval",
                    arrive.approver_id,
                )
                .with_groups(positive);
            }
        }

        PolicyDecision::allow("Movement allowed").with_groups(positive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use hallpass_core::types::{GroupId, LocationId, RestrictionId, StudentId, UserId};
    use hallpass_entity::pass::PassAction;
    use hallpass_entity::policy::LocationRule;
    use std::collections::HashSet;

    struct Fixture {
        student: Student,
        ctx: PolicyContext,
    }

    fn fixture() -> Fixture {
        let origin = LocationId::new();
        let student = Student::new(StudentId::new(), "Avery", origin);
        let ctx = PolicyContext::new(
            student.id,
            origin,
            LocationId::new(),
            PassAction::Create,
            Utc::now(),
        );
        Fixture { student, ctx }
    }

    fn restriction(f: &Fixture, kind: RestrictionType, location: Option<LocationId>) -> Restriction {
        Restriction {
            id: RestrictionId::new(),
            student_id: f.student.id,
            restriction_type: kind,
            is_active: true,
            location_id: location,
            expires_at: None,
            reason: None,
        }
    }

    fn group(f: &Fixture, kind: GroupType) -> Group {
        Group {
            id: GroupId::new(),
            name: format!("{kind:?} cohort"),
            group_type: kind,
            assigned_students: HashSet::from([f.student.id]),
        }
    }

    #[test]
    fn test_no_inputs_allows() {
        let f = fixture();
        let d = PolicyEngine::default().evaluate(&f.ctx, &f.student, &[], &[], &LocationRules::default());
        assert!(d.allowed);
        assert!(!d.requires_approval);
    }

    #[test]
    fn test_emergency_mode_denies_everything() {
        let f = fixture();
        let engine = PolicyEngine::default().with_emergency_mode(true);
        let d = engine.evaluate(&f.ctx, &f.student, &[], &[], &LocationRules::default());
        assert!(d.is_denied());
        assert!(d.reason.contains("Emergency mode"));
    }

    #[test]
    fn test_global_restriction_denies_even_with_positive_group() {
        let f = fixture();
        let r = restriction(&f, RestrictionType::Global, None);
        let g = group(&f, GroupType::Positive);
        let d = PolicyEngine::default().evaluate(
            &f.ctx,
            &f.student,
            &[g],
            std::slice::from_ref(&r),
            &LocationRules::default(),
        );
        assert!(d.is_denied());
        assert_eq!(d.matched_restrictions, vec![r.id]);
    }

    #[test]
    fn test_expired_restriction_is_ignored() {
        let f = fixture();
        let mut r = restriction(&f, RestrictionType::Global, None);
        r.expires_at = Some(f.ctx.timestamp - Duration::minutes(1));
        let d = PolicyEngine::default().evaluate(&f.ctx, &f.student, &[], &[r], &LocationRules::default());
        assert!(d.allowed);
    }

    #[test]
    fn test_class_level_restriction_only_at_its_location() {
        let f = fixture();
        let here = restriction(&f, RestrictionType::ClassLevel, Some(f.ctx.location_id));
        let elsewhere = restriction(&f, RestrictionType::ClassLevel, Some(LocationId::new()));

        let engine = PolicyEngine::default();
        let rules = LocationRules::default();
        assert!(engine.evaluate(&f.ctx, &f.student, &[], &[here], &rules).is_denied());
        assert!(engine.evaluate(&f.ctx, &f.student, &[], &[elsewhere], &rules).allowed);
    }

    #[test]
    fn test_negative_group_denies() {
        let f = fixture();
        let g = group(&f, GroupType::Negative);
        let d = PolicyEngine::default().evaluate(
            &f.ctx,
            &f.student,
            std::slice::from_ref(&g),
            &[],
            &LocationRules::default(),
        );
        assert!(d.is_denied());
        assert_eq!(d.matched_groups, vec![g.id]);
    }

    #[test]
    fn test_positive_group_is_informational() {
        let f = fixture();
        let g = group(&f, GroupType::Positive);
        let d = PolicyEngine::default().evaluate(
            &f.ctx,
            &f.student,
            std::slice::from_ref(&g),
            &[],
            &LocationRules::default(),
        );
        assert!(d.allowed);
        assert_eq!(d.matched_groups, vec![g.id]);
    }

    #[test]
    fn test_require_approval_carries_approver() {
        let f = fixture();
        let approver = UserId::new();
        let rules = LocationRules {
            destination_default: Some(
                LocationRule::location_default(
                    f.ctx.destination_location_id,
                    RuleDecision::Allow,
                    RuleDecision::RequireApproval,
                )
                .with_approver(approver),
            ),
            ..Default::default()
        };
        let d = PolicyEngine::default().evaluate(&f.ctx, &f.student, &[], &[], &rules);
        assert!(!d.allowed);
        assert!(d.requires_approval);
        assert_eq!(d.approver_id, Some(approver));
    }

    #[test]
    fn test_student_override_beats_default() {
        let f = fixture();
        let rules = LocationRules {
            origin_default: Some(LocationRule::location_default(
                f.ctx.location_id,
                RuleDecision::Disallow,
                RuleDecision::Allow,
            )),
            origin_override: Some(LocationRule::student_override(
                f.ctx.location_id,
                f.student.id,
                RuleDecision::Allow,
                RuleDecision::Allow,
            )),
            ..Default::default()
        };
        assert!(PolicyEngine::default().evaluate(&f.ctx, &f.student, &[], &[], &rules).allowed);
    }

    #[test]
    fn test_disallow_wins_over_require_approval() {
        let f = fixture();
        let rules = LocationRules {
            origin_default: Some(LocationRule::location_default(
                f.ctx.location_id,
                RuleDecision::RequireApproval,
                RuleDecision::Allow,
            )),
            destination_default: Some(LocationRule::location_default(
                f.ctx.destination_location_id,
                RuleDecision::Allow,
                RuleDecision::Disallow,
            )),
            ..Default::default()
        };
        let d = PolicyEngine::default().evaluate(&f.ctx, &f.student, &[], &[], &rules);
        assert!(d.is_denied());
    }

    #[test]
    fn test_disabled_steps_report_no_matches() {
        let f = fixture();
        let engine = PolicyEngine::new(PolicyConfig {
            enable_group_rules: false,
            enable_restrictions: false,
            enable_classroom_policies: false,
            emergency_mode: false,
        });
        let rules = LocationRules {
            origin_default: Some(LocationRule::location_default(
                f.ctx.location_id,
                RuleDecision::Disallow,
                RuleDecision::Disallow,
            )),
            ..Default::default()
        };
        let d = engine.evaluate(
            &f.ctx,
            &f.student,
            &[group(&f, GroupType::Negative), group(&f, GroupType::Positive)],
            &[restriction(&f, RestrictionType::Global, None)],
            &rules,
        );
        assert!(d.allowed);
        assert!(d.matched_groups.is_empty());
        assert!(d.matched_restrictions.is_empty());
    }
}
