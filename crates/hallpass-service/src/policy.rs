//! Policy lookups feeding the pure policy engine.

use std::sync::Arc;

use tracing::error;

use hallpass_auth::policy::{LocationRules, PolicyContext, PolicyDecision, PolicyEngine};
use hallpass_core::result::AppResult;
use hallpass_database::repositories::{PolicyRepository, SettingsRepository};
use hallpass_entity::policy::{Group, Restriction};
use hallpass_entity::student::Student;

/// Everything the engine needs for one evaluation.
struct PolicyInputs {
    emergency_mode: bool,
    restrictions: Vec<Restriction>,
    groups: Vec<Group>,
    rules: LocationRules,
}

/// Fetches policy data and runs the engine. Fails closed.
#[derive(Debug, Clone)]
pub struct PolicyService {
    engine: PolicyEngine,
    policies: Arc<dyn PolicyRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl PolicyService {
    /// Create a policy service.
    pub fn new(
        engine: PolicyEngine,
        policies: Arc<dyn PolicyRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            engine,
            policies,
            settings,
        }
    }

    /// Evaluate a movement. A lookup failure yields a denial.
    pub async fn evaluate(&self, ctx: &PolicyContext, student: &Student) -> PolicyDecision {
        match self.gather(ctx).await {
            Ok(inputs) => self
                .engine
                .with_emergency_mode(inputs.emergency_mode)
                .evaluate(ctx, student, &inputs.groups, &inputs.restrictions, &inputs.rules),
            Err(e) => {
                error!(
                    student_id = %ctx.student_id,
                    action = %ctx.action,
                    error = %e,
                    "Policy lookup failed, denying movement"
                );
                PolicyDecision::deny("Policy data is unavailable; movement denied")
            }
        }
    }

    async fn gather(&self, ctx: &PolicyContext) -> AppResult<PolicyInputs> {
        let student = ctx.student_id;
        let (
            emergency_mode,
            restrictions,
            groups,
            origin_default,
            origin_override,
            destination_default,
            destination_override,
        ) = futures::try_join!(
            self.settings.emergency_mode(),
            self.policies.restrictions_for_student(student),
            self.policies.groups_for_student(student),
            self.policies.location_rule(ctx.location_id),
            self.policies.student_override(ctx.location_id, student),
            self.policies.location_rule(ctx.destination_location_id),
            self.policies
                .student_override(ctx.destination_location_id, student),
        )?;

        Ok(PolicyInputs {
            emergency_mode,
            restrictions,
            groups,
            rules: LocationRules {
                origin_default,
                origin_override,
                destination_default,
                destination_override,
            },
        })
    }
}
