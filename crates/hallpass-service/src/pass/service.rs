//! Pass service: the only path callers use to write passes.

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};
use validator::Validate;

use hallpass_auth::policy::PolicyContext;
use hallpass_auth::rate_limit::RateLimiter;
use hallpass_core::config::PassConfig;
use hallpass_core::config::rate_limit::operations;
use hallpass_core::error::AppError;
use hallpass_core::events::{DomainEvent, EventBus, PassEvent};
use hallpass_core::result::AppResult;
use hallpass_core::types::PassId;
use hallpass_database::repositories::{EventLogRepository, PassRepository};
use hallpass_entity::event::{AuditEvent, AuditEventType};
use hallpass_entity::pass::{Pass, PassAction};
use hallpass_entity::student::Student;
use hallpass_monitor::AuditMonitor;

use crate::context::RequestContext;
use crate::creation::CreationGuard;
use crate::policy::PolicyService;
use crate::state_machine::{ActionState, PassStateMachine};

use super::outcome::PassOutcome;
use super::request::{CreatePassRequest, TransitionRequest};

/// Collaborators a [`PassService`] is built from.
#[derive(Debug, Clone)]
pub struct PassServiceDeps {
    /// Pass settings.
    pub config: PassConfig,
    /// Pass persistence.
    pub passes: Arc<dyn PassRepository>,
    /// Student event history.
    pub history: Arc<dyn EventLogRepository>,
    /// Leg and transition rules.
    pub machine: Arc<PassStateMachine>,
    /// Policy lookups and evaluation.
    pub policy: PolicyService,
    /// Per-user throttling.
    pub limiter: RateLimiter,
    /// Post-commit analysis.
    pub monitor: Arc<AuditMonitor>,
    /// Domain event publisher.
    pub events: EventBus,
}

/// Runs every pass mutation through rate limiting, policy, the state
/// machine and persistence, then records history and kicks off monitoring.
#[derive(Debug, Clone)]
pub struct PassService {
    /// Pass settings.
    config: PassConfig,
    /// Pass persistence.
    passes: Arc<dyn PassRepository>,
    /// Student event history.
    history: Arc<dyn EventLogRepository>,
    /// Leg and transition rules.
    machine: Arc<PassStateMachine>,
    /// Atomic creation.
    guard: CreationGuard,
    /// Policy lookups and evaluation.
    policy: PolicyService,
    /// Per-user throttling.
    limiter: RateLimiter,
    /// Post-commit analysis.
    monitor: Arc<AuditMonitor>,
    /// Domain event publisher.
    events: EventBus,
}

impl PassService {
    /// Creates a new pass service.
    pub fn new(deps: PassServiceDeps) -> Self {
        let guard = CreationGuard::new(
            deps.passes.clone(),
            deps.machine.clone(),
            deps.config.max_creation_attempts,
        );
        Self {
            config: deps.config,
            passes: deps.passes,
            history: deps.history,
            machine: deps.machine,
            guard,
            policy: deps.policy,
            limiter: deps.limiter,
            monitor: deps.monitor,
            events: deps.events,
        }
    }

    /// The state machine.
    pub fn machine(&self) -> &Arc<PassStateMachine> {
        &self.machine
    }

    /// The audit monitor.
    pub fn monitor(&self) -> &Arc<AuditMonitor> {
        &self.monitor
    }

    /// The rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Create a pass for a student.
    ///
    /// A policy refusal is returned as an outcome and nothing is written.
    pub async fn create_pass(
        &self,
        ctx: &RequestContext,
        req: CreatePassRequest,
    ) -> AppResult<PassOutcome> {
        self.limiter
            .enforce(ctx.user_id, operations::PASS_CREATION)
            .await?;
        req.check(self.config.max_note_length)?;
        self.machine.location(req.destination_location_id).await?;

        let student = req.student();
        let policy_ctx = PolicyContext::new(
            student.id,
            student.assigned_location_id,
            req.destination_location_id,
            PassAction::Create,
            ctx.request_time,
        );
        let decision = self.policy.evaluate(&policy_ctx, &student).await;
        if let Some(outcome) = PassOutcome::blocked_by(decision) {
            warn!(
                student_id = %student.id,
                user_id = %ctx.user_id,
                reason = outcome.decision().map(|d| d.reason.as_str()).unwrap_or_default(),
                "Pass creation blocked by policy"
            );
            return Ok(outcome);
        }

        let pass = self
            .guard
            .create_pass(&student, req.destination_location_id, ctx.request_time)
            .await?;

        self.record(
            AuditEvent::new(student.id, AuditEventType::PassCreated, ctx.request_time)
                .with_pass(pass.id)
                .with_actor(ctx.user_id)
                .with_details(json!({
                    "origin_location_id": student.assigned_location_id,
                    "destination_location_id": req.destination_location_id,
                    "note": req.note,
                })),
        )
        .await;
        self.events.publish(DomainEvent::pass(
            Some(ctx.user_id.into_uuid()),
            PassEvent::Created {
                pass_id: pass.id.into_uuid(),
                student_id: student.id.into_uuid(),
                origin_id: student.assigned_location_id.into_uuid(),
                destination_id: req.destination_location_id.into_uuid(),
            },
        ));
        self.monitor.spawn_creation_check(student.id);

        Ok(PassOutcome::Completed(pass))
    }

    /// Apply a named transition to an existing pass.
    pub async fn transition(
        &self,
        ctx: &RequestContext,
        req: TransitionRequest,
    ) -> AppResult<PassOutcome> {
        self.limiter
            .enforce(ctx.user_id, operations::PASS_UPDATE)
            .await?;
        req.validate()?;

        let mut pass = self.load_for(req.pass_id, &req.student).await?;
        let action = self.machine.validate_transition(&pass, &req.action).await?;
        let at = ctx.request_time;
        let legs_before = pass.legs.len();

        match action {
            PassAction::Arrive => self.machine.arrive(&mut pass, at).await?,
            PassAction::ReturnToClass => {
                self.machine
                    .return_to_class(&mut pass, &req.student, at)
                    .await?
            }
            PassAction::RestroomReturn => {
                self.machine
                    .restroom_return(&mut pass, &req.student, &ctx.user_name, at)
                    .await?
            }
            PassAction::NewDestination => {
                let destination = req.destination_location_id.ok_or_else(|| {
                    AppError::validation("new_destination requires a destination location")
                })?;
                let current = pass
                    .current_leg()
                    .map(|leg| leg.destination_location_id)
                    .ok_or_else(|| AppError::internal(format!("Pass {} has no legs", pass.id)))?;
                let policy_ctx = PolicyContext::new(
                    req.student.id,
                    current,
                    destination,
                    action,
                    at,
                );
                let decision = self.policy.evaluate(&policy_ctx, &req.student).await;
                if let Some(outcome) = PassOutcome::blocked_by(decision) {
                    warn!(
                        pass_id = %pass.id,
                        user_id = %ctx.user_id,
                        "New destination blocked by policy"
                    );
                    return Ok(outcome);
                }
                self.machine.add_destination(&mut pass, destination, at).await?
            }
            PassAction::ClosePass => self.machine.close(&mut pass, &ctx.user_name, at)?,
            PassAction::Create => {
                return Err(AppError::validation("create is not a transition"));
            }
        }

        self.passes.update(&pass).await?;
        info!(
            pass_id = %pass.id,
            action = %action,
            user_id = %ctx.user_id,
            status = %pass.status,
            "Pass transitioned"
        );

        if pass.legs.len() > legs_before {
            self.record_leg(ctx, &pass, action).await;
        }
        if !pass.is_open() {
            self.record_close(ctx, &pass).await;
        } else {
            self.monitor.spawn_duration_check(pass.clone());
        }

        Ok(PassOutcome::Completed(pass))
    }

    /// Let the acting staff member take responsibility for a pass.
    pub async fn claim_pass(&self, ctx: &RequestContext, pass_id: PassId) -> AppResult<Pass> {
        self.limiter
            .enforce(ctx.user_id, operations::PASS_UPDATE)
            .await?;
        let mut pass = self.load(pass_id).await?;

        let claimed = self
            .machine
            .claim(&mut pass, ctx.user_id, &ctx.user_name, ctx.request_time)?;
        if !claimed {
            return Ok(pass);
        }

        self.passes.update(&pass).await?;
        info!(pass_id = %pass.id, user_id = %ctx.user_id, "Pass claimed");
        self.record(
            AuditEvent::new(pass.student_id, AuditEventType::PassClaimed, ctx.request_time)
                .with_pass(pass.id)
                .with_actor(ctx.user_id)
                .with_details(json!({ "claimed_by": ctx.user_name })),
        )
        .await;
        self.events.publish(DomainEvent::pass(
            Some(ctx.user_id.into_uuid()),
            PassEvent::Claimed {
                pass_id: pass.id.into_uuid(),
                user_id: ctx.user_id.into_uuid(),
            },
        ));
        Ok(pass)
    }

    /// Describe what the student holding `pass_id` can do next.
    pub async fn action_state(&self, pass_id: PassId, student: &Student) -> AppResult<ActionState> {
        let pass = self.load_for(pass_id, student).await?;
        self.machine.determine_action_state(&pass, student).await
    }

    /// The student's open pass, if any.
    pub async fn open_pass_for(&self, student: &Student) -> AppResult<Option<Pass>> {
        self.passes.find_open_for_student(student.id).await
    }

    async fn load(&self, pass_id: PassId) -> AppResult<Pass> {
        self.passes
            .find_by_id(pass_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Pass {pass_id} not found")))
    }

    async fn load_for(&self, pass_id: PassId, student: &Student) -> AppResult<Pass> {
        let pass = self.load(pass_id).await?;
        if pass.student_id != student.id {
            return Err(AppError::validation(format!(
                "Pass {pass_id} does not belong to student {}",
                student.id
            )));
        }
        Ok(pass)
    }

    async fn record_leg(&self, ctx: &RequestContext, pass: &Pass, action: PassAction) {
        let Some(leg) = pass.current_leg() else {
            return;
        };
        self.record(
            AuditEvent::new(pass.student_id, AuditEventType::LegAdded, ctx.request_time)
                .with_pass(pass.id)
                .with_actor(ctx.user_id)
                .with_details(json!({
                    "action": action.as_str(),
                    "leg_number": leg.leg_number,
                    "state": leg.state,
                    "origin_location_id": leg.origin_location_id,
                    "destination_location_id": leg.destination_location_id,
                })),
        )
        .await;
        self.events.publish(DomainEvent::pass(
            Some(ctx.user_id.into_uuid()),
            PassEvent::LegAdded {
                pass_id: pass.id.into_uuid(),
                student_id: pass.student_id.into_uuid(),
                action: action.as_str().to_string(),
                leg_number: leg.leg_number,
                origin_id: leg.origin_location_id.into_uuid(),
                destination_id: leg.destination_location_id.into_uuid(),
            },
        ));
    }

    async fn record_close(&self, ctx: &RequestContext, pass: &Pass) {
        let closed_by = pass.closed_by.clone().unwrap_or_else(|| ctx.user_name.clone());
        self.record(
            AuditEvent::new(pass.student_id, AuditEventType::PassClosed, ctx.request_time)
                .with_pass(pass.id)
                .with_actor(ctx.user_id)
                .with_details(json!({
                    "closed_by": closed_by,
                    "legs": pass.legs.len(),
                    "open_minutes": pass.open_minutes(ctx.request_time),
                })),
        )
        .await;
        self.events.publish(DomainEvent::pass(
            Some(ctx.user_id.into_uuid()),
            PassEvent::Closed {
                pass_id: pass.id.into_uuid(),
                student_id: pass.student_id.into_uuid(),
                closed_by,
            },
        ));
    }

    /// History is best effort once the pass write has committed.
    async fn record(&self, event: AuditEvent) {
        let event_type = event.event_type;
        let student_id = event.student_id;
        if let Err(e) = self.history.append(event).await {
            error!(
                student_id = %student_id,
                event_type = %event_type,
                error = %e,
                "Failed to append pass history"
            );
        }
    }
}
