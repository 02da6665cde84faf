//! Shared wiring for integration tests: the full engine over the
//! in-memory backends.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;

use hallpass_auth::policy::PolicyEngine;
use hallpass_auth::rate_limit::{MemoryRateLimitStore, RateLimiter};
use hallpass_core::config::AppConfig;
use hallpass_core::events::EventBus;
use hallpass_core::types::{LocationId, StudentId, UserId};
use hallpass_database::memory::{
    MemoryEventLogRepository, MemoryLocationRepository, MemoryPassRepository,
    MemoryPolicyRepository, MemorySettingsRepository,
};
use hallpass_entity::location::{LocationInfo, LocationType};
use hallpass_entity::pass::Pass;
use hallpass_entity::student::Student;
use hallpass_monitor::{AlertRegistry, AuditMonitor};
use hallpass_service::{
    CreatePassRequest, CreationGuard, PassService, PassServiceDeps, PassStateMachine,
    PolicyService, RequestContext, TransitionRequest,
};

/// Test application context
pub struct TestApp {
    pub config: AppConfig,
    pub events: EventBus,
    pub settings: Arc<MemorySettingsRepository>,
    pub locations: Arc<MemoryLocationRepository>,
    pub policies: Arc<MemoryPolicyRepository>,
    pub history: Arc<MemoryEventLogRepository>,
    pub passes: Arc<MemoryPassRepository>,
    pub machine: Arc<PassStateMachine>,
    pub limiter: RateLimiter,
    pub monitor: Arc<AuditMonitor>,
    pub service: PassService,
    pub classroom: LocationId,
    pub library: LocationId,
    pub office: LocationId,
    pub bathroom: LocationId,
}

impl TestApp {
    /// Build with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Build with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let events = EventBus::default();

        let locations = Arc::new(MemoryLocationRepository::new());
        let classroom = LocationId::new();
        let library = LocationId::new();
        let office = LocationId::new();
        let bathroom = LocationId::new();
        locations.insert(LocationInfo::new(classroom, "Room 204", LocationType::Classroom));
        locations.insert(LocationInfo::new(library, "Library", LocationType::Library));
        locations.insert(LocationInfo::new(office, "Main Office", LocationType::Office));
        locations.insert(LocationInfo::new(bathroom, "North Restroom", LocationType::Bathroom));

        let settings = Arc::new(MemorySettingsRepository::new());
        let policies = Arc::new(MemoryPolicyRepository::new());
        let history = Arc::new(MemoryEventLogRepository::new());
        let passes = Arc::new(MemoryPassRepository::new(settings.clone()));
        let machine = Arc::new(PassStateMachine::new(locations.clone()));

        let limiter = RateLimiter::new(
            config.rate_limit.clone(),
            Arc::new(MemoryRateLimitStore::new()),
            events.clone(),
        );
        let registry = Arc::new(AlertRegistry::new(Duration::seconds(
            config.monitor.dedup_window_seconds,
        )));
        let monitor = Arc::new(AuditMonitor::new(
            config.monitor.clone(),
            registry,
            history.clone(),
            events.clone(),
        ));
        let policy = PolicyService::new(
            PolicyEngine::new(config.policy),
            policies.clone(),
            settings.clone(),
        );

        let service = PassService::new(PassServiceDeps {
            config: config.passes.clone(),
            passes: passes.clone(),
            history: history.clone(),
            machine: machine.clone(),
            policy,
            limiter: limiter.clone(),
            monitor: monitor.clone(),
            events: events.clone(),
        });

        Self {
            config,
            events,
            settings,
            locations,
            policies,
            history,
            passes,
            machine,
            limiter,
            monitor,
            service,
            classroom,
            library,
            office,
            bathroom,
        }
    }

    /// A fresh student assigned to the classroom
    pub fn student(&self, name: &str) -> Student {
        Student::new(StudentId::new(), name, self.classroom)
    }

    /// A fresh staff member
    pub fn staff(&self) -> RequestContext {
        RequestContext::new(UserId::new(), "Mr. Lindqvist")
    }

    /// A creation guard over the shared pass repository
    pub fn guard(&self) -> CreationGuard {
        CreationGuard::new(
            self.passes.clone(),
            self.machine.clone(),
            self.config.passes.max_creation_attempts,
        )
    }

    pub fn create_request(&self, student: &Student, destination: LocationId) -> CreatePassRequest {
        CreatePassRequest {
            student_id: student.id,
            student_name: student.name.clone(),
            assigned_location_id: student.assigned_location_id,
            destination_location_id: destination,
            note: None,
        }
    }

    pub fn transition_request(
        &self,
        pass: &Pass,
        student: &Student,
        action: &str,
        destination: Option<LocationId>,
    ) -> TransitionRequest {
        TransitionRequest {
            pass_id: pass.id,
            action: action.to_string(),
            destination_location_id: destination,
            student: student.clone(),
        }
    }

    /// Create a pass through the service, failing the test if it is refused
    pub async fn open_pass(
        &self,
        ctx: &RequestContext,
        student: &Student,
        destination: LocationId,
    ) -> Pass {
        self.service
            .create_pass(ctx, self.create_request(student, destination))
            .await
            .expect("create should succeed")
            .into_pass()
            .expect("create should not be refused")
    }

    /// Apply a transition through the service, failing the test if refused
    pub async fn step(
        &self,
        ctx: &RequestContext,
        pass: &Pass,
        student: &Student,
        action: &str,
        destination: Option<LocationId>,
    ) -> Pass {
        self.service
            .transition(ctx, self.transition_request(pass, student, action, destination))
            .await
            .expect("transition should succeed")
            .into_pass()
            .expect("transition should not be refused")
    }
}
