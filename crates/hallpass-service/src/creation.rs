//! Atomic one-open-pass-per-student creation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use hallpass_core::error::AppError;
use hallpass_core::result::AppResult;
use hallpass_core::types::LocationId;
use hallpass_database::repositories::PassRepository;
use hallpass_entity::pass::Pass;
use hallpass_entity::student::Student;

use crate::state_machine::PassStateMachine;

/// User-facing message for both a pre-existing open pass and a lost race.
pub const OPEN_PASS_EXISTS: &str = "Student already has an open pass";

/// What one transaction attempt produced.
enum AttemptOutcome {
    Created(Pass),
    Conflicted,
}

/// Creates passes so a student can never hold two open at once.
///
/// Each attempt runs the emergency check, the open-pass check and the
/// insert inside one repository transaction. A commit conflict discards
/// the attempt and starts over from scratch.
#[derive(Debug, Clone)]
pub struct CreationGuard {
    passes: Arc<dyn PassRepository>,
    machine: Arc<PassStateMachine>,
    max_attempts: u32,
}

impl CreationGuard {
    /// Create a guard retrying up to `max_attempts` times.
    pub fn new(
        passes: Arc<dyn PassRepository>,
        machine: Arc<PassStateMachine>,
        max_attempts: u32,
    ) -> Self {
        Self {
            passes,
            machine,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Create a pass for `student` heading to `destination`.
    ///
    /// Fails with `EmergencyMode` while emergency mode is on, `Conflict`
    /// when the student already has an open pass, and
    /// `ServiceUnavailable` when every attempt lost a race.
    pub async fn create_pass(
        &self,
        student: &Student,
        destination: LocationId,
        at: DateTime<Utc>,
    ) -> AppResult<Pass> {
        for attempt in 1..=self.max_attempts {
            match self.attempt(student, destination, at).await? {
                AttemptOutcome::Created(pass) => {
                    info!(
                        pass_id = %pass.id,
                        student_id = %student.id,
                        destination = %destination,
                        attempt,
                        "Pass created"
                    );
                    return Ok(pass);
                }
                AttemptOutcome::Conflicted => {
                    debug!(student_id = %student.id, attempt, "Pass creation conflicted, retrying");
                }
            }
        }

        warn!(
            student_id = %student.id,
            attempts = self.max_attempts,
            "Pass creation kept conflicting"
        );
        Err(AppError::service_unavailable(
            "Could not create the pass right now, please try again",
        ))
    }

    async fn attempt(
        &self,
        student: &Student,
        destination: LocationId,
        at: DateTime<Utc>,
    ) -> AppResult<AttemptOutcome> {
        let mut tx = self.passes.begin(student.id).await?;

        if tx.emergency_mode().await? {
            return Err(AppError::emergency_mode(
                "Pass creation is suspended while emergency mode is active",
            ));
        }
        if tx.find_open_pass().await?.is_some() {
            return Err(AppError::conflict(OPEN_PASS_EXISTS));
        }

        let id = tx.next_pass_id();
        tx.stage(self.machine.create(id, student, destination, at)?);

        match tx.commit().await {
            Ok(pass) => Ok(AttemptOutcome::Created(pass)),
            Err(e) if e.is_conflict() => Ok(AttemptOutcome::Conflicted),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hallpass_core::error::ErrorKind;
    use hallpass_core::types::{PassId, StudentId};
    use hallpass_database::memory::{
        MemoryLocationRepository, MemoryPassRepository, MemorySettingsRepository,
    };
    use hallpass_database::repositories::{PassTransaction, SettingsRepository};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn guard_over(passes: Arc<dyn PassRepository>) -> CreationGuard {
        let machine = Arc::new(PassStateMachine::new(Arc::new(MemoryLocationRepository::new())));
        CreationGuard::new(passes, machine, 3)
    }

    fn student() -> Student {
        Student::new(StudentId::new(), "Sam", LocationId::new())
    }

    #[tokio::test]
    async fn test_second_creation_reports_open_pass() {
        let settings = Arc::new(MemorySettingsRepository::new());
        let guard = guard_over(Arc::new(MemoryPassRepository::new(settings)));
        let s = student();

        guard.create_pass(&s, LocationId::new(), Utc::now()).await.unwrap();
        let err = guard
            .create_pass(&s, LocationId::new(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.message, OPEN_PASS_EXISTS);
    }

    #[tokio::test]
    async fn test_emergency_mode_blocks_creation() {
        let settings = Arc::new(MemorySettingsRepository::new());
        settings.set_emergency_mode(true).await.unwrap();
        let repo = Arc::new(MemoryPassRepository::new(settings));
        let guard = guard_over(repo.clone());
        let s = student();

        let err = guard
            .create_pass(&s, LocationId::new(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmergencyMode);
        assert!(repo.passes_for_student(s.id).is_empty());
    }

    /// A repository whose commits always lose the race.
    #[derive(Debug, Default)]
    struct AlwaysConflicting {
        begins: AtomicU32,
    }

    struct ConflictingTx;

    #[async_trait]
    impl PassTransaction for ConflictingTx {
        async fn emergency_mode(&mut self) -> AppResult<bool> {
            Ok(false)
        }
        async fn find_open_pass(&mut self) -> AppResult<Option<Pass>> {
            Ok(None)
        }
        fn next_pass_id(&mut self) -> PassId {
            PassId::new()
        }
        fn stage(&mut self, _: Pass) {}
        async fn commit(&mut self) -> AppResult<Pass> {
            Err(AppError::conflict("Concurrent pass write for student"))
        }
    }

    #[async_trait]
    impl PassRepository for AlwaysConflicting {
        async fn find_by_id(&self, _: PassId) -> AppResult<Option<Pass>> {
            Ok(None)
        }
        async fn find_open_for_student(&self, _: StudentId) -> AppResult<Option<Pass>> {
            Ok(None)
        }
        async fn list_open(&self) -> AppResult<Vec<Pass>> {
            Ok(Vec::new())
        }
        async fn begin(&self, _: StudentId) -> AppResult<Box<dyn PassTransaction>> {
            self.begins.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ConflictingTx))
        }
        async fn update(&self, _: &Pass) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_exhausted_retries_ask_to_try_again() {
        let repo = Arc::new(AlwaysConflicting::default());
        let guard = guard_over(repo.clone());

        let err = guard
            .create_pass(&student(), LocationId::new(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
        assert_eq!(repo.begins.load(Ordering::SeqCst), 3);
    }
}
