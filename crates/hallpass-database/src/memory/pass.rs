//! In-memory pass store with optimistic per-student versioning.
//!
//! Every write for a student bumps that student's version. A creation
//! transaction remembers the version it saw at `begin` and refuses to
//! commit if the version moved, so two racing creations for the same
//! student can never both land. Students never share a version.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use hallpass_core::error::AppError;
use hallpass_core::result::AppResult;
use hallpass_core::types::{PassId, StudentId};
use hallpass_entity::pass::Pass;

use crate::repositories::{PassRepository, PassTransaction, SettingsRepository};

/// Shared maps behind the repository and its transactions.
#[derive(Debug, Default)]
struct PassStore {
    passes: DashMap<PassId, Pass>,
    open_by_student: DashMap<StudentId, PassId>,
    versions: DashMap<StudentId, u64>,
}

impl PassStore {
    fn version_of(&self, student_id: StudentId) -> u64 {
        self.versions.get(&student_id).map(|v| *v).unwrap_or(0)
    }

    fn open_pass(&self, student_id: StudentId) -> Option<Pass> {
        // Copy the id out so the index guard is released before touching `passes`.
        let pass_id = self.open_by_student.get(&student_id).map(|e| *e.value())?;
        self.passes.get(&pass_id).map(|e| e.value().clone())
    }

    fn insert_new(&self, pass: Pass, snapshot: u64) -> AppResult<Pass> {
        let student_id = pass.student_id;
        let mut version = self.versions.entry(student_id).or_insert(0);
        if *version != snapshot {
            debug!(
                student_id = %student_id,
                expected = snapshot,
                actual = *version,
                "Pass creation lost a concurrent write"
            );
            return Err(AppError::conflict("Concurrent pass write for student"));
        }
        if pass.is_open() {
            if self.open_by_student.contains_key(&student_id) {
                return Err(AppError::conflict("Student already has an open pass"));
            }
            self.open_by_student.insert(student_id, pass.id);
        }
        self.passes.insert(pass.id, pass.clone());
        *version += 1;
        Ok(pass)
    }

    /// Write back a changed pass. A closed pass stays closed, and an open
    /// write is refused unless this pass still owns the student's open slot.
    fn replace(&self, pass: &Pass) -> AppResult<()> {
        let mut version = self.versions.entry(pass.student_id).or_insert(0);
        let stored_open = self
            .passes
            .get(&pass.id)
            .map(|e| e.value().is_open())
            .ok_or_else(|| AppError::not_found(format!("Pass {} not found", pass.id)))?;

        if pass.is_open() {
            if !stored_open {
                debug!(pass_id = %pass.id, "Refused stale write over a closed pass");
                return Err(AppError::conflict(format!(
                    "Pass {} was closed by a concurrent update",
                    pass.id
                )));
            }
            let owns_slot = self
                .open_by_student
                .get(&pass.student_id)
                .is_some_and(|e| *e.value() == pass.id);
            if !owns_slot {
                return Err(AppError::conflict(format!(
                    "Pass {} is no longer the student's open pass",
                    pass.id
                )));
            }
        } else {
            self.open_by_student
                .remove_if(&pass.student_id, |_, open_id| *open_id == pass.id);
        }
        self.passes.insert(pass.id, pass.clone());
        *version += 1;
        Ok(())
    }
}

/// Pass repository held in process memory.
#[derive(Debug, Clone)]
pub struct MemoryPassRepository {
    store: Arc<PassStore>,
    settings: Arc<dyn SettingsRepository>,
}

impl MemoryPassRepository {
    /// Create an empty store that reads the emergency flag from `settings`.
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        Self {
            store: Arc::new(PassStore::default()),
            settings,
        }
    }

    /// Every pass ever written for the student, open or closed.
    pub fn passes_for_student(&self, student_id: StudentId) -> Vec<Pass> {
        self.store
            .passes
            .iter()
            .filter(|e| e.value().student_id == student_id)
            .map(|e| e.value().clone())
            .collect()
    }
}

#[async_trait]
impl PassRepository for MemoryPassRepository {
    async fn find_by_id(&self, id: PassId) -> AppResult<Option<Pass>> {
        Ok(self.store.passes.get(&id).map(|e| e.value().clone()))
    }

    async fn find_open_for_student(&self, student_id: StudentId) -> AppResult<Option<Pass>> {
        Ok(self.store.open_pass(student_id))
    }

    async fn list_open(&self) -> AppResult<Vec<Pass>> {
        Ok(self
            .store
            .passes
            .iter()
            .filter(|e| e.value().is_open())
            .map(|e| e.value().clone())
            .collect())
    }

    async fn begin(&self, student_id: StudentId) -> AppResult<Box<dyn PassTransaction>> {
        Ok(Box::new(MemoryPassTransaction {
            store: Arc::clone(&self.store),
            settings: Arc::clone(&self.settings),
            student_id,
            snapshot: self.store.version_of(student_id),
            staged: None,
        }))
    }

    async fn update(&self, pass: &Pass) -> AppResult<()> {
        self.store.replace(pass)
    }
}

/// Creation transaction over the in-memory store.
struct MemoryPassTransaction {
    store: Arc<PassStore>,
    settings: Arc<dyn SettingsRepository>,
    student_id: StudentId,
    snapshot: u64,
    staged: Option<Pass>,
}

#[async_trait]
impl PassTransaction for MemoryPassTransaction {
    async fn emergency_mode(&mut self) -> AppResult<bool> {
        self.settings.emergency_mode().await
    }

    async fn find_open_pass(&mut self) -> AppResult<Option<Pass>> {
        Ok(self.store.open_pass(self.student_id))
    }

    fn next_pass_id(&mut self) -> PassId {
        PassId::new()
    }

    fn stage(&mut self, pass: Pass) {
        self.staged = Some(pass);
    }

    async fn commit(&mut self) -> AppResult<Pass> {
        let pass = self
            .staged
            .take()
            .ok_or_else(|| AppError::internal("No pass staged for commit"))?;
        if pass.student_id != self.student_id {
            return Err(AppError::internal(
                "Staged pass belongs to a different student",
            ));
        }
        self.store.insert_new(pass, self.snapshot)
    }
}
