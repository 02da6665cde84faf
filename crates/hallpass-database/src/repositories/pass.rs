//! Pass repository and creation transaction traits.

use async_trait::async_trait;

use hallpass_core::result::AppResult;
use hallpass_core::types::{PassId, StudentId};
use hallpass_entity::pass::Pass;

/// Storage for passes.
///
/// Creation always goes through [`PassRepository::begin`] so the
/// implementation can serialize it per student. Other writes use
/// [`PassRepository::update`] and are last-writer-wins.
#[async_trait]
pub trait PassRepository: Send + Sync + std::fmt::Debug {
    /// Find a pass by ID.
    async fn find_by_id(&self, id: PassId) -> AppResult<Option<Pass>>;

    /// Find the student's open pass, if any.
    async fn find_open_for_student(&self, student_id: StudentId) -> AppResult<Option<Pass>>;

    /// List every open pass.
    async fn list_open(&self) -> AppResult<Vec<Pass>>;

    /// Start a creation transaction scoped to one student.
    async fn begin(&self, student_id: StudentId) -> AppResult<Box<dyn PassTransaction>>;

    /// Persist a mutated pass.
    async fn update(&self, pass: &Pass) -> AppResult<()>;
}

/// An atomic check-and-create unit of work for one student.
///
/// Reads observe the state at the time they are made; `commit` fails with
/// a conflict if any other write for the same student landed after
/// `begin`. Dropping the transaction without committing discards it.
#[async_trait]
pub trait PassTransaction: Send {
    /// Read the global emergency flag.
    async fn emergency_mode(&mut self) -> AppResult<bool>;

    /// Read the student's open pass, if any.
    async fn find_open_pass(&mut self) -> AppResult<Option<Pass>>;

    /// Allocate an identifier for a new pass.
    fn next_pass_id(&mut self) -> PassId;

    /// Stage the pass to be written on commit.
    fn stage(&mut self, pass: Pass);

    /// Write the staged pass atomically and return it.
    async fn commit(&mut self) -> AppResult<Pass>;
}
