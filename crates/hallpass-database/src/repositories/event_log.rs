//! Event history trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use hallpass_core::result::AppResult;
use hallpass_core::types::StudentId;
use hallpass_entity::event::AuditEvent;

/// Append-only per-student event history.
#[async_trait]
pub trait EventLogRepository: Send + Sync + std::fmt::Debug {
    /// Events for the student at or after `since`, oldest first.
    async fn events_since(
        &self,
        student_id: StudentId,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<AuditEvent>>;

    /// Append one event.
    async fn append(&self, event: AuditEvent) -> AppResult<()>;
}
