//! Policy data lookup trait.

use async_trait::async_trait;

use hallpass_core::result::AppResult;
use hallpass_core::types::{LocationId, StudentId};
use hallpass_entity::policy::{Group, LocationRule, Restriction};

/// Read access to restrictions, groups and location rules.
#[async_trait]
pub trait PolicyRepository: Send + Sync + std::fmt::Debug {
    /// All restrictions recorded for a student, active or not.
    async fn restrictions_for_student(&self, student_id: StudentId) -> AppResult<Vec<Restriction>>;

    /// All groups the student is a member of.
    async fn groups_for_student(&self, student_id: StudentId) -> AppResult<Vec<Group>>;

    /// The location-wide rule, if one is configured.
    async fn location_rule(&self, location_id: LocationId) -> AppResult<Option<LocationRule>>;

    /// A per-student override for the location, if one exists.
    async fn student_override(
        &self,
        location_id: LocationId,
        student_id: StudentId,
    ) -> AppResult<Option<LocationRule>>;
}
