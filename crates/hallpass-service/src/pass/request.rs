//! Request payloads accepted by the pass service.

use serde::{Deserialize, Serialize};
use validator::Validate;

use hallpass_core::error::AppError;
use hallpass_core::result::AppResult;
use hallpass_core::types::{LocationId, PassId, StudentId};
use hallpass_entity::student::Student;

/// Data for creating a pass.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePassRequest {
    /// The student leaving.
    pub student_id: StudentId,
    /// Student display name.
    #[validate(length(min = 1, max = 200, message = "Student name must be 1-200 characters"))]
    pub student_name: String,
    /// Where the student is supervised right now.
    pub assigned_location_id: LocationId,
    /// Where the student is going.
    pub destination_location_id: LocationId,
    /// Optional free-text note recorded in history.
    pub note: Option<String>,
}

impl CreatePassRequest {
    /// The student this request is for.
    pub fn student(&self) -> Student {
        Student::new(
            self.student_id,
            self.student_name.clone(),
            self.assigned_location_id,
        )
    }

    /// Run field validation plus the configurable note length check.
    pub(crate) fn check(&self, max_note_length: usize) -> AppResult<()> {
        self.validate()?;
        if self.destination_location_id == self.assigned_location_id {
            return Err(AppError::validation(
                "Destination must differ from the student's current location",
            ));
        }
        if let Some(note) = &self.note {
            if note.chars().count() > max_note_length {
                return Err(AppError::validation(format!(
                    "Note must be at most {max_note_length} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Data for moving an existing pass along.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransitionRequest {
    /// The pass to act on.
    pub pass_id: PassId,
    /// Action name, e.g. `"arrive"` or `"new_destination"`.
    #[validate(length(min = 1, message = "Action is required"))]
    pub action: String,
    /// Required for `new_destination`.
    pub destination_location_id: Option<LocationId>,
    /// The student holding the pass, with their current assignment.
    pub student: Student,
}
