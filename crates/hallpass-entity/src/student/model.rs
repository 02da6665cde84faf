//! Student entity model.

use serde::{Deserialize, Serialize};

use hallpass_core::types::{LocationId, StudentId};

/// A student as seen by the pass engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Student identifier.
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// The location the student is supervised in right now; passes start
    /// here and `return_to_class` heads back here.
    pub assigned_location_id: LocationId,
}

impl Student {
    /// Create a student record.
    pub fn new(id: StudentId, name: impl Into<String>, assigned_location_id: LocationId) -> Self {
        Self {
            id,
            name: name.into(),
            assigned_location_id,
        }
    }
}
