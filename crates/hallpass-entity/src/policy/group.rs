//! Student group entity model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use hallpass_core::types::{GroupId, StudentId};

/// Policy signal carried by a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupType {
    /// Members are trusted; informational only.
    Positive,
    /// Members may not move.
    Negative,
}

/// A named cohort of students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Positive or negative.
    pub group_type: GroupType,
    /// Members.
    pub assigned_students: HashSet<StudentId>,
}

impl Group {
    /// Whether `student` belongs to this group.
    pub fn contains(&self, student: StudentId) -> bool {
        self.assigned_students.contains(&student)
    }
}
