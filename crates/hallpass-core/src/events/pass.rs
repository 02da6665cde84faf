//! Pass lifecycle domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to a pass changing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PassEvent {
    /// A pass was created for a student.
    Created {
        /// The pass ID.
        pass_id: Uuid,
        /// The student holding the pass.
        student_id: Uuid,
        /// Where the student left from.
        origin_id: Uuid,
        /// Where the student is going.
        destination_id: Uuid,
    },
    /// A leg was appended to an open pass.
    LegAdded {
        /// The pass ID.
        pass_id: Uuid,
        /// The student holding the pass.
        student_id: Uuid,
        /// The transition that produced the leg (e.g. `"arrive"`).
        action: String,
        /// 1-based leg number.
        leg_number: u32,
        /// Leg origin.
        origin_id: Uuid,
        /// Leg destination.
        destination_id: Uuid,
    },
    /// A pass was closed.
    Closed {
        /// The pass ID.
        pass_id: Uuid,
        /// The student holding the pass.
        student_id: Uuid,
        /// Who closed it.
        closed_by: String,
    },
    /// A staff member claimed responsibility for a pass.
    Claimed {
        /// The pass ID.
        pass_id: Uuid,
        /// The claiming staff member.
        user_id: Uuid,
    },
}
