//! Pass entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hallpass_core::types::{LegId, LocationId, PassId, StudentId, UserId};

use super::leg::{Leg, LegState};
use super::status::PassStatus;

/// A staff member taking responsibility for a pass in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInfo {
    /// The claiming staff member.
    pub user_id: UserId,
    /// Display name at the time of the claim.
    pub user_name: String,
    /// When the claim was made.
    pub timestamp: DateTime<Utc>,
}

/// A student's round trip away from and back to supervision.
///
/// The leg list is append-only and never empty; the last leg is the
/// current one. A closed pass always carries `closed_by` and `closed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pass {
    /// Unique pass identifier, assigned by the persistence layer.
    pub id: PassId,
    /// The student holding the pass.
    pub student_id: StudentId,
    /// Open or closed.
    pub status: PassStatus,
    /// When the pass was created.
    pub created_at: DateTime<Utc>,
    /// When the pass was last mutated.
    pub last_updated_at: DateTime<Utc>,
    /// Journey segments, in order.
    pub legs: Vec<Leg>,
    /// Who closed the pass.
    pub closed_by: Option<String>,
    /// When the pass was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Staff claim, if any.
    pub claimed_by: Option<ClaimInfo>,
}

impl Pass {
    /// Open a pass whose first leg travels from `origin` to `destination`.
    pub fn open(
        id: PassId,
        student_id: StudentId,
        origin: LocationId,
        destination: LocationId,
        at: DateTime<Utc>,
    ) -> Self {
        let mut pass = Self {
            id,
            student_id,
            status: PassStatus::Open,
            created_at: at,
            last_updated_at: at,
            legs: Vec::with_capacity(4),
            closed_by: None,
            closed_at: None,
            claimed_by: None,
        };
        pass.push_leg(origin, destination, LegState::Out, at);
        pass
    }

    /// Check whether the pass is still open.
    pub fn is_open(&self) -> bool {
        self.status == PassStatus::Open
    }

    /// The most recent leg.
    pub fn current_leg(&self) -> Option<&Leg> {
        self.legs.last()
    }

    /// Append a leg with the next leg number and stamp the update time.
    pub fn push_leg(
        &mut self,
        origin: LocationId,
        destination: LocationId,
        state: LegState,
        at: DateTime<Utc>,
    ) -> &Leg {
        let leg_number = self.legs.len() as u32 + 1;
        self.legs.push(Leg {
            id: LegId::new(),
            leg_number,
            origin_location_id: origin,
            destination_location_id: destination,
            state,
            timestamp: at,
        });
        self.last_updated_at = at;
        &self.legs[self.legs.len() - 1]
    }

    /// Flip the pass to closed.
    pub fn mark_closed(&mut self, closed_by: impl Into<String>, at: DateTime<Utc>) {
        self.status = PassStatus::Closed;
        self.closed_by = Some(closed_by.into());
        self.closed_at = Some(at);
        self.last_updated_at = at;
    }

    /// Leg numbers run `1..=n` without gaps or repeats.
    pub fn legs_are_contiguous(&self) -> bool {
        self.legs
            .iter()
            .enumerate()
            .all(|(i, leg)| leg.leg_number as usize == i + 1)
    }

    /// Whole minutes elapsed since the pass was created.
    pub fn open_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_minutes().max(0)
    }
}
