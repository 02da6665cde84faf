//! Read-only summary of what a pass can do next.

use serde::{Deserialize, Serialize};

use hallpass_core::types::LocationId;
use hallpass_entity::pass::{LegState, PassAction};

/// What the current leg means for the person looking at the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    /// Whether the current leg is a restroom trip.
    pub is_restroom_trip: bool,
    /// Where the student currently is or is heading.
    pub current_location_id: LocationId,
    /// State of the current leg.
    pub leg_state: LegState,
    /// Name of the place the student returns to.
    pub return_location_name: String,
    /// Whether `arrive` is offered right now.
    pub can_arrive: bool,
    /// Every transition that would currently be accepted.
    pub available_actions: Vec<PassAction>,
}
