//! Pass and leg entities.

pub mod action;
pub mod leg;
pub mod model;
pub mod status;

pub use action::PassAction;
pub use leg::{Leg, LegState};
pub use model::{ClaimInfo, Pass};
pub use status::PassStatus;
