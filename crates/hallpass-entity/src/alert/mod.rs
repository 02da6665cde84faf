//! Suspicious-activity alert entities.

pub mod kind;
pub mod model;

pub use kind::{AlertSeverity, AlertType};
pub use model::SuspiciousActivityAlert;
