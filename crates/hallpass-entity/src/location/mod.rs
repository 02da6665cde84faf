//! Location entities.

pub mod model;

pub use model::{LocationInfo, LocationType};
