//! # hallpass-database
//!
//! Persistence collaborator traits consumed by the pass lifecycle engine,
//! plus in-memory implementations of each for single-node deployments
//! and tests.

pub mod memory;
pub mod repositories;

pub use memory::{
    MemoryEventLogRepository, MemoryLocationRepository, MemoryPassRepository,
    MemoryPolicyRepository, MemorySettingsRepository,
};
pub use repositories::{
    EventLogRepository, LocationRepository, PassRepository, PassTransaction, PolicyRepository,
    SettingsRepository,
};
