//! In-memory repository implementations backed by `DashMap`.
//!
//! Suitable for single-node deployments and tests. Nothing here survives
//! a restart.

pub mod event_log;
pub mod location;
pub mod pass;
pub mod policy;
pub mod settings;

pub use event_log::MemoryEventLogRepository;
pub use location::MemoryLocationRepository;
pub use pass::MemoryPassRepository;
pub use policy::MemoryPolicyRepository;
pub use settings::MemorySettingsRepository;
