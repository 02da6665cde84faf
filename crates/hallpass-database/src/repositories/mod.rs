//! Repository traits for every collaborator the engine consumes.

pub mod event_log;
pub mod location;
pub mod pass;
pub mod policy;
pub mod settings;

pub use event_log::EventLogRepository;
pub use location::LocationRepository;
pub use pass::{PassRepository, PassTransaction};
pub use policy::PolicyRepository;
pub use settings::SettingsRepository;
