//! Event-history entities consumed by the audit monitor.

pub mod model;

pub use model::{AuditEvent, AuditEventType};
