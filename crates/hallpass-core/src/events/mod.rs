//! Domain events emitted by HallPass operations.
//!
//! Events are published on the in-process [`EventBus`] after the
//! triggering write has been persisted. Subscribers (notification
//! delivery, dashboards) live outside this workspace.

pub mod bus;
pub mod pass;
pub mod security;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::EventBus;
pub use pass::PassEvent;
pub use security::SecurityEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The staff user who caused the event, if any.
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A pass lifecycle event.
    Pass(PassEvent),
    /// A security or monitoring event.
    Security(SecurityEvent),
}

impl DomainEvent {
    /// Create a new domain event stamped with the current time.
    pub fn new(actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Shorthand for a pass event.
    pub fn pass(actor_id: Option<Uuid>, event: PassEvent) -> Self {
        Self::new(actor_id, EventPayload::Pass(event))
    }

    /// Shorthand for a security event.
    pub fn security(actor_id: Option<Uuid>, event: SecurityEvent) -> Self {
        Self::new(actor_id, EventPayload::Security(event))
    }
}
