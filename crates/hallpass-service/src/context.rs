//! Request context carrying the acting staff member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hallpass_core::types::UserId;

/// Who is acting on the current request.
///
/// Built by the caller's auth layer and passed into every service method
/// so rate limiting and history know the actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user.
    pub user_id: UserId,
    /// Display name, recorded as `closed_by` and on claims.
    pub user_name: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Create a context stamped with the current time.
    pub fn new(user_id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            request_time: Utc::now(),
        }
    }

    /// Override the request time.
    pub fn at(mut self, request_time: DateTime<Utc>) -> Self {
        self.request_time = request_time;
        self
    }
}
