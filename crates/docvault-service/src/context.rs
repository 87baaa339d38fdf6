//! Request context carrying the acting owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current request.
///
/// Authentication happens upstream; by the time a request reaches the
/// services it has been resolved to an owner identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting owner's ID.
    pub owner_id: Uuid,
    /// Human-readable actor label for audit logging (e.g., a username).
    pub actor: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(owner_id: Uuid, actor: impl Into<String>) -> Self {
        Self {
            owner_id,
            actor: actor.into(),
            request_time: Utc::now(),
        }
    }
}
