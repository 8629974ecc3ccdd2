//! The event envelope carried on the per-resource channels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical channel names, one per resource type.
pub const PRODUCTS_CHANNEL: &str = "products";
pub const RECOMMENDATIONS_CHANNEL: &str = "recommendations";
pub const REVIEWS_CHANNEL: &str = "reviews";

/// The kind of state change an event describes.
///
/// Serialized as `"CREATE"`/`"DELETE"`; any other value on the wire is a
/// protocol violation and fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Create,
    Delete,
}

/// An immutable event envelope.
///
/// `key` is the entity id and doubles as the partition key on the
/// outgoing message, so all events for one entity are ordered relative to
/// each other. `data` is present iff the event is a CREATE; the
/// constructors are the only way to build an envelope, which keeps that
/// invariant out of reach of callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event<T> {
    pub event_type: EventType,
    pub key: i32,
    pub data: Option<T>,
    pub created_at: DateTime<Utc>,
}

impl<T> Event<T> {
    /// Creates a CREATE envelope carrying the entity payload.
    pub fn create(key: i32, data: T) -> Self {
        Self {
            event_type: EventType::Create,
            key,
            data: Some(data),
            created_at: Utc::now(),
        }
    }

    /// Creates a DELETE envelope. DELETE never carries a payload.
    pub fn delete(key: i32) -> Self {
        Self {
            event_type: EventType::Delete,
            key,
            data: None,
            created_at: Utc::now(),
        }
    }
}
