//! Event channels for the composite platform.
//!
//! One logical channel per resource type (`products`, `recommendations`,
//! `reviews`). Delivery is at-least-once: a message may reach a consumer
//! zero, one, or several times, so every consumer must be idempotent.
//! Order is only guaranteed per partition key, which is the entity id.
//!
//! The [`EventBus`] trait is the swap point between the in-memory bus
//! used for tests and single-process deployments and any broker-backed
//! implementation. A replacement impl must preserve per-key order or the
//! CREATE/DELETE state machine downstream breaks.

pub mod consumer;
pub mod memory;
pub mod publisher;

pub use consumer::{EventHandler, run_consumer};
pub use memory::InMemoryBus;
pub use publisher::{EventPublisher, PublishError};

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// A message on a logical channel.
///
/// `partition_key` equals the envelope's `key`; the bus and publisher
/// together guarantee that messages sharing a key are delivered in
/// publish order.
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub channel: String,
    pub partition_key: i32,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(channel: impl Into<String>, partition_key: i32, payload: Vec<u8>) -> Self {
        Self {
            channel: channel.into(),
            partition_key,
            payload,
        }
    }
}

/// Errors that can occur when using the event bus.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to publish message: {0}")]
    Publish(String),

    #[error("failed to subscribe to channel: {0}")]
    Subscribe(String),
}

/// Result type for event bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// A channel-based message bus with per-key ordered, at-least-once delivery.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes a message on its channel. Every current subscriber of
    /// the channel receives it.
    async fn publish(&self, message: BusMessage) -> BusResult<()>;

    /// Subscribes to a channel, receiving every message published after
    /// the subscription is established.
    async fn subscribe(&self, channel: &str) -> BusResult<BoxStream<'static, BusMessage>>;
}
