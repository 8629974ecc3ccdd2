//! In-memory implementation of the [`EventBus`] trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use tokio::sync::broadcast;

use crate::{BusError, BusMessage, BusResult, EventBus};

/// Event bus backed by one tokio broadcast channel per logical channel.
///
/// Suitable for tests and for running the whole platform in one process.
/// Each channel delivers messages to all subscribers in publish order,
/// which trivially satisfies the per-key ordering contract. A subscriber
/// that falls more than `capacity` messages behind loses the oldest ones;
/// that is the at-least-once/lag trade-off, and it is logged.
#[derive(Clone)]
pub struct InMemoryBus {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<BusMessage>>>>,
    capacity: usize,
}

impl InMemoryBus {
    /// Creates a bus whose channels buffer up to 1000 messages each.
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Creates a bus with a custom per-channel buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity,
        }
    }

    fn sender_for(&self, channel: &str) -> broadcast::Sender<BusMessage> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryBus {
    async fn publish(&self, message: BusMessage) -> BusResult<()> {
        let sender = self.sender_for(&message.channel);
        // A send error only means there are no subscribers yet; the
        // messages are simply dropped, which callers accept on this bus.
        let _ = sender.send(message);
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> BusResult<BoxStream<'static, BusMessage>> {
        let mut receiver = self.sender_for(channel).subscribe();
        let channel = channel.to_string();

        let stream = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(msg) => yield msg,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%channel, skipped, "subscriber lagged, messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        Ok(stream.boxed())
    }
}
