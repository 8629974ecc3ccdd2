//! Generic event consumer loop.

use std::sync::Arc;

use async_trait::async_trait;
use common::{CompositeError, Event, EventType};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;

use crate::{BusMessage, BusResult, EventBus};

/// Applies CREATE and DELETE events for one resource type.
///
/// Implementations must be idempotent: the channels deliver at least
/// once, so `on_create` with a payload matching the stored entity and
/// `on_delete` for an absent key must both succeed as no-ops.
#[async_trait]
pub trait EventHandler: Send + Sync {
    type Payload: DeserializeOwned + Send;

    async fn on_create(&self, key: i32, payload: Self::Payload) -> Result<(), CompositeError>;

    async fn on_delete(&self, key: i32) -> Result<(), CompositeError>;
}

/// Consumes a channel until it closes, dispatching each envelope to the
/// handler.
///
/// A failure is fatal only for its message: protocol violations
/// (malformed envelope, unknown event type, CREATE without data) and
/// handler domain errors are logged at error severity and the loop moves
/// on. The consumer process itself never dies over one bad message.
pub async fn run_consumer<H: EventHandler>(
    bus: Arc<dyn EventBus>,
    channel: &str,
    handler: H,
) -> BusResult<()> {
    let mut stream = bus.subscribe(channel).await?;
    tracing::info!(%channel, "event consumer started");

    while let Some(message) = stream.next().await {
        match dispatch(&handler, &message).await {
            Ok(()) => {
                metrics::counter!("events_consumed_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("event_processing_failures_total").increment(1);
                tracing::error!(
                    %channel,
                    key = message.partition_key,
                    error = %e,
                    "event processing failed, message dropped"
                );
            }
        }
    }

    tracing::info!(%channel, "event consumer stopped");
    Ok(())
}

async fn dispatch<H: EventHandler>(
    handler: &H,
    message: &BusMessage,
) -> Result<(), CompositeError> {
    let event: Event<H::Payload> = serde_json::from_slice(&message.payload).map_err(|e| {
        CompositeError::EventProcessing(format!(
            "malformed event on channel {}: {e}",
            message.channel
        ))
    })?;

    tracing::debug!(
        channel = %message.channel,
        key = event.key,
        event_type = ?event.event_type,
        created_at = %event.created_at,
        "processing event"
    );

    match event.event_type {
        EventType::Create => {
            let data = event.data.ok_or_else(|| {
                CompositeError::EventProcessing(format!(
                    "CREATE event without data for key {}",
                    event.key
                ))
            })?;
            handler.on_create(event.key, data).await
        }
        EventType::Delete => handler.on_delete(event.key).await,
    }
}
