//! Bounded, key-partitioned event publisher.

use std::sync::Arc;

use common::Event;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::{BusMessage, EventBus};

/// Errors surfaced to the write path when an event cannot be accepted.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The worker queue for this key is full; the caller must fail the
    /// write request rather than block or drop the event.
    #[error("publish queue full, rejecting event for key {key}")]
    QueueFull { key: i32 },

    /// The worker task has stopped; only happens during shutdown.
    #[error("publish worker stopped")]
    WorkerStopped,

    #[error("failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Hands event envelopes to the bus from a dedicated bounded worker pool.
///
/// Serialization happens once, on the caller; the actual send runs on one
/// of `pool_size` worker tasks so a slow or congested bus never occupies a
/// request-handling task. Each worker owns a FIFO queue of `queue_depth`
/// entries, and an envelope is routed to its worker by `key % pool_size`:
/// events sharing a key always traverse the same queue in submission
/// order, which is what preserves per-entity ordering end to end.
///
/// `publish` returns as soon as the envelope is accepted into a queue. A
/// full queue fails fast with [`PublishError::QueueFull`] instead of
/// absorbing unbounded backpressure.
#[derive(Clone)]
pub struct EventPublisher {
    workers: Vec<mpsc::Sender<BusMessage>>,
}

impl EventPublisher {
    /// Spawns the worker pool. Must be called from within a tokio runtime.
    pub fn new(bus: Arc<dyn EventBus>, pool_size: usize, queue_depth: usize) -> Self {
        let pool_size = pool_size.max(1);
        let queue_depth = queue_depth.max(1);

        let mut workers = Vec::with_capacity(pool_size);
        for worker in 0..pool_size {
            let (tx, mut rx) = mpsc::channel::<BusMessage>(queue_depth);
            let bus = bus.clone();
            tokio::spawn(async move {
                while let Some(message) = rx.recv().await {
                    let channel = message.channel.clone();
                    let key = message.partition_key;
                    match bus.publish(message).await {
                        Ok(()) => {
                            metrics::counter!("events_published_total").increment(1);
                        }
                        Err(e) => {
                            // The caller already saw "accepted"; all we can
                            // do here is record the loss loudly.
                            metrics::counter!("events_publish_failures_total").increment(1);
                            tracing::error!(worker, %channel, key, error = %e, "failed to publish event");
                        }
                    }
                }
            });
            workers.push(tx);
        }

        tracing::info!(pool_size, queue_depth, "created event publisher pool");
        Self { workers }
    }

    /// Serializes the envelope and enqueues it for its key's worker.
    pub fn publish<T: Serialize>(
        &self,
        channel: &str,
        event: &Event<T>,
    ) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(event)?;
        let message = BusMessage::new(channel, event.key, payload);

        let worker = (event.key as i64).rem_euclid(self.workers.len() as i64) as usize;
        tracing::debug!(%channel, key = event.key, event_type = ?event.event_type, worker, "enqueueing event");

        self.workers[worker].try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => PublishError::QueueFull { key: event.key },
            TrySendError::Closed(_) => PublishError::WorkerStopped,
        })
    }
}
