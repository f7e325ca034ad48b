//! Event sink contract and built-in sinks

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::types::FamilyEvent;

/// Error returned by a sink that failed to deliver an event.
#[derive(Debug, Clone, thiserror::Error)]
#[error("sink delivery failed: {0}")]
pub struct SinkError(pub String);

/// A destination for family events.
///
/// Sinks are notified after the originating operation has committed (or been
/// rejected); they cannot veto or roll anything back. A sink that errors or
/// exceeds its timeout is logged by the registry and skipped.
#[async_trait]
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Deliver one event.
    async fn deliver(&self, event: &FamilyEvent) -> Result<(), SinkError>;

    /// Descriptive name used in logs.
    fn name(&self) -> &str {
        "anonymous_sink"
    }

    /// Per-delivery timeout in milliseconds.
    fn timeout_ms(&self) -> u64 {
        5000
    }
}

/// Sink that writes every event to the tracing log.
#[derive(Debug, Default)]
pub struct LoggingEventSink;

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn deliver(&self, event: &FamilyEvent) -> Result<(), SinkError> {
        tracing::info!(
            kind = event.kind(),
            character_id = ?event.character_id(),
            event = ?event,
            "family event"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}

/// Sink that fans events out over a tokio broadcast channel.
///
/// Used by the server to feed in-process subscribers. A send with no active
/// receivers is not an error.
#[derive(Debug)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<FamilyEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn sender(&self) -> broadcast::Sender<FamilyEvent> {
        self.sender.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FamilyEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn deliver(&self, event: &FamilyEvent) -> Result<(), SinkError> {
        // A lagging or absent receiver is the subscriber's problem.
        let _ = self.sender.send(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "broadcast"
    }
}

/// Sink that discards every event. Useful in tests.
#[derive(Debug, Default)]
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn deliver(&self, _event: &FamilyEvent) -> Result<(), SinkError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
