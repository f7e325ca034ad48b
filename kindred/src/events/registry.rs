//! Sink registry for dispatching family events
//!
//! The registry owns every configured sink and dispatches each event to all
//! of them under a per-sink timeout. Failures are logged and never propagate
//! into the operation that produced the event.

use std::sync::Arc;

use tracing::{debug, warn};

use super::sink::EventSink;
use super::types::FamilyEvent;

/// Registry of event sinks.
#[derive(Debug, Clone, Default)]
pub struct SinkRegistry {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl SinkRegistry {
    /// Create an empty registry. Events dispatched to it go nowhere.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Register an additional sink.
    pub fn register(&mut self, sink: Arc<dyn EventSink>) {
        debug!(sink = sink.name(), "event sink registered");
        self.sinks.push(sink);
    }

    /// Builder-style registration for construction sites.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.register(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver one event to every sink, in registration order.
    ///
    /// Each sink gets its own timeout; a sink that errors or times out is
    /// logged and skipped.
    pub async fn emit(&self, event: FamilyEvent) {
        for sink in &self.sinks {
            let timeout = std::time::Duration::from_millis(sink.timeout_ms());
            match tokio::time::timeout(timeout, sink.deliver(&event)).await {
                Ok(Ok(())) => {
                    debug!(sink = sink.name(), kind = event.kind(), "event delivered");
                }
                Ok(Err(err)) => {
                    warn!(
                        sink = sink.name(),
                        kind = event.kind(),
                        error = %err,
                        "event sink failed"
                    );
                }
                Err(_) => {
                    warn!(
                        sink = sink.name(),
                        kind = event.kind(),
                        timeout_ms = sink.timeout_ms(),
                        "event sink timed out"
                    );
                }
            }
        }
    }
}
