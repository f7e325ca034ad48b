//! Outbound event notification
//!
//! The engine reports every committed transition (and every rejected
//! command) to registered sinks. Delivery is fire-and-forget: a sink that
//! fails or times out is logged and skipped, never surfacing into the
//! operation that produced the event.

pub mod registry;
pub mod sink;
pub mod types;

pub use registry::SinkRegistry;
pub use sink::{BroadcastEventSink, EventSink, LoggingEventSink, NullEventSink, SinkError};
pub use types::FamilyEvent;
