//! Application state management

use kindred::events::FamilyEvent;
use kindred::service::FamilyManager;
use kindred::storage::InMemoryMemberStore;
use tokio::sync::broadcast;

use crate::config::ServerConfig;

/// Application state shared across all handlers
#[derive(Debug)]
pub struct AppState {
    /// Kindred family manager
    pub manager: FamilyManager<InMemoryMemberStore>,

    /// Server configuration
    pub config: ServerConfig,

    /// Broadcast feed of family events, for in-process subscribers
    pub events: broadcast::Sender<FamilyEvent>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        manager: FamilyManager<InMemoryMemberStore>,
        config: ServerConfig,
        events: broadcast::Sender<FamilyEvent>,
    ) -> Self {
        Self {
            manager,
            config,
            events,
        }
    }

    /// Subscribe to the family event feed
    pub fn subscribe_events(&self) -> broadcast::Receiver<FamilyEvent> {
        self.events.subscribe()
    }
}
