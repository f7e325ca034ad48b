//! # Kindred
//!
//! Family relationship and reputation engine for game characters. A senior
//! character sponsors at most two juniors, forming a bounded-fanout tree;
//! junior activity earns the senior reputation, capped daily and reset once
//! per day by a background scheduler.
//!
//! The crate centers on a consistency engine: every link, unlink, removal
//! and reputation change is an atomic transition over one or two member
//! records, with cascading cleanup when links disappear.
//!
//! ## Quick start
//!
//! ```rust
//! use kindred::prelude::*;
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> kindred::Result<()> {
//!     let store = Arc::new(InMemoryMemberStore::new());
//!     let manager = FamilyManager::new(store, SinkRegistry::new());
//!
//!     let tenant = Uuid::new_v4();
//!     manager.create_member(1000, tenant, 45, 0, 100_000_000).await?;
//!     manager
//!         .add_junior(1000, 2000, tenant, 40, 0, 100_000_000)
//!         .await?;
//!
//!     manager.register_kill_activity(2000, 25).await?;
//!
//!     let senior = manager.get_member(1000).await?;
//!     assert_eq!(senior.rep(), 10);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **models**: immutable member values built through a validating builder
//! - **storage**: transactional repository contract + in-memory backend
//! - **processor**: the atomic transitions (the only write path)
//! - **service**: workflows composed from processor calls + event emission
//! - **scheduler**: the daily reset loop
//!
//! The separate server crate exposes these operations over REST.

pub mod config;
pub mod events;
pub mod logging;
pub mod models;
pub mod processor;
pub mod scheduler;
pub mod service;
pub mod storage;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::config::{ConfigBuilder, ConfigLoader, KindredConfig, LogFormat, LogLevel};
    pub use crate::events::{
        BroadcastEventSink, EventSink, FamilyEvent, LoggingEventSink, NullEventSink, SinkRegistry,
    };
    pub use crate::models::{
        FamilyMember, MemberBuilder, ValidationError, DAILY_REP_CAP, MAX_JUNIORS, MAX_LEVEL_GAP,
    };
    pub use crate::processor::{BatchResetResult, DissolveError, FamilyProcessor, LinkedPair};
    pub use crate::scheduler::{ResetScheduler, SchedulerConfig};
    pub use crate::service::{FamilyManager, ReputationSummary};
    pub use crate::storage::{InMemoryMemberStore, MemberStore, StoreError};
    pub use crate::{KindredError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Kindred operations.
///
/// A closed enumeration: every rejected command maps onto one variant
/// carrying the ids and amounts involved, so callers can match on the cause
/// instead of comparing strings.
#[derive(Debug, thiserror::Error)]
pub enum KindredError {
    /// No record exists for the character
    #[error("family member {character_id} not found")]
    MemberNotFound { character_id: u32 },

    /// The senior side of a link operation does not exist
    #[error("senior member {senior_id} not found")]
    SeniorNotFound { senior_id: u32 },

    /// The junior side of a link operation does not exist
    #[error("junior member {junior_id} not found")]
    JuniorNotFound { junior_id: u32 },

    /// The senior already sponsors the maximum number of juniors
    #[error("senior {senior_id} already has the maximum number of juniors")]
    SeniorFull { senior_id: u32 },

    /// The junior is already linked under a senior
    #[error("junior {junior_id} is already linked to senior {senior_id}")]
    JuniorAlreadyLinked { junior_id: u32, senior_id: u32 },

    /// The level gap between senior and junior exceeds the allowed range
    #[error(
        "level difference between senior (level {senior_level}) and junior (level {junior_level}) exceeds the maximum allowed"
    )]
    LevelGapTooLarge { senior_level: u16, junior_level: u16 },

    /// Senior and junior are not on the same world and map
    #[error(
        "members must share a location to link (senior at world {senior_world} map {senior_map}, junior at world {junior_world} map {junior_map})"
    )]
    LocationMismatch {
        senior_world: u8,
        senior_map: u32,
        junior_world: u8,
        junior_map: u32,
    },

    /// A character referenced itself as senior or junior
    #[error("character {character_id} cannot be linked to itself")]
    SelfReference { character_id: u32 },

    /// The award would push daily rep past the cap
    #[error(
        "daily reputation cap exceeded for {character_id} (daily rep {daily_rep}, attempted +{attempted})"
    )]
    RepCapExceeded {
        character_id: u32,
        daily_rep: u32,
        attempted: u32,
    },

    /// The deduction exceeds the member's lifetime rep
    #[error(
        "insufficient reputation for {character_id} (available {available}, attempted -{attempted})"
    )]
    InsufficientRep {
        character_id: u32,
        available: u32,
        attempted: u32,
    },

    /// Unlink was requested for a member with no relations
    #[error("no family link exists to break for {character_id}")]
    NoLinkToBreak { character_id: u32 },

    /// A senior award was requested for an unlinked junior
    #[error("junior {junior_id} has no senior to award reputation to")]
    NoSenior { junior_id: u32 },

    /// The activity type is not in the translation table
    #[error("invalid activity type: {activity_type}")]
    InvalidActivityType { activity_type: String },

    /// The character id is already registered
    #[error("family member {character_id} already exists")]
    AlreadyExists { character_id: u32 },

    /// A domain validation rule failed while building a member value
    #[error("validation error: {0}")]
    Validation(#[from] models::ValidationError),

    /// The storage layer failed; the enclosing transaction rolled back
    #[error("storage error: {0}")]
    Storage(#[from] storage::StoreError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("logging error: {0}")]
    Logging(#[from] logging::LogError),
}

impl KindredError {
    /// Stable machine-readable code carried on error events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MemberNotFound { .. } => "MEMBER_NOT_FOUND",
            Self::SeniorNotFound { .. } => "SENIOR_NOT_FOUND",
            Self::JuniorNotFound { .. } => "JUNIOR_NOT_FOUND",
            Self::SeniorFull { .. } => "TOO_MANY_JUNIORS",
            Self::JuniorAlreadyLinked { .. } => "JUNIOR_ALREADY_LINKED",
            Self::LevelGapTooLarge { .. } => "LEVEL_DIFFERENCE_TOO_LARGE",
            Self::LocationMismatch { .. } => "NOT_ON_SAME_MAP",
            Self::SelfReference { .. } => "SELF_REFERENCE",
            Self::RepCapExceeded { .. } => "REP_CAP_EXCEEDED",
            Self::InsufficientRep { .. } => "INSUFFICIENT_REP",
            Self::NoLinkToBreak { .. } => "NO_LINK_TO_BREAK",
            Self::NoSenior { .. } => "NO_SENIOR",
            Self::InvalidActivityType { .. } => "INVALID_ACTIVITY_TYPE",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Storage(_) => "STORAGE_FAILED",
            Self::Configuration(_) => "CONFIGURATION_FAILED",
            Self::Logging(_) => "LOGGING_FAILED",
        }
    }
}

impl From<config::ConfigError> for KindredError {
    fn from(err: config::ConfigError) -> Self {
        KindredError::Configuration(err.to_string())
    }
}

/// Result type for Kindred operations
pub type Result<T> = std::result::Result<T, KindredError>;

/// Initialize the engine with default configuration.
///
/// Sets up logging, an in-memory store and a logging event sink, returning a
/// ready [`service::FamilyManager`].
pub async fn init_with_defaults() -> Result<service::FamilyManager<storage::InMemoryMemberStore>> {
    let config = config::ConfigBuilder::defaults().build()?;
    init(config).await
}

/// Initialize the engine with the provided configuration.
///
/// Installs the configured logging subscriber (tolerating an existing one)
/// and wires a [`service::FamilyManager`] over an in-memory store with a
/// logging event sink.
pub async fn init(
    config: config::KindredConfig,
) -> Result<service::FamilyManager<storage::InMemoryMemberStore>> {
    // Ignore errors if tracing is already initialized
    let _ = logging::init(&config.logging);

    let store = std::sync::Arc::new(storage::InMemoryMemberStore::new());
    let sinks =
        events::SinkRegistry::new().with_sink(std::sync::Arc::new(events::LoggingEventSink));

    Ok(service::FamilyManager::new(store, sinks))
}
