//! Immutable family member model
//!
//! A `FamilyMember` is a snapshot of one character's family state. Instances
//! are only constructed through the validating [`MemberBuilder`](super::MemberBuilder);
//! mutations derive a modified copy via [`FamilyMember::to_builder`] so that a
//! partially-updated record is never observable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation;

/// Maximum daily reputation a member can earn before the next reset.
pub const DAILY_REP_CAP: u32 = 5000;

/// Maximum number of juniors a senior can sponsor.
pub const MAX_JUNIORS: usize = 2;

/// Maximum level difference allowed between a senior and a junior at link time.
pub const MAX_LEVEL_GAP: u16 = 20;

/// One character's family state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub(crate) id: u32,
    pub(crate) character_id: u32,
    pub(crate) tenant_id: Uuid,
    pub(crate) senior_id: Option<u32>,
    pub(crate) junior_ids: Vec<u32>,
    pub(crate) rep: u32,
    pub(crate) daily_rep: u32,
    pub(crate) level: u16,
    pub(crate) world: u8,
    pub(crate) map_id: u32,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl FamilyMember {
    /// Internal surrogate key, 0 until first persisted.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// External character identity, unique across the record set.
    pub fn character_id(&self) -> u32 {
        self.character_id
    }

    /// Tenant isolation scope.
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    /// The sponsoring senior's character id, if linked.
    pub fn senior_id(&self) -> Option<u32> {
        self.senior_id
    }

    /// Character ids of sponsored juniors, in insertion order.
    pub fn junior_ids(&self) -> &[u32] {
        &self.junior_ids
    }

    /// Lifetime reputation total.
    pub fn rep(&self) -> u32 {
        self.rep
    }

    /// Reputation earned since the last daily reset.
    pub fn daily_rep(&self) -> u32 {
        self.daily_rep
    }

    pub fn level(&self) -> u16 {
        self.level
    }

    pub fn world(&self) -> u8 {
        self.world
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True if the member is linked under a senior.
    pub fn has_senior(&self) -> bool {
        self.senior_id.is_some()
    }

    /// True if the member sponsors at least one junior.
    pub fn has_juniors(&self) -> bool {
        !self.junior_ids.is_empty()
    }

    pub fn junior_count(&self) -> usize {
        self.junior_ids.len()
    }

    /// True if another junior slot is free.
    pub fn can_add_junior(&self) -> bool {
        self.junior_ids.len() < MAX_JUNIORS
    }

    /// True if the given character is one of this member's juniors.
    pub fn has_junior(&self, character_id: u32) -> bool {
        self.junior_ids.contains(&character_id)
    }

    /// True if the daily reputation cap has been reached.
    pub fn is_rep_cap_reached(&self) -> bool {
        self.daily_rep >= DAILY_REP_CAP
    }

    /// True if `amount` more reputation fits under today's cap.
    pub fn can_receive_rep(&self, amount: u32) -> bool {
        validation::validate_daily_rep_cap(self.daily_rep, amount)
    }

    /// True if the other level is within the allowed gap for linking.
    pub fn is_level_compatible(&self, other_level: u16) -> bool {
        validation::validate_level_difference(self.level, other_level)
    }

    /// True if the other member shares this member's world and map.
    pub fn is_same_location(&self, world: u8, map_id: u32) -> bool {
        validation::validate_same_location(self.world, self.map_id, world, map_id)
    }

    /// Start a builder pre-populated with this member's state.
    pub fn to_builder(&self) -> super::MemberBuilder {
        super::MemberBuilder::from_member(self)
    }

    /// Returns a copy with the surrogate key assigned by the store.
    ///
    /// The record was already validated by the builder; only the key changes.
    pub(crate) fn with_assigned_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }
}
