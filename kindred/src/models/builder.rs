//! Fluent, validating builder for [`FamilyMember`]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::member::FamilyMember;
use super::validation::{self, ValidationError};

/// Builder for constructing validated [`FamilyMember`] values.
///
/// `build` runs every domain validation; an invalid combination never
/// produces a member value.
#[derive(Debug, Clone)]
pub struct MemberBuilder {
    id: u32,
    character_id: u32,
    tenant_id: Uuid,
    senior_id: Option<u32>,
    junior_ids: Vec<u32>,
    rep: u32,
    daily_rep: u32,
    level: u16,
    world: u8,
    map_id: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberBuilder {
    /// Create a builder with the required identity and location parameters.
    pub fn new(character_id: u32, tenant_id: Uuid, level: u16, world: u8, map_id: u32) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            character_id,
            tenant_id,
            senior_id: None,
            junior_ids: Vec::new(),
            rep: 0,
            daily_rep: 0,
            level,
            world,
            map_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Start from an existing member (copy-on-write modification).
    pub(crate) fn from_member(member: &FamilyMember) -> Self {
        Self {
            id: member.id,
            character_id: member.character_id,
            tenant_id: member.tenant_id,
            senior_id: member.senior_id,
            junior_ids: member.junior_ids.clone(),
            rep: member.rep,
            daily_rep: member.daily_rep,
            level: member.level,
            world: member.world,
            map_id: member.map_id,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn senior_id(mut self, senior_id: u32) -> Self {
        self.senior_id = Some(senior_id);
        self
    }

    pub fn clear_senior_id(mut self) -> Self {
        self.senior_id = None;
        self
    }

    pub fn junior_ids(mut self, junior_ids: Vec<u32>) -> Self {
        self.junior_ids = junior_ids;
        self
    }

    pub fn add_junior(mut self, junior_id: u32) -> Self {
        self.junior_ids.push(junior_id);
        self
    }

    pub fn remove_junior(mut self, junior_id: u32) -> Self {
        if let Some(pos) = self.junior_ids.iter().position(|&id| id == junior_id) {
            self.junior_ids.remove(pos);
        }
        self
    }

    pub fn rep(mut self, rep: u32) -> Self {
        self.rep = rep;
        self
    }

    pub fn add_rep(mut self, amount: u32) -> Self {
        self.rep = self.rep.saturating_add(amount);
        self
    }

    /// Subtract reputation, flooring at zero.
    pub fn subtract_rep(mut self, amount: u32) -> Self {
        self.rep = self.rep.saturating_sub(amount);
        self
    }

    pub fn daily_rep(mut self, daily_rep: u32) -> Self {
        self.daily_rep = daily_rep;
        self
    }

    pub fn add_daily_rep(mut self, amount: u32) -> Self {
        self.daily_rep = self.daily_rep.saturating_add(amount);
        self
    }

    pub fn reset_daily_rep(mut self) -> Self {
        self.daily_rep = 0;
        self
    }

    pub fn level(mut self, level: u16) -> Self {
        self.level = level;
        self
    }

    pub fn world(mut self, world: u8) -> Self {
        self.world = world;
        self
    }

    pub fn map_id(mut self, map_id: u32) -> Self {
        self.map_id = map_id;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Refresh the modification timestamp.
    pub fn touch(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }

    /// Validate every domain rule and construct the immutable member.
    pub fn build(self) -> Result<FamilyMember, ValidationError> {
        validation::validate_character_id(self.character_id)?;
        validation::validate_tenant_id(self.tenant_id)?;
        validation::validate_level(self.level)?;
        validation::validate_junior_set(self.character_id, &self.junior_ids)?;
        validation::validate_senior(self.character_id, self.senior_id)?;
        validation::validate_daily_rep(self.daily_rep)?;

        Ok(FamilyMember {
            id: self.id,
            character_id: self.character_id,
            tenant_id: self.tenant_id,
            senior_id: self.senior_id,
            junior_ids: self.junior_ids,
            rep: self.rep,
            daily_rep: self.daily_rep,
            level: self.level,
            world: self.world,
            map_id: self.map_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
