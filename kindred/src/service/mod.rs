//! Family manager: coordination workflows over the processor
//!
//! This module provides the primary interface for interacting with the
//! family system. It composes processor transitions with existence-ensuring
//! upserts and, after each outcome, notifies the configured event sinks:
//! success events for committed transitions, error events for rejected
//! commands. Sink delivery is fire-and-forget and never affects the result
//! returned to the caller.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::events::{FamilyEvent, SinkRegistry};
use crate::models::{FamilyMember, MemberBuilder, DAILY_REP_CAP};
use crate::processor::{
    BatchResetResult, DissolveError, FamilyProcessor, LinkedPair, RepAward,
};
use crate::storage::traits::MemberStore;
use crate::{KindredError, Result};

/// Reputation standing for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationSummary {
    pub character_id: u32,
    pub rep: u32,
    pub daily_rep: u32,
    pub daily_rep_cap: u32,
    pub remaining_daily_rep: u32,
}

/// The primary interface for interacting with the family system.
#[derive(Debug)]
pub struct FamilyManager<S: MemberStore> {
    processor: FamilyProcessor<S>,
    store: Arc<S>,
    sinks: SinkRegistry,
}

impl<S: MemberStore> Clone for FamilyManager<S> {
    fn clone(&self) -> Self {
        Self {
            processor: self.processor.clone(),
            store: Arc::clone(&self.store),
            sinks: self.sinks.clone(),
        }
    }
}

impl<S: MemberStore> FamilyManager<S> {
    /// Create a manager over the given store, notifying the given sinks.
    pub fn new(store: Arc<S>, sinks: SinkRegistry) -> Self {
        Self {
            processor: FamilyProcessor::new(Arc::clone(&store)),
            store,
            sinks,
        }
    }

    /// The underlying processor, for callers that need raw transitions.
    pub fn processor(&self) -> &FamilyProcessor<S> {
        &self.processor
    }

    // =========================================================================
    // Member lifecycle
    // =========================================================================

    /// Register a new root member. Fails with `AlreadyExists` when the
    /// character id is taken.
    pub async fn create_member(
        &self,
        character_id: u32,
        tenant_id: Uuid,
        level: u16,
        world: u8,
        map_id: u32,
    ) -> Result<FamilyMember> {
        info!(character_id, %tenant_id, level, world, "creating family member");

        self.store
            .transact(move |tx| {
                if tx.exists(character_id)? {
                    return Err(KindredError::AlreadyExists { character_id });
                }
                let member =
                    MemberBuilder::new(character_id, tenant_id, level, world, map_id).build()?;
                Ok(tx.save(member)?)
            })
            .await
    }

    /// Idempotent upsert: create the member when absent, otherwise sync its
    /// level and location to the supplied values. The sync is bookkeeping,
    /// not a business event, so no notification is raised.
    pub async fn ensure_member_exists(
        &self,
        character_id: u32,
        tenant_id: Uuid,
        level: u16,
        world: u8,
        map_id: u32,
    ) -> Result<FamilyMember> {
        self.store
            .transact(move |tx| {
                let Some(member) = tx.get(character_id)? else {
                    let member =
                        MemberBuilder::new(character_id, tenant_id, level, world, map_id)
                            .build()?;
                    return Ok(tx.save(member)?);
                };

                if member.level() == level
                    && member.world() == world
                    && member.map_id() == map_id
                {
                    return Ok(member);
                }

                let synced = member
                    .to_builder()
                    .level(level)
                    .world(world)
                    .map_id(map_id)
                    .touch()
                    .build()?;
                Ok(tx.save(synced)?)
            })
            .await
    }

    /// Remove a member permanently, cascading to every record referencing
    /// it. Emits a link-broken event per severed relation.
    pub async fn remove_member(
        &self,
        character_id: u32,
        reason: &str,
    ) -> Result<Vec<FamilyMember>> {
        let member = self.processor.get_by_character_id(character_id).await?;

        match self.processor.remove(character_id).await {
            Ok(updated) => {
                self.emit_links_broken(&member, reason).await;
                Ok(updated)
            }
            Err(err) => {
                self.emit_link_error(member.senior_id().unwrap_or(0), character_id, &err)
                    .await;
                Err(err)
            }
        }
    }

    // =========================================================================
    // Link workflows
    // =========================================================================

    /// Link a junior under an existing senior.
    ///
    /// The junior is created lazily when absent, and its level/location are
    /// synced to the supplied values first, so the link check sees current
    /// data. The senior must already be registered.
    pub async fn add_junior(
        &self,
        senior_id: u32,
        junior_id: u32,
        tenant_id: Uuid,
        junior_level: u16,
        world: u8,
        map_id: u32,
    ) -> Result<LinkedPair> {
        info!(senior_id, junior_id, junior_level, "adding junior to family");

        if !self.store.exists(senior_id).await? {
            let err = KindredError::SeniorNotFound { senior_id };
            self.emit_link_error(senior_id, junior_id, &err).await;
            return Err(err);
        }

        self.ensure_member_exists(junior_id, tenant_id, junior_level, world, map_id)
            .await?;

        match self.processor.link(senior_id, junior_id).await {
            Ok(pair) => {
                self.sinks
                    .emit(FamilyEvent::LinkCreated {
                        senior_id,
                        junior_id,
                        timestamp: Utc::now(),
                    })
                    .await;
                Ok(pair)
            }
            Err(err) => {
                self.emit_link_error(senior_id, junior_id, &err).await;
                Err(err)
            }
        }
    }

    /// Break every link the member participates in, emitting link-broken
    /// per severed relation.
    pub async fn break_link(&self, character_id: u32, reason: &str) -> Result<Vec<FamilyMember>> {
        let member = self.processor.get_by_character_id(character_id).await?;

        match self.processor.unlink(character_id).await {
            Ok(updated) => {
                self.emit_links_broken(&member, reason).await;
                Ok(updated)
            }
            Err(err) => {
                self.emit_link_error(member.senior_id().unwrap_or(0), character_id, &err)
                    .await;
                Err(err)
            }
        }
    }

    /// Dissolve a senior's subtree: remove each direct junior, then the
    /// senior. Partial failure is reported with the members already updated.
    pub async fn dissolve_subtree(
        &self,
        senior_id: u32,
        reason: &str,
    ) -> std::result::Result<Vec<FamilyMember>, DissolveError> {
        let senior = self
            .processor
            .get_by_character_id(senior_id)
            .await
            .map_err(|source| DissolveError {
                updated: Vec::new(),
                source,
            })?;

        let mut affected_ids: Vec<u32> = senior.junior_ids().to_vec();
        affected_ids.push(senior_id);

        match self.processor.dissolve_subtree(senior_id).await {
            Ok(updated) => {
                self.sinks
                    .emit(FamilyEvent::TreeDissolved {
                        senior_id,
                        affected_ids,
                        reason: reason.to_string(),
                        timestamp: Utc::now(),
                    })
                    .await;
                Ok(updated)
            }
            Err(err) => {
                self.emit_link_error(senior_id, 0, &err.source).await;
                Err(err)
            }
        }
    }

    // =========================================================================
    // Reputation workflows
    // =========================================================================

    /// Credit reputation to a member directly.
    pub async fn award_rep(
        &self,
        character_id: u32,
        amount: u32,
        source: &str,
    ) -> Result<FamilyMember> {
        match self.processor.award_rep(character_id, amount).await {
            Ok(member) => {
                self.sinks
                    .emit(FamilyEvent::RepGained {
                        character_id,
                        amount,
                        daily_rep: member.daily_rep(),
                        source: source.to_string(),
                        timestamp: Utc::now(),
                    })
                    .await;
                Ok(member)
            }
            Err(err) => {
                self.emit_rep_error(character_id, amount, &err).await;
                Err(err)
            }
        }
    }

    /// Spend reputation from a member's lifetime total.
    pub async fn deduct_rep(
        &self,
        character_id: u32,
        amount: u32,
        reason: &str,
    ) -> Result<FamilyMember> {
        match self.processor.deduct_rep(character_id, amount).await {
            Ok(member) => {
                self.sinks
                    .emit(FamilyEvent::RepRedeemed {
                        character_id,
                        amount,
                        reason: reason.to_string(),
                        timestamp: Utc::now(),
                    })
                    .await;
                Ok(member)
            }
            Err(err) => {
                self.emit_rep_error(character_id, amount, &err).await;
                Err(err)
            }
        }
    }

    /// Credit a junior's activity to its senior, with the over-level penalty
    /// and daily cap applied.
    pub async fn award_rep_to_senior(
        &self,
        junior_id: u32,
        amount: u32,
        source: &str,
    ) -> Result<RepAward> {
        match self
            .processor
            .award_rep_to_senior(junior_id, amount, source)
            .await
        {
            Ok(award) => {
                self.emit_rep_gained(&award, source).await;
                Ok(award)
            }
            Err(err) => {
                self.emit_rep_error(junior_id, amount, &err).await;
                Err(err)
            }
        }
    }

    /// Register a junior's kill tally (2 rep per 5 kills to the senior).
    /// A tally that floors to zero awards nothing and raises no event.
    pub async fn register_kill_activity(
        &self,
        junior_id: u32,
        kill_count: u32,
    ) -> Result<Option<RepAward>> {
        self.register_activity(junior_id, "mob_kill", kill_count, "mob_kills")
            .await
    }

    /// Register a junior's expedition reward (10 rep per coin to the senior).
    pub async fn register_expedition_activity(
        &self,
        junior_id: u32,
        coin_reward: u32,
    ) -> Result<Option<RepAward>> {
        self.register_activity(junior_id, "expedition", coin_reward, "expedition")
            .await
    }

    async fn register_activity(
        &self,
        junior_id: u32,
        activity_type: &str,
        value: u32,
        source: &str,
    ) -> Result<Option<RepAward>> {
        match self
            .processor
            .process_activity(junior_id, activity_type, value)
            .await
        {
            Ok(Some(award)) => {
                self.emit_rep_gained(&award, source).await;
                Ok(Some(award))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.emit_rep_error(junior_id, value, &err).await;
                Err(err)
            }
        }
    }

    /// Reset every member's daily rep, emitting the audit event with the
    /// affected-row count. Invoked by the scheduler and the admin surface.
    pub async fn reset_daily_rep(&self) -> Result<BatchResetResult> {
        match self.processor.reset_daily_rep().await {
            Ok(result) => {
                self.sinks
                    .emit(FamilyEvent::RepReset {
                        affected_count: result.affected_count,
                        timestamp: result.reset_at,
                    })
                    .await;
                Ok(result)
            }
            Err(err) => {
                self.emit_rep_error(0, 0, &err).await;
                Err(err)
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Look up one member.
    pub async fn get_member(&self, character_id: u32) -> Result<FamilyMember> {
        self.processor.get_by_character_id(character_id).await
    }

    /// The member with its senior and direct juniors.
    pub async fn get_family_tree(&self, character_id: u32) -> Result<Vec<FamilyMember>> {
        self.processor.get_family_tree(character_id).await
    }

    /// Reputation standing for one member.
    pub async fn get_reputation(&self, character_id: u32) -> Result<ReputationSummary> {
        let member = self.processor.get_by_character_id(character_id).await?;
        Ok(ReputationSummary {
            character_id,
            rep: member.rep(),
            daily_rep: member.daily_rep(),
            daily_rep_cap: DAILY_REP_CAP,
            remaining_daily_rep: DAILY_REP_CAP.saturating_sub(member.daily_rep()),
        })
    }

    // =========================================================================
    // Event helpers
    // =========================================================================

    async fn emit_rep_gained(&self, award: &RepAward, source: &str) {
        self.sinks
            .emit(FamilyEvent::RepGained {
                character_id: award.senior.character_id(),
                amount: award.awarded,
                daily_rep: award.senior.daily_rep(),
                source: source.to_string(),
                timestamp: Utc::now(),
            })
            .await;
    }

    /// One link-broken event per relation the member had before the cascade.
    async fn emit_links_broken(&self, member: &FamilyMember, reason: &str) {
        if let Some(senior_id) = member.senior_id() {
            self.sinks
                .emit(FamilyEvent::LinkBroken {
                    senior_id,
                    junior_id: member.character_id(),
                    reason: reason.to_string(),
                    timestamp: Utc::now(),
                })
                .await;
        }
        for &junior_id in member.junior_ids() {
            self.sinks
                .emit(FamilyEvent::LinkBroken {
                    senior_id: member.character_id(),
                    junior_id,
                    reason: reason.to_string(),
                    timestamp: Utc::now(),
                })
                .await;
        }
    }

    async fn emit_link_error(&self, senior_id: u32, junior_id: u32, err: &KindredError) {
        self.sinks
            .emit(FamilyEvent::LinkError {
                senior_id,
                junior_id,
                code: err.code().to_string(),
                message: err.to_string(),
                timestamp: Utc::now(),
            })
            .await;
    }

    async fn emit_rep_error(&self, character_id: u32, amount: u32, err: &KindredError) {
        self.sinks
            .emit(FamilyEvent::RepError {
                character_id,
                code: err.code().to_string(),
                message: err.to_string(),
                amount,
                timestamp: Utc::now(),
            })
            .await;
    }
}
