//! Relationship processor: atomic family state transitions
//!
//! Every public operation here is one atomic transition over one or two
//! member records (plus the batch reset). Two-record writes never leave a
//! transaction half-applied: the senior's junior list and the junior's senior
//! pointer always agree after a commit. Callers must not mutate one side of a
//! relationship independently; these methods are the only write path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::FamilyMember;
use crate::storage::traits::{MemberStore, MemberTx};
use crate::KindredError;

#[cfg(test)]
mod tests;

/// Both sides of a freshly created link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedPair {
    pub senior: FamilyMember,
    pub junior: FamilyMember,
}

/// Result of a senior reputation award, including the amount actually
/// credited after any over-level penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct RepAward {
    pub senior: FamilyMember,
    pub awarded: u32,
}

/// Outcome of the batch daily reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchResetResult {
    pub affected_count: u64,
    pub reset_at: DateTime<Utc>,
}

/// Failure partway through a subtree dissolution.
///
/// Dissolution is intentionally not one transaction across the whole
/// subtree: each member removal commits on its own. `updated` holds every
/// record that was successfully rewritten before the failing step so the
/// caller can decide whether to retry the remainder.
#[derive(Debug, thiserror::Error)]
#[error("subtree dissolution failed after {} member update(s): {source}", .updated.len())]
pub struct DissolveError {
    pub updated: Vec<FamilyMember>,
    #[source]
    pub source: KindredError,
}

/// Atomic relationship and reputation transitions over a member store.
#[derive(Debug)]
pub struct FamilyProcessor<S: MemberStore> {
    store: Arc<S>,
}

impl<S: MemberStore> Clone for FamilyProcessor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: MemberStore> FamilyProcessor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Link `junior_id` under `senior_id`.
    ///
    /// Preconditions are checked and both records rewritten inside one
    /// transaction, so a concurrent link cannot slip past the junior-slot
    /// check.
    pub async fn link(&self, senior_id: u32, junior_id: u32) -> Result<LinkedPair, KindredError> {
        info!(senior_id, junior_id, "linking junior under senior");

        if senior_id == junior_id {
            return Err(KindredError::SelfReference {
                character_id: senior_id,
            });
        }

        self.store
            .transact(move |tx| {
                let senior = tx
                    .get(senior_id)?
                    .ok_or(KindredError::SeniorNotFound { senior_id })?;

                if !senior.can_add_junior() {
                    return Err(KindredError::SeniorFull { senior_id });
                }

                let junior = tx
                    .get(junior_id)?
                    .ok_or(KindredError::JuniorNotFound { junior_id })?;

                if let Some(existing_senior) = junior.senior_id() {
                    return Err(KindredError::JuniorAlreadyLinked {
                        junior_id,
                        senior_id: existing_senior,
                    });
                }

                if !senior.is_level_compatible(junior.level()) {
                    return Err(KindredError::LevelGapTooLarge {
                        senior_level: senior.level(),
                        junior_level: junior.level(),
                    });
                }

                if !senior.is_same_location(junior.world(), junior.map_id()) {
                    return Err(KindredError::LocationMismatch {
                        senior_world: senior.world(),
                        senior_map: senior.map_id(),
                        junior_world: junior.world(),
                        junior_map: junior.map_id(),
                    });
                }

                let updated_senior =
                    tx.save(senior.to_builder().add_junior(junior_id).touch().build()?)?;
                let updated_junior =
                    tx.save(junior.to_builder().senior_id(senior_id).touch().build()?)?;

                Ok(LinkedPair {
                    senior: updated_senior,
                    junior: updated_junior,
                })
            })
            .await
    }

    /// Sever every relationship the member participates in.
    ///
    /// Clears the senior's junior entry and/or each junior's senior pointer
    /// alongside the member's own references; all affected records commit
    /// together. Fails with `NoLinkToBreak` when the member has no relation.
    pub async fn unlink(&self, character_id: u32) -> Result<Vec<FamilyMember>, KindredError> {
        info!(character_id, "breaking family links");

        self.store
            .transact(move |tx| {
                let member = tx
                    .get(character_id)?
                    .ok_or(KindredError::MemberNotFound { character_id })?;

                if !member.has_senior() && !member.has_juniors() {
                    return Err(KindredError::NoLinkToBreak { character_id });
                }

                let mut updated = Self::clear_counterparts(tx, &member)?;

                let mut builder = member.to_builder();
                if member.has_senior() {
                    builder = builder.clear_senior_id();
                }
                if member.has_juniors() {
                    builder = builder.junior_ids(Vec::new());
                }
                updated.push(tx.save(builder.touch().build()?)?);

                Ok(updated)
            })
            .await
    }

    /// Remove the member entirely, cascading to every record that references
    /// it. Returns the surviving records that were rewritten.
    pub async fn remove(&self, character_id: u32) -> Result<Vec<FamilyMember>, KindredError> {
        info!(character_id, "removing member with cascade");

        self.store
            .transact(move |tx| {
                let member = tx
                    .get(character_id)?
                    .ok_or(KindredError::MemberNotFound { character_id })?;

                let updated = Self::clear_counterparts(tx, &member)?;
                tx.delete(character_id)?;

                Ok(updated)
            })
            .await
    }

    /// Remove every direct junior of `senior_id`, then the senior itself.
    ///
    /// Each removal is its own atomic step; a mid-sequence failure leaves a
    /// partially dissolved tree, reported through [`DissolveError`].
    pub async fn dissolve_subtree(
        &self,
        senior_id: u32,
    ) -> Result<Vec<FamilyMember>, DissolveError> {
        info!(senior_id, "dissolving family subtree");

        let senior = self
            .get_by_character_id(senior_id)
            .await
            .map_err(|source| DissolveError {
                updated: Vec::new(),
                source,
            })?;

        let mut all_updated = Vec::new();
        for &junior_id in senior.junior_ids() {
            match self.remove(junior_id).await {
                Ok(mut updated) => all_updated.append(&mut updated),
                Err(source) => {
                    return Err(DissolveError {
                        updated: all_updated,
                        source,
                    });
                }
            }
        }

        match self.remove(senior_id).await {
            Ok(mut updated) => all_updated.append(&mut updated),
            Err(source) => {
                return Err(DissolveError {
                    updated: all_updated,
                    source,
                });
            }
        }

        Ok(all_updated)
    }

    /// Credit `amount` to both lifetime and daily rep, enforcing the daily
    /// cap. No partial increment is ever visible on failure.
    pub async fn award_rep(
        &self,
        character_id: u32,
        amount: u32,
    ) -> Result<FamilyMember, KindredError> {
        info!(character_id, amount, "awarding reputation");

        self.store
            .transact(move |tx| Self::apply_award(tx, character_id, amount))
            .await
    }

    /// Deduct `amount` from lifetime rep. Daily rep is untouched.
    pub async fn deduct_rep(
        &self,
        character_id: u32,
        amount: u32,
    ) -> Result<FamilyMember, KindredError> {
        info!(character_id, amount, "deducting reputation");

        self.store
            .transact(move |tx| {
                let member = tx
                    .get(character_id)?
                    .ok_or(KindredError::MemberNotFound { character_id })?;

                if member.rep() < amount {
                    return Err(KindredError::InsufficientRep {
                        character_id,
                        available: member.rep(),
                        attempted: amount,
                    });
                }

                Ok(tx.save(member.to_builder().subtract_rep(amount).touch().build()?)?)
            })
            .await
    }

    /// Zero every member's daily rep in one set-based pass.
    pub async fn reset_daily_rep(&self) -> Result<BatchResetResult, KindredError> {
        info!("resetting daily reputation for all members");

        let reset_at = Utc::now();
        let affected_count = self.store.reset_daily_rep(reset_at).await?;

        debug!(affected_count, "daily reputation reset applied");
        Ok(BatchResetResult {
            affected_count,
            reset_at,
        })
    }

    /// Credit a junior's activity to its senior.
    ///
    /// The award is halved when the junior outlevels the senior. Fails with
    /// `NoSenior` for unlinked juniors; the senior's daily cap applies.
    pub async fn award_rep_to_senior(
        &self,
        junior_id: u32,
        amount: u32,
        source: &str,
    ) -> Result<RepAward, KindredError> {
        info!(junior_id, amount, source, "awarding reputation to senior");

        self.store
            .transact(move |tx| {
                let junior = tx.get(junior_id)?.ok_or(KindredError::MemberNotFound {
                    character_id: junior_id,
                })?;

                let senior_id = junior
                    .senior_id()
                    .ok_or(KindredError::NoSenior { junior_id })?;

                let senior = tx
                    .get(senior_id)?
                    .ok_or(KindredError::SeniorNotFound { senior_id })?;

                let awarded = if junior.level() > senior.level() {
                    debug!(
                        junior_level = junior.level(),
                        senior_level = senior.level(),
                        original = amount,
                        halved = amount / 2,
                        "junior outlevels senior, halving award"
                    );
                    amount / 2
                } else {
                    amount
                };

                let senior = Self::apply_award(tx, senior_id, awarded)?;
                Ok(RepAward { senior, awarded })
            })
            .await
    }

    /// Translate a raw activity tally into a senior reputation award.
    ///
    /// `mob_kill` earns 2 rep per 5 kills, `expedition` earns 10 rep per
    /// coin. A translation that floors to zero is a no-op, not an error.
    pub async fn process_activity(
        &self,
        junior_id: u32,
        activity_type: &str,
        value: u32,
    ) -> Result<Option<RepAward>, KindredError> {
        let (amount, source) = match activity_type {
            "mob_kill" => ((value / 5).saturating_mul(2), "mob_kills"),
            "expedition" => (value.saturating_mul(10), "expedition"),
            other => {
                return Err(KindredError::InvalidActivityType {
                    activity_type: other.to_string(),
                });
            }
        };

        if amount == 0 {
            debug!(junior_id, activity_type, value, "activity below award threshold");
            return Ok(None);
        }

        self.award_rep_to_senior(junior_id, amount, source)
            .await
            .map(Some)
    }

    /// Look up a member, failing with `MemberNotFound` when absent.
    pub async fn get_by_character_id(
        &self,
        character_id: u32,
    ) -> Result<FamilyMember, KindredError> {
        self.store
            .get(character_id)
            .await?
            .ok_or(KindredError::MemberNotFound { character_id })
    }

    /// The member together with its senior (if any) and direct juniors.
    pub async fn get_family_tree(
        &self,
        character_id: u32,
    ) -> Result<Vec<FamilyMember>, KindredError> {
        let member = self.get_by_character_id(character_id).await?;

        let mut tree = Vec::with_capacity(4);
        if let Some(senior_id) = member.senior_id() {
            if let Some(senior) = self.store.get(senior_id).await? {
                tree.push(senior);
            }
        }
        tree.push(member);
        tree.extend(self.store.get_by_senior(character_id).await?);

        Ok(tree)
    }

    /// Clear the opposite side of every relationship `member` participates
    /// in, staging the rewrites on the open transaction.
    fn clear_counterparts(
        tx: &mut dyn MemberTx,
        member: &FamilyMember,
    ) -> Result<Vec<FamilyMember>, KindredError> {
        let mut updated = Vec::new();

        if let Some(senior_id) = member.senior_id() {
            if let Some(senior) = tx.get(senior_id)? {
                let rewritten = senior
                    .to_builder()
                    .remove_junior(member.character_id())
                    .touch()
                    .build()?;
                updated.push(tx.save(rewritten)?);
            }
        }

        for &junior_id in member.junior_ids() {
            if let Some(junior) = tx.get(junior_id)? {
                let rewritten = junior.to_builder().clear_senior_id().touch().build()?;
                updated.push(tx.save(rewritten)?);
            }
        }

        Ok(updated)
    }

    /// Shared award path: cap check plus the dual rep/daily-rep increment.
    fn apply_award(
        tx: &mut dyn MemberTx,
        character_id: u32,
        amount: u32,
    ) -> Result<FamilyMember, KindredError> {
        let member = tx
            .get(character_id)?
            .ok_or(KindredError::MemberNotFound { character_id })?;

        if !member.can_receive_rep(amount) {
            return Err(KindredError::RepCapExceeded {
                character_id,
                daily_rep: member.daily_rep(),
                attempted: amount,
            });
        }

        Ok(tx.save(
            member
                .to_builder()
                .add_rep(amount)
                .add_daily_rep(amount)
                .touch()
                .build()?,
        )?)
    }
}
