//! Trait definitions for member record storage

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::FamilyMember;
use crate::storage::errors::StoreResult;
use crate::KindredError;

/// Record operations available inside a transaction.
///
/// All reads observe writes staged earlier in the same transaction
/// (repeatable read within the transaction); nothing becomes visible to other
/// callers until the transaction commits.
pub trait MemberTx: Send {
    /// Look up a member by character id.
    fn get(&self, character_id: u32) -> StoreResult<Option<FamilyMember>>;

    /// All members whose senior is the given character.
    fn get_by_senior(&self, senior_id: u32) -> StoreResult<Vec<FamilyMember>>;

    /// Stage a create-or-update write. Assigns the surrogate id on first save.
    fn save(&mut self, member: FamilyMember) -> StoreResult<FamilyMember>;

    /// Stage a delete. Returns whether the record existed.
    fn delete(&mut self, character_id: u32) -> StoreResult<bool>;

    /// Whether a record exists for the character id.
    fn exists(&self, character_id: u32) -> StoreResult<bool> {
        Ok(self.get(character_id)?.is_some())
    }
}

/// Repository contract for family member records, keyed by character id.
///
/// Single-record convenience operations are provided directly; every
/// multi-record transition must go through [`MemberStore::transact`], which
/// commits all staged writes together or none of them. Implementations must
/// serialize transactions so that a precondition checked inside the closure
/// (such as a senior's free junior slot) cannot be invalidated by a concurrent
/// commit.
#[async_trait]
pub trait MemberStore: Send + Sync + Debug + 'static {
    /// Look up a member by character id.
    async fn get(&self, character_id: u32) -> StoreResult<Option<FamilyMember>>;

    /// All members whose senior is the given character.
    async fn get_by_senior(&self, senior_id: u32) -> StoreResult<Vec<FamilyMember>>;

    /// Create or update a single record.
    async fn save(&self, member: FamilyMember) -> StoreResult<FamilyMember>;

    /// Delete a single record. Returns whether it existed.
    async fn delete(&self, character_id: u32) -> StoreResult<bool>;

    /// Whether a record exists for the character id.
    async fn exists(&self, character_id: u32) -> StoreResult<bool>;

    /// Number of stored records.
    async fn count(&self) -> StoreResult<usize>;

    /// Every stored record. Intended for administrative listings.
    async fn list(&self) -> StoreResult<Vec<FamilyMember>>;

    /// Zero the daily rep of every member with `daily_rep > 0`, stamping
    /// `updated_at` with `now`. Returns the number of affected records.
    ///
    /// This is one set-based pass, not a per-record loop of independent
    /// commits.
    async fn reset_daily_rep(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    /// Run `f` against a transactional view of the record set.
    ///
    /// All writes staged by `f` commit together when it returns `Ok`; any
    /// error rolls every staged write back and is returned unchanged.
    async fn transact<T, F>(&self, f: F) -> Result<T, KindredError>
    where
        T: Send,
        F: FnOnce(&mut dyn MemberTx) -> Result<T, KindredError> + Send;
}
