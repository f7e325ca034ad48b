//! In-memory transactional member store
//!
//! Backs the engine with a plain `HashMap` keyed by character id. A single
//! writer lock serializes every transaction, so a precondition checked inside
//! a transaction closure (e.g. a free junior slot) holds until that
//! transaction commits. This is the isolation level the relationship
//! processor requires; a database-backed implementation would need row
//! locking or a serializable transaction level at the same seam.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::FamilyMember;
use crate::storage::errors::StoreResult;
use crate::storage::traits::{MemberStore, MemberTx};
use crate::KindredError;

#[derive(Debug, Default)]
struct Inner {
    members: HashMap<u32, FamilyMember>,
    next_id: u32,
}

/// In-process member store with serializable transactions.
#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    inner: RwLock<Inner>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                members: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

/// Transactional view: a staged write-set layered over the live map.
///
/// Writes land in `staged` and only merge into the base map on commit;
/// dropping the view without committing discards them.
struct InMemoryTx<'a> {
    inner: &'a mut Inner,
    staged: HashMap<u32, Option<FamilyMember>>,
    next_id: u32,
}

impl<'a> InMemoryTx<'a> {
    fn new(inner: &'a mut Inner) -> Self {
        let next_id = inner.next_id;
        Self {
            inner,
            staged: HashMap::new(),
            next_id,
        }
    }

    fn commit(self) {
        for (character_id, record) in self.staged {
            match record {
                Some(member) => {
                    self.inner.members.insert(character_id, member);
                }
                None => {
                    self.inner.members.remove(&character_id);
                }
            }
        }
        self.inner.next_id = self.next_id;
    }
}

impl MemberTx for InMemoryTx<'_> {
    fn get(&self, character_id: u32) -> StoreResult<Option<FamilyMember>> {
        if let Some(staged) = self.staged.get(&character_id) {
            return Ok(staged.clone());
        }
        Ok(self.inner.members.get(&character_id).cloned())
    }

    fn get_by_senior(&self, senior_id: u32) -> StoreResult<Vec<FamilyMember>> {
        let mut juniors: Vec<FamilyMember> = self
            .inner
            .members
            .iter()
            .filter(|(character_id, _)| !self.staged.contains_key(character_id))
            .map(|(_, member)| member)
            .chain(self.staged.values().filter_map(|staged| staged.as_ref()))
            .filter(|member| member.senior_id() == Some(senior_id))
            .cloned()
            .collect();
        juniors.sort_by_key(FamilyMember::character_id);
        Ok(juniors)
    }

    fn save(&mut self, member: FamilyMember) -> StoreResult<FamilyMember> {
        let member = if member.id() == 0 {
            let assigned = member.with_assigned_id(self.next_id);
            self.next_id += 1;
            assigned
        } else {
            member
        };
        self.staged
            .insert(member.character_id(), Some(member.clone()));
        Ok(member)
    }

    fn delete(&mut self, character_id: u32) -> StoreResult<bool> {
        let existed = self.get(character_id)?.is_some();
        self.staged.insert(character_id, None);
        Ok(existed)
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn get(&self, character_id: u32) -> StoreResult<Option<FamilyMember>> {
        let inner = self.inner.read().await;
        Ok(inner.members.get(&character_id).cloned())
    }

    async fn get_by_senior(&self, senior_id: u32) -> StoreResult<Vec<FamilyMember>> {
        let inner = self.inner.read().await;
        let mut juniors: Vec<FamilyMember> = inner
            .members
            .values()
            .filter(|member| member.senior_id() == Some(senior_id))
            .cloned()
            .collect();
        juniors.sort_by_key(FamilyMember::character_id);
        Ok(juniors)
    }

    async fn save(&self, member: FamilyMember) -> StoreResult<FamilyMember> {
        let mut inner = self.inner.write().await;
        let member = if member.id() == 0 {
            let assigned = member.with_assigned_id(inner.next_id);
            inner.next_id += 1;
            assigned
        } else {
            member
        };
        inner
            .members
            .insert(member.character_id(), member.clone());
        Ok(member)
    }

    async fn delete(&self, character_id: u32) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.members.remove(&character_id).is_some())
    }

    async fn exists(&self, character_id: u32) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.members.contains_key(&character_id))
    }

    async fn count(&self) -> StoreResult<usize> {
        let inner = self.inner.read().await;
        Ok(inner.members.len())
    }

    async fn list(&self) -> StoreResult<Vec<FamilyMember>> {
        let inner = self.inner.read().await;
        let mut members: Vec<FamilyMember> = inner.members.values().cloned().collect();
        members.sort_by_key(FamilyMember::character_id);
        Ok(members)
    }

    async fn reset_daily_rep(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        // One pass under the writer lock: the in-memory analog of a single
        // set-based UPDATE ... WHERE daily_rep > 0.
        let mut inner = self.inner.write().await;
        let mut affected = 0u64;
        for member in inner.members.values_mut() {
            if member.daily_rep > 0 {
                member.daily_rep = 0;
                member.updated_at = now;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn transact<T, F>(&self, f: F) -> Result<T, KindredError>
    where
        T: Send,
        F: FnOnce(&mut dyn MemberTx) -> Result<T, KindredError> + Send,
    {
        let mut inner = self.inner.write().await;
        let mut tx = InMemoryTx::new(&mut inner);
        match f(&mut tx) {
            Ok(value) => {
                tx.commit();
                Ok(value)
            }
            // Staged writes are dropped with the view.
            Err(err) => Err(err),
        }
    }
}
