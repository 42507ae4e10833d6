//! In-memory ledger store.
//!
//! Deterministic and test-friendly. Enforces the same partial unique
//! constraints as the PostgreSQL schema so conflict handling can be
//! exercised without a database.

use super::{checked_total, ClaimFilter, ClaimStore, LedgerStore, RewardFilter, RewardStore};
use crate::error::{StorageError, StorageResult};
use crate::pagination::{select_page, KeysetBound, KeysetQuery};
use crate::types::{Claim, Reward};
use async_trait::async_trait;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    rewards: RwLock<Vec<Reward>>,
    claims: RwLock<Vec<Claim>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store that already holds `rewards`, as if persisted by an
    /// earlier process.
    pub fn with_rewards(rewards: Vec<Reward>) -> Self {
        Self {
            rewards: RwLock::new(rewards),
            claims: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RewardStore for InMemoryLedgerStore {
    async fn insert_reward(&self, reward: &Reward) -> StorageResult<()> {
        let mut guard = self
            .rewards
            .write()
            .map_err(|_| StorageError::Backend("rewards lock poisoned".to_string()))?;

        let clash = guard.iter().find(|existing| {
            existing.reward_type == reward.reward_type
                && ((!reward.org_key.is_empty() && existing.org_key == reward.org_key)
                    || (!reward.dev_key.is_empty() && existing.dev_key == reward.dev_key))
        });
        if let Some(existing) = clash {
            return Err(StorageError::Conflict(format!(
                "reward {} already granted as {}",
                reward.reward_type, existing.reward_id
            )));
        }

        guard.push(reward.clone());
        Ok(())
    }

    async fn all_rewards(&self) -> StorageResult<Vec<Reward>> {
        let guard = self
            .rewards
            .read()
            .map_err(|_| StorageError::Backend("rewards lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    async fn find_rewards(
        &self,
        filter: &RewardFilter,
        query: &KeysetQuery,
    ) -> StorageResult<Vec<Reward>> {
        let guard = self
            .rewards
            .read()
            .map_err(|_| StorageError::Backend("rewards lock poisoned".to_string()))?;
        let matching = guard
            .iter()
            .filter(|reward| filter.matches(reward))
            .cloned()
            .collect();
        Ok(select_page(matching, query))
    }

    async fn reward_exists(
        &self,
        filter: &RewardFilter,
        bound: KeysetBound,
    ) -> StorageResult<bool> {
        let guard = self
            .rewards
            .read()
            .map_err(|_| StorageError::Backend("rewards lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .any(|reward| filter.matches(reward) && bound.admits(reward.created_at)))
    }

    async fn total_rewarded(&self, org_key: &str) -> StorageResult<i64> {
        let guard = self
            .rewards
            .read()
            .map_err(|_| StorageError::Backend("rewards lock poisoned".to_string()))?;
        checked_total(
            guard
                .iter()
                .filter(|reward| reward.org_key == org_key)
                .map(Reward::amount),
            "rewarded",
        )
    }
}

#[async_trait]
impl ClaimStore for InMemoryLedgerStore {
    async fn insert_claim(&self, claim: &Claim) -> StorageResult<()> {
        let mut guard = self
            .claims
            .write()
            .map_err(|_| StorageError::Backend("claims lock poisoned".to_string()))?;
        guard.push(claim.clone());
        Ok(())
    }

    async fn find_claims(
        &self,
        filter: &ClaimFilter,
        query: &KeysetQuery,
    ) -> StorageResult<Vec<Claim>> {
        let guard = self
            .claims
            .read()
            .map_err(|_| StorageError::Backend("claims lock poisoned".to_string()))?;
        let matching = guard
            .iter()
            .filter(|claim| filter.matches(claim))
            .cloned()
            .collect();
        Ok(select_page(matching, query))
    }

    async fn claim_exists(&self, filter: &ClaimFilter, bound: KeysetBound) -> StorageResult<bool> {
        let guard = self
            .claims
            .read()
            .map_err(|_| StorageError::Backend("claims lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .any(|claim| filter.matches(claim) && bound.admits(claim.created_at)))
    }

    async fn total_claimed(&self, org_key: &str) -> StorageResult<i64> {
        let guard = self
            .claims
            .read()
            .map_err(|_| StorageError::Backend("claims lock poisoned".to_string()))?;
        checked_total(
            guard
                .iter()
                .filter(|claim| claim.org_key == org_key)
                .map(|claim| Some(claim.amount)),
            "claimed",
        )
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn backend_label(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::SortOrder;
    use crate::types::RewardType;
    use chrono::{Duration, Utc};

    fn reward(org: &str, dev: &str, reward_type: RewardType) -> Reward {
        Reward {
            reward_id: uuid::Uuid::new_v4().to_string(),
            org_key: org.to_string(),
            dev_key: dev.to_string(),
            reward_type,
            factor: reward_type.default_factor(),
            base_amount: 100,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_org_and_dev_grants() {
        let store = InMemoryLedgerStore::new();
        store
            .insert_reward(&reward("org1", "dev1", RewardType::FirstBucketCreated))
            .await
            .unwrap();

        let same_org = store
            .insert_reward(&reward("org1", "dev2", RewardType::FirstBucketCreated))
            .await;
        assert!(matches!(same_org, Err(StorageError::Conflict(_))));

        let same_dev = store
            .insert_reward(&reward("org2", "dev1", RewardType::FirstBucketCreated))
            .await;
        assert!(matches!(same_dev, Err(StorageError::Conflict(_))));

        store
            .insert_reward(&reward("org1", "dev1", RewardType::FirstOrgCreated))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_keys_are_not_unique() {
        let store = InMemoryLedgerStore::new();
        store
            .insert_reward(&reward("org1", "", RewardType::FirstMailboxCreated))
            .await
            .unwrap();
        store
            .insert_reward(&reward("org2", "", RewardType::FirstMailboxCreated))
            .await
            .unwrap();
        assert_eq!(store.all_rewards().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn totals_are_zero_without_rows() {
        let store = InMemoryLedgerStore::new();
        assert_eq!(store.total_rewarded("nobody").await.unwrap(), 0);
        assert_eq!(store.total_claimed("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn claim_probe_respects_filter_and_bound() {
        let store = InMemoryLedgerStore::new();
        let now = Utc::now();
        for (i, org) in ["org1", "org2", "org1"].into_iter().enumerate() {
            store
                .insert_claim(&Claim {
                    claim_id: format!("c{i}"),
                    org_key: org.to_string(),
                    claimed_by: "alice".to_string(),
                    amount: 10,
                    created_at: now + Duration::seconds(i as i64),
                })
                .await
                .unwrap();
        }

        let filter = ClaimFilter {
            org_key: Some("org1".to_string()),
            claimed_by: None,
        };
        let later = KeysetBound::new(now, SortOrder::Ascending);
        assert!(store.claim_exists(&filter, later).await.unwrap());
        let past_last = KeysetBound::new(now + Duration::seconds(2), SortOrder::Ascending);
        assert!(!store.claim_exists(&filter, past_last).await.unwrap());
        assert_eq!(store.total_claimed("org1").await.unwrap(), 20);
    }
}
