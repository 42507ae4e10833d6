//! In-memory mirror of granted (subject, reward type) pairs.

use crate::error::StorageResult;
use crate::store::RewardStore;
use crate::types::{Reward, RewardType};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use tracing::info;

type GrantIndex = HashMap<String, HashSet<RewardType>>;

/// Derived, non-authoritative view of which subjects already hold which
/// reward types.
///
/// Organization and developer keys are tracked in separate maps. Empty keys
/// are never marked and never match, like the store's partial unique indexes.
#[derive(Debug, Default)]
pub struct IdempotencyCache {
    orgs: RwLock<GrantIndex>,
    devs: RwLock<GrantIndex>,
}

impl IdempotencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every persisted reward. Returns the number of rewards scanned.
    pub async fn seed<S>(&self, store: &S) -> StorageResult<usize>
    where
        S: RewardStore + ?Sized,
    {
        let rewards = store.all_rewards().await?;
        for reward in &rewards {
            self.mark_granted(reward);
        }
        info!(
            rewards = rewards.len(),
            orgs = subjects(&self.orgs),
            devs = subjects(&self.devs),
            "idempotency cache seeded"
        );
        Ok(rewards.len())
    }

    pub fn has_org(&self, org_key: &str, reward_type: RewardType) -> bool {
        contains(&self.orgs, org_key, reward_type)
    }

    pub fn has_dev(&self, dev_key: &str, reward_type: RewardType) -> bool {
        contains(&self.devs, dev_key, reward_type)
    }

    /// True when either subject already holds `reward_type`.
    pub fn is_granted(&self, org_key: &str, dev_key: &str, reward_type: RewardType) -> bool {
        self.has_org(org_key, reward_type) || self.has_dev(dev_key, reward_type)
    }

    pub fn mark_granted(&self, reward: &Reward) {
        insert(&self.orgs, &reward.org_key, reward.reward_type);
        insert(&self.devs, &reward.dev_key, reward.reward_type);
    }

    /// Sorted snapshot of `(org pairs, dev pairs)`.
    pub fn granted_pairs(&self) -> (Vec<(String, RewardType)>, Vec<(String, RewardType)>) {
        (flatten(&self.orgs), flatten(&self.devs))
    }
}

fn subjects(index: &RwLock<GrantIndex>) -> usize {
    index.read().unwrap_or_else(PoisonError::into_inner).len()
}

fn contains(index: &RwLock<GrantIndex>, key: &str, reward_type: RewardType) -> bool {
    if key.is_empty() {
        return false;
    }
    let guard = index.read().unwrap_or_else(PoisonError::into_inner);
    guard
        .get(key)
        .is_some_and(|types| types.contains(&reward_type))
}

fn insert(index: &RwLock<GrantIndex>, key: &str, reward_type: RewardType) {
    if key.is_empty() {
        return;
    }
    let mut guard = index.write().unwrap_or_else(PoisonError::into_inner);
    guard.entry(key.to_string()).or_default().insert(reward_type);
}

fn flatten(index: &RwLock<GrantIndex>) -> Vec<(String, RewardType)> {
    let guard = index.read().unwrap_or_else(PoisonError::into_inner);
    let mut pairs: Vec<_> = guard
        .iter()
        .flat_map(|(key, types)| types.iter().map(move |t| (key.clone(), *t)))
        .collect();
    pairs.sort();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLedgerStore;
    use chrono::Utc;

    fn reward(org: &str, dev: &str, reward_type: RewardType) -> Reward {
        Reward {
            reward_id: uuid::Uuid::new_v4().to_string(),
            org_key: org.to_string(),
            dev_key: dev.to_string(),
            reward_type,
            factor: reward_type.default_factor(),
            base_amount: 10,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn dimensions_are_independent() {
        let cache = IdempotencyCache::new();
        cache.mark_granted(&reward("org1", "dev1", RewardType::FirstOrgCreated));

        assert!(cache.has_org("org1", RewardType::FirstOrgCreated));
        assert!(cache.has_dev("dev1", RewardType::FirstOrgCreated));
        assert!(!cache.has_org("dev1", RewardType::FirstOrgCreated));
        assert!(!cache.has_dev("org1", RewardType::FirstOrgCreated));
        assert!(cache.is_granted("org2", "dev1", RewardType::FirstOrgCreated));
        assert!(!cache.is_granted("org2", "dev2", RewardType::FirstOrgCreated));
    }

    #[test]
    fn empty_keys_never_match() {
        let cache = IdempotencyCache::new();
        cache.mark_granted(&reward("org1", "", RewardType::FirstMailboxCreated));

        assert!(!cache.has_dev("", RewardType::FirstMailboxCreated));
        assert!(!cache.is_granted("org2", "", RewardType::FirstMailboxCreated));
        let (_, devs) = cache.granted_pairs();
        assert!(devs.is_empty());
    }

    #[test]
    fn marking_twice_is_idempotent() {
        let cache = IdempotencyCache::new();
        let granted = reward("org1", "dev1", RewardType::FirstBucketCreated);
        cache.mark_granted(&granted);
        cache.mark_granted(&granted);

        let (orgs, devs) = cache.granted_pairs();
        assert_eq!(orgs, vec![("org1".to_string(), RewardType::FirstBucketCreated)]);
        assert_eq!(devs, vec![("dev1".to_string(), RewardType::FirstBucketCreated)]);
    }

    #[tokio::test]
    async fn seed_mirrors_persisted_rewards() {
        let store = InMemoryLedgerStore::with_rewards(vec![
            reward("org1", "dev1", RewardType::FirstBucketCreated),
            reward("org1", "", RewardType::FirstOrgCreated),
            reward("org2", "dev2", RewardType::FirstBucketCreated),
        ]);
        let cache = IdempotencyCache::new();
        let scanned = cache.seed(&store).await.unwrap();
        assert_eq!(scanned, 3);

        let (orgs, devs) = cache.granted_pairs();
        assert_eq!(
            orgs,
            vec![
                ("org1".to_string(), RewardType::FirstOrgCreated),
                ("org1".to_string(), RewardType::FirstBucketCreated),
                ("org2".to_string(), RewardType::FirstBucketCreated),
            ]
        );
        assert_eq!(
            devs,
            vec![
                ("dev1".to_string(), RewardType::FirstBucketCreated),
                ("dev2".to_string(), RewardType::FirstBucketCreated),
            ]
        );
    }
}
