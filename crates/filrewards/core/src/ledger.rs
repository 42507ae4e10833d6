//! Reward ledger: one grant per subject and reward type.

use crate::cache::IdempotencyCache;
use crate::clock::MonotonicClock;
use crate::config::RewardsConfig;
use crate::error::RewardsError;
use crate::locks::KeyLockPool;
use crate::pagination::{paginate, Page, PageRequest};
use crate::store::{LedgerStore, RewardFilter};
use crate::types::{Reward, RewardType};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted(Reward),
    /// The org or dev key already holds this reward type.
    AlreadyGranted(RewardType),
    /// The event does not map to any reward type.
    Ignored,
}

impl GrantOutcome {
    pub fn into_reward(self) -> Option<Reward> {
        match self {
            Self::Granted(reward) => Some(reward),
            Self::AlreadyGranted(_) | Self::Ignored => None,
        }
    }
}

#[derive(Clone)]
pub struct RewardLedger {
    store: Arc<dyn LedgerStore>,
    cache: Arc<IdempotencyCache>,
    locks: KeyLockPool,
    config: Arc<RewardsConfig>,
    clock: Arc<MonotonicClock>,
}

impl RewardLedger {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        cache: Arc<IdempotencyCache>,
        locks: KeyLockPool,
        config: Arc<RewardsConfig>,
        clock: Arc<MonotonicClock>,
    ) -> Self {
        Self {
            store,
            cache,
            locks,
            config,
            clock,
        }
    }

    pub fn cache(&self) -> &IdempotencyCache {
        &self.cache
    }

    /// Grant the reward `event` maps to, at most once per subject.
    ///
    /// The locked section runs on its own task, so dropping this future never
    /// separates the ledger append from the cache update.
    pub async fn grant(
        &self,
        org_key: &str,
        dev_key: &str,
        event: &str,
    ) -> Result<GrantOutcome, RewardsError> {
        let Some(reward_type) = self.config.events.resolve(event) else {
            debug!(org_key, event, "event has no reward mapping");
            return Ok(GrantOutcome::Ignored);
        };

        let ledger = self.clone();
        let org_key = org_key.to_string();
        let dev_key = dev_key.to_string();
        tokio::spawn(async move { ledger.grant_locked(&org_key, &dev_key, reward_type).await })
            .await
            .map_err(|e| RewardsError::Internal(format!("grant task failed: {e}")))?
    }

    async fn grant_locked(
        &self,
        org_key: &str,
        dev_key: &str,
        reward_type: RewardType,
    ) -> Result<GrantOutcome, RewardsError> {
        let _guard = self.locks.acquire(org_key).await;

        if self.cache.is_granted(org_key, dev_key, reward_type) {
            debug!(org_key, dev_key, %reward_type, "reward already granted");
            return Ok(GrantOutcome::AlreadyGranted(reward_type));
        }

        let reward = Reward {
            reward_id: Uuid::new_v4().to_string(),
            org_key: org_key.to_string(),
            dev_key: dev_key.to_string(),
            reward_type,
            factor: self.config.factors.factor(reward_type),
            base_amount: self.config.base_amount,
            created_at: self.clock.now(),
        };
        let amount = reward.amount().ok_or_else(|| {
            RewardsError::Internal(format!("amount for {reward_type} overflows i64"))
        })?;

        if let Err(err) = self.store.insert_reward(&reward).await {
            error!(org_key, dev_key, %reward_type, error = %err, "reward append failed");
            return Err(err.into());
        }
        self.cache.mark_granted(&reward);

        info!(
            org_key,
            dev_key,
            %reward_type,
            amount,
            reward_id = %reward.reward_id,
            "reward granted"
        );
        Ok(GrantOutcome::Granted(reward))
    }

    pub async fn list(
        &self,
        filter: &RewardFilter,
        request: &PageRequest,
    ) -> Result<Page<Reward>, RewardsError> {
        let store = &self.store;
        let page = paginate(
            request,
            |query| async move { store.find_rewards(filter, &query).await },
            |bound| async move { store.reward_exists(filter, bound).await },
        )
        .await?;
        Ok(page)
    }
}
