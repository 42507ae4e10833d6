//! Inbound operations over both ledgers.

use crate::cache::IdempotencyCache;
use crate::claims::ClaimLedger;
use crate::clock::MonotonicClock;
use crate::config::RewardsConfig;
use crate::error::RewardsError;
use crate::ledger::{GrantOutcome, RewardLedger};
use crate::locks::KeyLockPool;
use crate::pagination::{Page, PageRequest};
use crate::store::{open_store, ClaimFilter, LedgerStore, RewardFilter, StorageConfig};
use crate::tracking::{emit_detached, UsageEvent, UsageTracker};
use crate::types::{Balance, Claim, Reward};
use std::sync::Arc;
use tracing::info;

/// Reward grants, claims and balances for one process.
///
/// Owns the idempotency cache and the organization lock pool. Both are
/// local to this instance; the store's unique indexes back them up across
/// instances.
#[derive(Clone)]
pub struct RewardsService {
    store: Arc<dyn LedgerStore>,
    rewards: RewardLedger,
    claims: ClaimLedger,
    tracker: Arc<dyn UsageTracker>,
}

impl RewardsService {
    /// Open the configured store and build a seeded service.
    pub async fn bootstrap(
        config: RewardsConfig,
        storage: &StorageConfig,
        tracker: Arc<dyn UsageTracker>,
    ) -> Result<Self, RewardsError> {
        let store = open_store(storage).await?;
        Self::new(store, config, tracker).await
    }

    /// Build a service over `store`, seeding the cache before returning.
    pub async fn new(
        store: Arc<dyn LedgerStore>,
        config: RewardsConfig,
        tracker: Arc<dyn UsageTracker>,
    ) -> Result<Self, RewardsError> {
        config.validate()?;

        let cache = Arc::new(IdempotencyCache::new());
        cache.seed(&*store).await?;

        let locks = KeyLockPool::new();
        let clock = Arc::new(MonotonicClock::new());
        let config = Arc::new(config);

        info!(
            backend = store.backend_label(),
            base_amount = config.base_amount,
            "rewards service ready"
        );
        Ok(Self {
            rewards: RewardLedger::new(
                store.clone(),
                cache,
                locks.clone(),
                config,
                clock.clone(),
            ),
            claims: ClaimLedger::new(store.clone(), locks, clock),
            store,
            tracker,
        })
    }

    pub fn backend_label(&self) -> &'static str {
        self.store.backend_label()
    }

    pub fn cache(&self) -> &IdempotencyCache {
        self.rewards.cache()
    }

    /// Grant the reward mapped from `event`. `None` when the event is not
    /// rewarded or the reward was already granted.
    pub async fn process_event(
        &self,
        org_key: &str,
        dev_key: &str,
        event: &str,
    ) -> Result<Option<Reward>, RewardsError> {
        require("org key", org_key)?;
        require("event", event)?;

        let outcome = self.rewards.grant(org_key, dev_key, event).await?;
        if let GrantOutcome::Granted(reward) = &outcome {
            emit_detached(self.tracker.clone(), UsageEvent::reward(reward));
        }
        Ok(outcome.into_reward())
    }

    pub async fn list_rewards(
        &self,
        filter: &RewardFilter,
        request: &PageRequest,
    ) -> Result<Page<Reward>, RewardsError> {
        self.rewards.list(filter, request).await
    }

    pub async fn claim(
        &self,
        org_key: &str,
        claimed_by: &str,
        amount: i64,
    ) -> Result<Claim, RewardsError> {
        require("org key", org_key)?;

        let claim = self.claims.claim(org_key, claimed_by, amount).await?;
        emit_detached(self.tracker.clone(), UsageEvent::claim(&claim));
        Ok(claim)
    }

    pub async fn list_claims(
        &self,
        filter: &ClaimFilter,
        request: &PageRequest,
    ) -> Result<Page<Claim>, RewardsError> {
        self.claims.list(filter, request).await
    }

    pub async fn balance(&self, org_key: &str) -> Result<Balance, RewardsError> {
        require("org key", org_key)?;
        self.claims.balance(org_key).await
    }
}

fn require(field: &str, value: &str) -> Result<(), RewardsError> {
    if value.is_empty() {
        return Err(RewardsError::invalid_argument(format!("must provide {field}")));
    }
    Ok(())
}
