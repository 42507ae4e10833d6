//! Claim ledger and balance aggregation.

use crate::clock::MonotonicClock;
use crate::error::RewardsError;
use crate::locks::KeyLockPool;
use crate::pagination::{paginate, Page, PageRequest};
use crate::store::{ClaimFilter, LedgerStore};
use crate::types::{Balance, Claim};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct ClaimLedger {
    store: Arc<dyn LedgerStore>,
    locks: KeyLockPool,
    clock: Arc<MonotonicClock>,
}

impl ClaimLedger {
    pub fn new(store: Arc<dyn LedgerStore>, locks: KeyLockPool, clock: Arc<MonotonicClock>) -> Self {
        Self {
            store,
            locks,
            clock,
        }
    }

    /// Balance as of the moment the organization lock is held.
    pub async fn balance(&self, org_key: &str) -> Result<Balance, RewardsError> {
        let _guard = self.locks.acquire(org_key).await;
        self.aggregate(org_key).await
    }

    /// Record a claim of `amount` against the organization's balance.
    ///
    /// Nothing is written when `amount` exceeds what is available. Like
    /// grants, the locked section runs on its own task.
    pub async fn claim(
        &self,
        org_key: &str,
        claimed_by: &str,
        amount: i64,
    ) -> Result<Claim, RewardsError> {
        if amount <= 0 {
            return Err(RewardsError::invalid_argument(format!(
                "claim amount must be positive, got {amount}"
            )));
        }

        let ledger = self.clone();
        let org_key = org_key.to_string();
        let claimed_by = claimed_by.to_string();
        tokio::spawn(async move { ledger.claim_locked(&org_key, &claimed_by, amount).await })
            .await
            .map_err(|e| RewardsError::Internal(format!("claim task failed: {e}")))?
    }

    async fn claim_locked(
        &self,
        org_key: &str,
        claimed_by: &str,
        amount: i64,
    ) -> Result<Claim, RewardsError> {
        let _guard = self.locks.acquire(org_key).await;

        let balance = self.aggregate(org_key).await?;
        if amount > balance.available {
            debug!(org_key, amount, available = balance.available, "claim exceeds balance");
            return Err(RewardsError::InsufficientBalance {
                requested: amount,
                available: balance.available,
            });
        }

        let claim = Claim {
            claim_id: Uuid::new_v4().to_string(),
            org_key: org_key.to_string(),
            claimed_by: claimed_by.to_string(),
            amount,
            created_at: self.clock.now(),
        };
        if let Err(err) = self.store.insert_claim(&claim).await {
            error!(org_key, claimed_by, amount, error = %err, "claim append failed");
            return Err(err.into());
        }

        info!(
            org_key,
            claimed_by,
            amount,
            remaining = balance.available - amount,
            claim_id = %claim.claim_id,
            "claim recorded"
        );
        Ok(claim)
    }

    async fn aggregate(&self, org_key: &str) -> Result<Balance, RewardsError> {
        let rewarded = self.store.total_rewarded(org_key).await?;
        let claimed = self.store.total_claimed(org_key).await?;
        let available = rewarded.checked_sub(claimed).ok_or_else(|| {
            RewardsError::Internal(format!("balance for {org_key} overflows i64"))
        })?;
        Ok(Balance {
            rewarded,
            claimed,
            available,
        })
    }

    pub async fn list(
        &self,
        filter: &ClaimFilter,
        request: &PageRequest,
    ) -> Result<Page<Claim>, RewardsError> {
        let store = &self.store;
        let page = paginate(
            request,
            |query| async move { store.find_claims(filter, &query).await },
            |bound| async move { store.claim_exists(filter, bound).await },
        )
        .await?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::tests::RejectingStore;
    use crate::store::{ClaimStore, InMemoryLedgerStore, RewardStore};
    use crate::types::{Reward, RewardType};
    use chrono::Utc;

    fn seeded_store(org_key: &str, factor: i64, base_amount: i64) -> Arc<InMemoryLedgerStore> {
        Arc::new(InMemoryLedgerStore::with_rewards(vec![Reward {
            reward_id: Uuid::new_v4().to_string(),
            org_key: org_key.to_string(),
            dev_key: String::new(),
            reward_type: RewardType::FirstBucketCreated,
            factor,
            base_amount,
            created_at: Utc::now(),
        }]))
    }

    fn ledger_over(store: Arc<dyn LedgerStore>) -> ClaimLedger {
        ClaimLedger::new(store, KeyLockPool::new(), Arc::new(MonotonicClock::new()))
    }

    #[tokio::test]
    async fn balance_of_unknown_org_is_zero() {
        let ledger = ledger_over(Arc::new(InMemoryLedgerStore::new()));
        let balance = ledger.balance("nobody").await.unwrap();
        assert_eq!(
            balance,
            Balance {
                rewarded: 0,
                claimed: 0,
                available: 0
            }
        );
    }

    #[tokio::test]
    async fn claim_up_to_available_then_reject() {
        let store = seeded_store("org1", 2, 100);
        let ledger = ledger_over(store.clone());

        ledger.claim("org1", "alice", 150).await.unwrap();
        let err = ledger.claim("org1", "alice", 51).await.unwrap_err();
        assert!(matches!(
            err,
            RewardsError::InsufficientBalance {
                requested: 51,
                available: 50
            }
        ));
        assert!(err.is_invalid_argument());
        ledger.claim("org1", "bob", 50).await.unwrap();

        let balance = ledger.balance("org1").await.unwrap();
        assert_eq!(balance.available, 0);
        assert_eq!(store.total_claimed("org1").await.unwrap(), 200);
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let ledger = ledger_over(seeded_store("org1", 1, 10));
        for amount in [0, -5] {
            let err = ledger.claim("org1", "alice", amount).await.unwrap_err();
            assert!(matches!(err, RewardsError::InvalidArgument(_)));
        }
        assert_eq!(ledger.balance("org1").await.unwrap().claimed, 0);
    }

    #[tokio::test]
    async fn failed_append_is_storage_error() {
        let rewards = seeded_store("org1", 1, 10).all_rewards().await.unwrap();
        let ledger = ledger_over(Arc::new(RejectingStore::with_rewards(rewards)));

        let err = ledger.claim("org1", "alice", 5).await.unwrap_err();
        assert!(matches!(err, RewardsError::Storage(_)));
        assert_eq!(ledger.balance("org1").await.unwrap().available, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_never_overdraw() {
        let store = seeded_store("org1", 1, 100);
        let ledger = ledger_over(store.clone());

        let mut tasks = Vec::new();
        for i in 0..20 {
            let ledger = ledger.clone();
            tasks.push(tokio::spawn(async move {
                ledger.claim("org1", &format!("user{i}"), 10).await
            }));
        }
        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 10);
        let balance = ledger.balance("org1").await.unwrap();
        assert_eq!(balance.claimed, 100);
        assert_eq!(balance.available, 0);
    }
}
