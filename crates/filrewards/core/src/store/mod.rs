//! Durable reward and claim ledgers.
//!
//! The store owns the authoritative records. Cross-record invariants (one
//! grant per subject and type, claims within balance) are enforced above this
//! layer under the organization lock. The store's unique constraints also
//! hold for writers outside that lock, such as a second instance.

pub mod memory;
pub mod postgres;

use crate::error::{StorageError, StorageResult};
use crate::pagination::{KeysetBound, KeysetQuery};
use crate::types::{Claim, Reward, RewardType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;

/// Equality filters for reward listings. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardFilter {
    pub org_key: Option<String>,
    pub dev_key: Option<String>,
    pub reward_type: Option<RewardType>,
}

impl RewardFilter {
    pub fn org(org_key: impl Into<String>) -> Self {
        Self {
            org_key: Some(org_key.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, reward: &Reward) -> bool {
        self.org_key.as_ref().map_or(true, |k| *k == reward.org_key)
            && self.dev_key.as_ref().map_or(true, |k| *k == reward.dev_key)
            && self.reward_type.map_or(true, |t| t == reward.reward_type)
    }
}

/// Equality filters for claim listings. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFilter {
    pub org_key: Option<String>,
    pub claimed_by: Option<String>,
}

impl ClaimFilter {
    pub fn matches(&self, claim: &Claim) -> bool {
        self.org_key.as_ref().map_or(true, |k| *k == claim.org_key)
            && self
                .claimed_by
                .as_ref()
                .map_or(true, |c| *c == claim.claimed_by)
    }
}

/// Reward ledger persistence.
#[async_trait]
pub trait RewardStore: Send + Sync {
    /// Append a reward. Fails with `Conflict` when a non-empty org or dev key
    /// already holds this reward type.
    async fn insert_reward(&self, reward: &Reward) -> StorageResult<()>;

    /// Every persisted reward, used to seed the idempotency cache.
    async fn all_rewards(&self) -> StorageResult<Vec<Reward>>;

    async fn find_rewards(
        &self,
        filter: &RewardFilter,
        query: &KeysetQuery,
    ) -> StorageResult<Vec<Reward>>;

    /// Whether any reward matching `filter` lies strictly beyond `bound`.
    async fn reward_exists(&self, filter: &RewardFilter, bound: KeysetBound)
        -> StorageResult<bool>;

    /// Sum of `factor * base_amount` for the organization; zero when empty.
    async fn total_rewarded(&self, org_key: &str) -> StorageResult<i64>;
}

/// Claim ledger persistence.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    async fn insert_claim(&self, claim: &Claim) -> StorageResult<()>;

    async fn find_claims(
        &self,
        filter: &ClaimFilter,
        query: &KeysetQuery,
    ) -> StorageResult<Vec<Claim>>;

    async fn claim_exists(&self, filter: &ClaimFilter, bound: KeysetBound) -> StorageResult<bool>;

    /// Sum of claim amounts for the organization; zero when empty.
    async fn total_claimed(&self, org_key: &str) -> StorageResult<i64>;
}

/// Both ledgers behind one handle.
pub trait LedgerStore: RewardStore + ClaimStore + Send + Sync {
    fn backend_label(&self) -> &'static str;
}

/// Ledger persistence backend configuration.
#[derive(Debug, Clone, Default)]
pub enum StorageConfig {
    /// Keep both ledgers in process memory only.
    #[default]
    Memory,
    /// Persist both ledgers in PostgreSQL.
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self::Memory
    }

    pub fn postgres(database_url: impl Into<String>, max_connections: u32) -> Self {
        Self::Postgres {
            database_url: database_url.into(),
            max_connections,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres { .. } => "postgres",
        }
    }
}

/// Open the configured backend, creating schema and indexes as needed.
pub async fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn LedgerStore>> {
    match config {
        StorageConfig::Memory => Ok(Arc::new(InMemoryLedgerStore::new())),
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresLedgerStore::connect(database_url, *max_connections).await?;
            Ok(Arc::new(store))
        }
    }
}

pub(crate) fn checked_total(
    values: impl IntoIterator<Item = Option<i64>>,
    what: &str,
) -> StorageResult<i64> {
    values.into_iter().try_fold(0i64, |total, value| {
        value
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| StorageError::Backend(format!("{what} total overflows i64")))
    })
}
