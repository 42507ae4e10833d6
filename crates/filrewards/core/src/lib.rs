//! Filecoin reward accounting.
//!
//! Grants one-time rewards to organizations (and the developer account that
//! triggered the event) for qualifying lifecycle events, and lets
//! organizations claim up to their unclaimed balance. Each subject receives a
//! given reward type at most once, even under concurrent events, and recorded
//! claims never exceed recorded rewards.

#![deny(unsafe_code)]

pub mod cache;
pub mod claims;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod pagination;
pub mod service;
pub mod store;
pub mod tracking;
pub mod types;

pub use cache::IdempotencyCache;
pub use claims::ClaimLedger;
pub use clock::MonotonicClock;
pub use config::{RewardsConfig, DEFAULT_BASE_AMOUNT};
pub use error::{RewardsError, StorageError, StorageResult, TrackingError};
pub use ledger::{GrantOutcome, RewardLedger};
pub use locks::{KeyLockGuard, KeyLockPool};
pub use pagination::{KeysetBound, KeysetQuery, Page, PageRequest, SortOrder, Timestamped};
pub use service::RewardsService;
pub use store::{
    open_store, ClaimFilter, ClaimStore, InMemoryLedgerStore, LedgerStore, PostgresLedgerStore,
    RewardFilter, RewardStore, StorageConfig,
};
pub use tracking::{
    AccountType, HttpUsageTracker, NoopTracker, UsageEvent, UsageEventKind, UsageTracker,
};
pub use types::{Balance, Claim, EventMapping, FactorTable, Reward, RewardType};
