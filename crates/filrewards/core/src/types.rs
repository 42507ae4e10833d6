use crate::error::RewardsError;
use crate::pagination::Timestamped;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Qualifying lifecycle event categories that earn a one-time reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    FirstKeyAccountCreated,
    FirstKeyUserCreated,
    FirstOrgCreated,
    InitialBillingSetup,
    FirstBucketCreated,
    FirstBucketArchiveCreated,
    FirstMailboxCreated,
    FirstThreadDbCreated,
}

impl RewardType {
    pub const ALL: [RewardType; 8] = [
        RewardType::FirstKeyAccountCreated,
        RewardType::FirstKeyUserCreated,
        RewardType::FirstOrgCreated,
        RewardType::InitialBillingSetup,
        RewardType::FirstBucketCreated,
        RewardType::FirstBucketArchiveCreated,
        RewardType::FirstMailboxCreated,
        RewardType::FirstThreadDbCreated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstKeyAccountCreated => "first_key_account_created",
            Self::FirstKeyUserCreated => "first_key_user_created",
            Self::FirstOrgCreated => "first_org_created",
            Self::InitialBillingSetup => "initial_billing_setup",
            Self::FirstBucketCreated => "first_bucket_created",
            Self::FirstBucketArchiveCreated => "first_bucket_archive_created",
            Self::FirstMailboxCreated => "first_mailbox_created",
            Self::FirstThreadDbCreated => "first_thread_db_created",
        }
    }

    /// Relative weight shipped with the daemon.
    pub fn default_factor(&self) -> i64 {
        match self {
            Self::FirstKeyAccountCreated => 3,
            Self::FirstKeyUserCreated => 1,
            Self::FirstOrgCreated => 3,
            Self::InitialBillingSetup => 1,
            Self::FirstBucketCreated => 2,
            Self::FirstBucketArchiveCreated => 2,
            Self::FirstMailboxCreated => 1,
            Self::FirstThreadDbCreated => 1,
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardType {
    type Err = RewardsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RewardType::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| RewardsError::invalid_argument(format!("unknown reward type '{value}'")))
    }
}

/// Immutable factor per reward type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorTable {
    factors: BTreeMap<RewardType, i64>,
}

impl FactorTable {
    pub fn with_factor(mut self, reward_type: RewardType, factor: i64) -> Self {
        self.factors.insert(reward_type, factor);
        self
    }

    pub fn factor(&self, reward_type: RewardType) -> i64 {
        self.factors
            .get(&reward_type)
            .copied()
            .unwrap_or_else(|| reward_type.default_factor())
    }
}

impl Default for FactorTable {
    fn default() -> Self {
        Self {
            factors: RewardType::ALL
                .into_iter()
                .map(|t| (t, t.default_factor()))
                .collect(),
        }
    }
}

/// Static lookup from upstream lifecycle-event identifiers to reward types.
///
/// Events missing from the table are not rewarded; that is an expected
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMapping {
    events: HashMap<String, RewardType>,
}

impl EventMapping {
    pub fn empty() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    pub fn with_event(mut self, event: impl Into<String>, reward_type: RewardType) -> Self {
        self.events.insert(event.into(), reward_type);
        self
    }

    pub fn resolve(&self, event: &str) -> Option<RewardType> {
        self.events.get(event).copied()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventMapping {
    fn default() -> Self {
        Self::empty()
            .with_event("key_account_created", RewardType::FirstKeyAccountCreated)
            .with_event("key_user_created", RewardType::FirstKeyUserCreated)
            .with_event("org_created", RewardType::FirstOrgCreated)
            .with_event("billing_setup", RewardType::InitialBillingSetup)
            .with_event("bucket_created", RewardType::FirstBucketCreated)
            .with_event(
                "bucket_archive_created",
                RewardType::FirstBucketArchiveCreated,
            )
            .with_event("mailbox_created", RewardType::FirstMailboxCreated)
            .with_event("thread_db_created", RewardType::FirstThreadDbCreated)
    }
}

/// One immutable reward ledger entry.
///
/// `factor` and `base_amount` are captured at grant time so later
/// configuration changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub reward_id: String,
    pub org_key: String,
    pub dev_key: String,
    pub reward_type: RewardType,
    pub factor: i64,
    pub base_amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Reward {
    /// `factor * base_amount`, or `None` on overflow.
    pub fn amount(&self) -> Option<i64> {
        self.factor.checked_mul(self.base_amount)
    }
}

impl Timestamped for Reward {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// One immutable claim ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub org_key: String,
    pub claimed_by: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Timestamped for Claim {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Point-in-time balance for one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub rewarded: i64,
    pub claimed: i64,
    pub available: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_type_string_roundtrip() {
        for reward_type in RewardType::ALL {
            let parsed: RewardType = reward_type.as_str().parse().unwrap();
            assert_eq!(parsed, reward_type);
        }
        assert!("first_thing_ever".parse::<RewardType>().is_err());
    }

    #[test]
    fn factor_table_overrides_single_type() {
        let table = FactorTable::default().with_factor(RewardType::FirstMailboxCreated, 7);
        assert_eq!(table.factor(RewardType::FirstMailboxCreated), 7);
        assert_eq!(table.factor(RewardType::FirstBucketCreated), 2);
        assert_eq!(table.factor(RewardType::FirstOrgCreated), 3);
    }

    #[test]
    fn default_mapping_covers_every_reward_type() {
        let mapping = EventMapping::default();
        assert_eq!(mapping.len(), RewardType::ALL.len());
        assert_eq!(
            mapping.resolve("bucket_created"),
            Some(RewardType::FirstBucketCreated)
        );
        assert_eq!(mapping.resolve("fil_reward"), None);
    }

    #[test]
    fn reward_amount_detects_overflow() {
        let reward = Reward {
            reward_id: "r".to_string(),
            org_key: "org".to_string(),
            dev_key: String::new(),
            reward_type: RewardType::FirstOrgCreated,
            factor: i64::MAX,
            base_amount: 2,
            created_at: Utc::now(),
        };
        assert_eq!(reward.amount(), None);
    }
}
