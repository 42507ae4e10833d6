//! Best-effort usage tracking sink.
//!
//! Events are emitted after the organization lock is released. A failing or
//! slow sink never affects the outcome of the operation that emitted it.

use crate::error::TrackingError;
use crate::types::{Claim, Reward};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Org,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEventKind {
    FilReward,
    FilClaim,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub subject_key: String,
    pub account_type: AccountType,
    pub kind: UsageEventKind,
    pub properties: Map<String, Value>,
}

impl UsageEvent {
    pub fn reward(reward: &Reward) -> Self {
        let mut properties = Map::new();
        properties.insert("type".to_string(), json!(reward.reward_type));
        properties.insert("factor".to_string(), json!(reward.factor));
        properties.insert("base_atto_fil_reward".to_string(), json!(reward.base_amount));
        properties.insert("amount".to_string(), json!(reward.amount()));
        properties.insert("dev_key".to_string(), json!(reward.dev_key));
        Self {
            subject_key: reward.org_key.clone(),
            account_type: AccountType::Org,
            kind: UsageEventKind::FilReward,
            properties,
        }
    }

    pub fn claim(claim: &Claim) -> Self {
        let mut properties = Map::new();
        properties.insert("claimed_by".to_string(), json!(claim.claimed_by));
        properties.insert("amount".to_string(), json!(claim.amount));
        Self {
            subject_key: claim.org_key.clone(),
            account_type: AccountType::Org,
            kind: UsageEventKind::FilClaim,
            properties,
        }
    }
}

#[async_trait]
pub trait UsageTracker: Send + Sync {
    async fn track(&self, event: UsageEvent) -> Result<(), TrackingError>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

#[async_trait]
impl UsageTracker for NoopTracker {
    async fn track(&self, event: UsageEvent) -> Result<(), TrackingError> {
        debug!(subject = %event.subject_key, kind = ?event.kind, "usage event dropped");
        Ok(())
    }
}

/// Posts events as JSON to `{base_url}/v1/track`.
#[derive(Debug, Clone)]
pub struct HttpUsageTracker {
    client: Client,
    base_url: String,
}

impl HttpUsageTracker {
    pub fn new(base_url: &str) -> Result<Self, TrackingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TrackingError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/track", self.base_url)
    }
}

#[async_trait]
impl UsageTracker for HttpUsageTracker {
    async fn track(&self, event: UsageEvent) -> Result<(), TrackingError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&event)
            .send()
            .await
            .map_err(|e| TrackingError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TrackingError::Rejected(status.as_u16()))
        }
    }
}

/// Send `event` on a background task; failures are logged and dropped.
pub fn emit_detached(tracker: Arc<dyn UsageTracker>, event: UsageEvent) {
    tokio::spawn(async move {
        let subject = event.subject_key.clone();
        let kind = event.kind;
        if let Err(err) = tracker.track(event).await {
            warn!(subject = %subject, kind = ?kind, error = %err, "usage tracking failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RewardType;
    use chrono::Utc;

    #[test]
    fn reward_event_carries_grant_properties() {
        let reward = Reward {
            reward_id: "r1".to_string(),
            org_key: "org1".to_string(),
            dev_key: "dev1".to_string(),
            reward_type: RewardType::FirstBucketCreated,
            factor: 2,
            base_amount: 100,
            created_at: Utc::now(),
        };
        let event = UsageEvent::reward(&reward);

        assert_eq!(event.subject_key, "org1");
        assert_eq!(event.kind, UsageEventKind::FilReward);
        assert_eq!(event.properties["type"], json!("first_bucket_created"));
        assert_eq!(event.properties["amount"], json!(200));
        assert_eq!(event.properties["dev_key"], json!("dev1"));
    }

    #[test]
    fn claim_event_serializes_snake_case() {
        let claim = Claim {
            claim_id: "c1".to_string(),
            org_key: "org1".to_string(),
            claimed_by: "alice".to_string(),
            amount: 50,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(UsageEvent::claim(&claim)).unwrap();

        assert_eq!(value["kind"], json!("fil_claim"));
        assert_eq!(value["account_type"], json!("org"));
        assert_eq!(value["properties"]["claimed_by"], json!("alice"));
    }

    #[test]
    fn http_tracker_normalizes_endpoint() {
        let tracker = HttpUsageTracker::new("http://analytics.local:8080/").unwrap();
        assert_eq!(tracker.endpoint(), "http://analytics.local:8080/v1/track");
    }

    #[tokio::test]
    async fn unreachable_sink_reports_transport_error() {
        let tracker = HttpUsageTracker::new("http://127.0.0.1:9").unwrap();
        let claim = Claim {
            claim_id: "c1".to_string(),
            org_key: "org1".to_string(),
            claimed_by: "alice".to_string(),
            amount: 1,
            created_at: Utc::now(),
        };
        let result = tracker.track(UsageEvent::claim(&claim)).await;
        assert!(matches!(result, Err(TrackingError::Transport(_))));
    }
}
