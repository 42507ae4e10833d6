#![deny(unsafe_code)]

pub mod grpc;
pub mod pb;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use filrewards_core::{
    Balance, Claim, ClaimFilter, HttpUsageTracker, NoopTracker, Page, PageRequest, Reward,
    RewardFilter, RewardType, RewardsConfig, RewardsError, RewardsService, StorageConfig,
    TrackingError, UsageTracker,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub const SERVICE_NAME: &str = "filrewards-service";

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub rewards: RewardsConfig,
    pub storage: StorageConfig,
    /// Base URL of the usage-tracking endpoint. Events are dropped when unset.
    pub analytics_addr: Option<String>,
}

#[derive(Clone)]
pub struct ServiceState {
    pub rewards: RewardsService,
}

impl ServiceState {
    pub async fn bootstrap(config: ServiceConfig) -> Result<Self, ServiceError> {
        let ServiceConfig {
            rewards,
            storage,
            analytics_addr,
        } = config;

        let tracker: Arc<dyn UsageTracker> = match analytics_addr.as_deref() {
            Some(addr) if !addr.is_empty() => {
                info!(analytics_addr = addr, "usage tracking enabled");
                Arc::new(HttpUsageTracker::new(addr)?)
            }
            _ => Arc::new(NoopTracker),
        };
        let rewards = RewardsService::bootstrap(rewards, &storage, tracker).await?;

        Ok(Self { rewards })
    }
}

pub fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/events", post(process_event))
        .route("/v1/rewards", get(list_rewards))
        .route("/v1/claims", post(claim).get(list_claims))
        .route("/v1/balance/:org_key", get(balance))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("rewards error: {0}")]
    Rewards(#[from] RewardsError),
    #[error("tracking error: {0}")]
    Tracking(#[from] TrackingError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: StatusCode, message: String },
    #[error(transparent)]
    Rewards(#[from] RewardsError),
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Http { status, .. } => *status,
            ApiError::Rewards(err) if err.is_invalid_argument() => StatusCode::BAD_REQUEST,
            ApiError::Rewards(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Http { message, .. } => message,
            ApiError::Rewards(err) => err.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Treat an empty filter value the same as an absent one.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    backend: &'static str,
}

async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        backend: state.rewards.backend_label(),
    })
}

#[derive(Debug, Clone, Deserialize)]
struct ProcessEventBody {
    org_key: String,
    #[serde(default)]
    dev_key: String,
    event: String,
}

#[derive(Debug, Clone, Serialize)]
struct ProcessEventResponse {
    reward: Option<Reward>,
}

async fn process_event(
    State(state): State<ServiceState>,
    Json(body): Json<ProcessEventBody>,
) -> Result<Json<ProcessEventResponse>, ApiError> {
    let reward = state
        .rewards
        .process_event(&body.org_key, &body.dev_key, &body.event)
        .await?;
    Ok(Json(ProcessEventResponse { reward }))
}

#[derive(Debug, Clone, Deserialize)]
struct ListRewardsQuery {
    org_key: Option<String>,
    dev_key: Option<String>,
    reward_type: Option<String>,
    limit: Option<i64>,
    ascending: Option<bool>,
    start_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ListRewardsResponse {
    rewards: Vec<Reward>,
    more: bool,
    more_start_at: Option<DateTime<Utc>>,
}

impl From<Page<Reward>> for ListRewardsResponse {
    fn from(page: Page<Reward>) -> Self {
        Self {
            rewards: page.items,
            more: page.more,
            more_start_at: page.next_cursor,
        }
    }
}

fn parse_cursor(start_at: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match start_at.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| ApiError::bad_request(format!("invalid start_at '{value}': {e}"))),
    }
}

async fn list_rewards(
    State(state): State<ServiceState>,
    Query(query): Query<ListRewardsQuery>,
) -> Result<Json<ListRewardsResponse>, ApiError> {
    let reward_type = non_empty(query.reward_type)
        .map(|value| value.parse::<RewardType>())
        .transpose()?;
    let filter = RewardFilter {
        org_key: non_empty(query.org_key),
        dev_key: non_empty(query.dev_key),
        reward_type,
    };
    let request = PageRequest::new(
        query.limit,
        query.ascending.unwrap_or(false),
        parse_cursor(query.start_at.as_deref())?,
    );

    let page = state.rewards.list_rewards(&filter, &request).await?;
    Ok(Json(page.into()))
}

#[derive(Debug, Clone, Deserialize)]
struct ClaimBody {
    org_key: String,
    #[serde(default)]
    claimed_by: String,
    amount: i64,
}

#[derive(Debug, Clone, Serialize)]
struct ClaimResponse {
    claim: Claim,
}

async fn claim(
    State(state): State<ServiceState>,
    Json(body): Json<ClaimBody>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state
        .rewards
        .claim(&body.org_key, &body.claimed_by, body.amount)
        .await?;
    Ok(Json(ClaimResponse { claim }))
}

#[derive(Debug, Clone, Deserialize)]
struct ListClaimsQuery {
    org_key: Option<String>,
    claimed_by: Option<String>,
    limit: Option<i64>,
    ascending: Option<bool>,
    start_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ListClaimsResponse {
    claims: Vec<Claim>,
    more: bool,
    more_start_at: Option<DateTime<Utc>>,
}

impl From<Page<Claim>> for ListClaimsResponse {
    fn from(page: Page<Claim>) -> Self {
        Self {
            claims: page.items,
            more: page.more,
            more_start_at: page.next_cursor,
        }
    }
}

async fn list_claims(
    State(state): State<ServiceState>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<ListClaimsResponse>, ApiError> {
    let filter = ClaimFilter {
        org_key: non_empty(query.org_key),
        claimed_by: non_empty(query.claimed_by),
    };
    let request = PageRequest::new(
        query.limit,
        query.ascending.unwrap_or(false),
        parse_cursor(query.start_at.as_deref())?,
    );

    let page = state.rewards.list_claims(&filter, &request).await?;
    Ok(Json(page.into()))
}

async fn balance(
    Path(org_key): Path<String>,
    State(state): State<ServiceState>,
) -> Result<Json<Balance>, ApiError> {
    Ok(Json(state.rewards.balance(&org_key).await?))
}
