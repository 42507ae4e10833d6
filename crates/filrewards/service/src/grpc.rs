use crate::pb::filrewards::v1::fil_rewards_service_server::{
    FilRewardsService, FilRewardsServiceServer,
};
use crate::pb::filrewards::v1::{
    BalanceRequest, BalanceResponse, ClaimMessage, ClaimRequest, ClaimResponse, HealthReply,
    HealthRequest, ListClaimsRequest, ListClaimsResponse, ListRewardsRequest, ListRewardsResponse,
    ProcessEventRequest, ProcessEventResponse, RewardMessage, RewardTypeProto,
};
use crate::{non_empty, ServiceState, SERVICE_NAME};
use chrono::{DateTime, Utc};
use filrewards_core::{
    Claim, ClaimFilter, PageRequest, Reward, RewardFilter, RewardType, RewardsError,
};
use std::future::Future;
use std::net::SocketAddr;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::error;

#[derive(Clone)]
pub struct GrpcApi {
    state: ServiceState,
}

impl GrpcApi {
    pub fn new(state: ServiceState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl FilRewardsService for GrpcApi {
    async fn health(
        &self,
        _request: Request<HealthRequest>,
    ) -> Result<Response<HealthReply>, Status> {
        Ok(Response::new(HealthReply {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
            backend: self.state.rewards.backend_label().to_string(),
        }))
    }

    async fn process_event(
        &self,
        request: Request<ProcessEventRequest>,
    ) -> Result<Response<ProcessEventResponse>, Status> {
        let req = request.into_inner();
        let reward = self
            .state
            .rewards
            .process_event(&req.org_key, &req.dev_key, &req.event)
            .await
            .map_err(rewards_error_to_status)?;
        Ok(Response::new(ProcessEventResponse {
            reward: reward.map(from_core_reward),
        }))
    }

    async fn list_rewards(
        &self,
        request: Request<ListRewardsRequest>,
    ) -> Result<Response<ListRewardsResponse>, Status> {
        let req = request.into_inner();
        let filter = RewardFilter {
            org_key: non_empty(Some(req.org_key_filter)),
            dev_key: non_empty(Some(req.dev_key_filter)),
            reward_type: into_core_reward_type(req.reward_type_filter)?,
        };
        let page_request = PageRequest::new(
            Some(req.limit),
            req.ascending,
            req.start_at_unix_micros
                .map(unix_micros_to_datetime)
                .transpose()?,
        );

        let page = self
            .state
            .rewards
            .list_rewards(&filter, &page_request)
            .await
            .map_err(rewards_error_to_status)?;
        Ok(Response::new(ListRewardsResponse {
            rewards: page.items.into_iter().map(from_core_reward).collect(),
            more: page.more,
            more_start_at_unix_micros: page.next_cursor.map(datetime_to_unix_micros),
        }))
    }

    async fn claim(
        &self,
        request: Request<ClaimRequest>,
    ) -> Result<Response<ClaimResponse>, Status> {
        let req = request.into_inner();
        let claim = self
            .state
            .rewards
            .claim(&req.org_key, &req.claimed_by, req.amount)
            .await
            .map_err(rewards_error_to_status)?;
        Ok(Response::new(ClaimResponse {
            claim: Some(from_core_claim(claim)),
        }))
    }

    async fn list_claims(
        &self,
        request: Request<ListClaimsRequest>,
    ) -> Result<Response<ListClaimsResponse>, Status> {
        let req = request.into_inner();
        let filter = ClaimFilter {
            org_key: non_empty(Some(req.org_key_filter)),
            claimed_by: non_empty(Some(req.claimed_by_filter)),
        };
        let page_request = PageRequest::new(
            Some(req.limit),
            req.ascending,
            req.start_at_unix_micros
                .map(unix_micros_to_datetime)
                .transpose()?,
        );

        let page = self
            .state
            .rewards
            .list_claims(&filter, &page_request)
            .await
            .map_err(rewards_error_to_status)?;
        Ok(Response::new(ListClaimsResponse {
            claims: page.items.into_iter().map(from_core_claim).collect(),
            more: page.more,
            more_start_at_unix_micros: page.next_cursor.map(datetime_to_unix_micros),
        }))
    }

    async fn balance(
        &self,
        request: Request<BalanceRequest>,
    ) -> Result<Response<BalanceResponse>, Status> {
        let req = request.into_inner();
        let balance = self
            .state
            .rewards
            .balance(&req.org_key)
            .await
            .map_err(rewards_error_to_status)?;
        Ok(Response::new(BalanceResponse {
            rewarded: balance.rewarded,
            claimed: balance.claimed,
            available: balance.available,
        }))
    }
}

fn rewards_error_to_status(err: RewardsError) -> Status {
    if err.is_invalid_argument() {
        Status::invalid_argument(err.to_string())
    } else {
        error!(error = %err, "rpc failed");
        Status::internal(err.to_string())
    }
}

fn into_core_reward_type(value: i32) -> Result<Option<RewardType>, Status> {
    let proto = RewardTypeProto::try_from(value)
        .map_err(|_| Status::invalid_argument(format!("unknown reward type {value}")))?;
    Ok(match proto {
        RewardTypeProto::Unspecified => None,
        RewardTypeProto::FirstKeyAccountCreated => Some(RewardType::FirstKeyAccountCreated),
        RewardTypeProto::FirstKeyUserCreated => Some(RewardType::FirstKeyUserCreated),
        RewardTypeProto::FirstOrgCreated => Some(RewardType::FirstOrgCreated),
        RewardTypeProto::InitialBillingSetup => Some(RewardType::InitialBillingSetup),
        RewardTypeProto::FirstBucketCreated => Some(RewardType::FirstBucketCreated),
        RewardTypeProto::FirstBucketArchiveCreated => Some(RewardType::FirstBucketArchiveCreated),
        RewardTypeProto::FirstMailboxCreated => Some(RewardType::FirstMailboxCreated),
        RewardTypeProto::FirstThreadDbCreated => Some(RewardType::FirstThreadDbCreated),
    })
}

fn from_core_reward_type(reward_type: RewardType) -> RewardTypeProto {
    match reward_type {
        RewardType::FirstKeyAccountCreated => RewardTypeProto::FirstKeyAccountCreated,
        RewardType::FirstKeyUserCreated => RewardTypeProto::FirstKeyUserCreated,
        RewardType::FirstOrgCreated => RewardTypeProto::FirstOrgCreated,
        RewardType::InitialBillingSetup => RewardTypeProto::InitialBillingSetup,
        RewardType::FirstBucketCreated => RewardTypeProto::FirstBucketCreated,
        RewardType::FirstBucketArchiveCreated => RewardTypeProto::FirstBucketArchiveCreated,
        RewardType::FirstMailboxCreated => RewardTypeProto::FirstMailboxCreated,
        RewardType::FirstThreadDbCreated => RewardTypeProto::FirstThreadDbCreated,
    }
}

fn from_core_reward(reward: Reward) -> RewardMessage {
    RewardMessage {
        reward_id: reward.reward_id,
        org_key: reward.org_key,
        dev_key: reward.dev_key,
        reward_type: from_core_reward_type(reward.reward_type) as i32,
        factor: reward.factor,
        base_atto_fil_reward: reward.base_amount,
        created_at_unix_micros: datetime_to_unix_micros(reward.created_at),
    }
}

fn from_core_claim(claim: Claim) -> ClaimMessage {
    ClaimMessage {
        claim_id: claim.claim_id,
        org_key: claim.org_key,
        claimed_by: claim.claimed_by,
        amount: claim.amount,
        created_at_unix_micros: datetime_to_unix_micros(claim.created_at),
    }
}

fn datetime_to_unix_micros(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_micros()
}

fn unix_micros_to_datetime(micros: i64) -> Result<DateTime<Utc>, Status> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| Status::invalid_argument(format!("timestamp {micros} is out of range")))
}

pub async fn serve_grpc<F>(state: ServiceState, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let service = FilRewardsServiceServer::new(GrpcApi::new(state));

    Server::builder()
        .add_service(service)
        .serve_with_shutdown(addr, shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceConfig;
    use filrewards_core::RewardsConfig;

    async fn api(base_amount: i64) -> GrpcApi {
        let state = ServiceState::bootstrap(ServiceConfig {
            rewards: RewardsConfig::default().with_base_amount(base_amount),
            ..ServiceConfig::default()
        })
        .await
        .unwrap();
        GrpcApi::new(state)
    }

    fn event(org_key: &str, dev_key: &str, event: &str) -> Request<ProcessEventRequest> {
        Request::new(ProcessEventRequest {
            org_key: org_key.to_string(),
            dev_key: dev_key.to_string(),
            event: event.to_string(),
        })
    }

    #[tokio::test]
    async fn process_event_grants_then_returns_empty() {
        let api = api(100).await;

        let first = api
            .process_event(event("org1", "dev1", "bucket_created"))
            .await
            .unwrap()
            .into_inner();
        let reward = first.reward.unwrap();
        assert_eq!(reward.reward_type, RewardTypeProto::FirstBucketCreated as i32);
        assert_eq!(reward.factor, 2);
        assert_eq!(reward.base_atto_fil_reward, 100);

        let second = api
            .process_event(event("org1", "dev1", "bucket_created"))
            .await
            .unwrap()
            .into_inner();
        assert!(second.reward.is_none());

        let unmapped = api
            .process_event(event("org1", "dev1", "fil_reward"))
            .await
            .unwrap()
            .into_inner();
        assert!(unmapped.reward.is_none());
    }

    #[tokio::test]
    async fn claim_beyond_balance_is_invalid_argument() {
        let api = api(100).await;
        api.process_event(event("org1", "", "bucket_created"))
            .await
            .unwrap();

        let status = api
            .claim(Request::new(ClaimRequest {
                org_key: "org1".to_string(),
                claimed_by: "alice".to_string(),
                amount: 201,
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let claimed = api
            .claim(Request::new(ClaimRequest {
                org_key: "org1".to_string(),
                claimed_by: "alice".to_string(),
                amount: 200,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(claimed.claim.unwrap().amount, 200);

        let balance = api
            .balance(Request::new(BalanceRequest {
                org_key: "org1".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(
            (balance.rewarded, balance.claimed, balance.available),
            (200, 200, 0)
        );
    }

    #[tokio::test]
    async fn empty_org_key_is_invalid_argument() {
        let api = api(100).await;
        let status = api
            .process_event(event("", "dev1", "org_created"))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn list_rewards_pages_by_micros_cursor() {
        let api = api(10).await;
        for org_key in ["a", "b", "c", "d", "e"] {
            api.process_event(event(org_key, "", "org_created"))
                .await
                .unwrap();
        }

        let list = |start_at: Option<i64>| ListRewardsRequest {
            org_key_filter: String::new(),
            dev_key_filter: String::new(),
            reward_type_filter: RewardTypeProto::FirstOrgCreated as i32,
            limit: 2,
            ascending: true,
            start_at_unix_micros: start_at,
        };

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = api
                .list_rewards(Request::new(list(cursor)))
                .await
                .unwrap()
                .into_inner();
            seen.extend(page.rewards.into_iter().map(|r| r.org_key));
            if !page.more {
                assert!(page.more_start_at_unix_micros.is_none());
                break;
            }
            cursor = page.more_start_at_unix_micros;
        }
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn list_claims_filters_by_org() {
        let api = api(1000).await;
        for org_key in ["org1", "org2"] {
            api.process_event(event(org_key, "", "org_created"))
                .await
                .unwrap();
            api.claim(Request::new(ClaimRequest {
                org_key: org_key.to_string(),
                claimed_by: "ops".to_string(),
                amount: 10,
            }))
            .await
            .unwrap();
        }

        let page = api
            .list_claims(Request::new(ListClaimsRequest {
                org_key_filter: "org2".to_string(),
                claimed_by_filter: String::new(),
                limit: 0,
                ascending: false,
                start_at_unix_micros: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(page.claims.len(), 1);
        assert_eq!(page.claims[0].org_key, "org2");
        assert!(!page.more);
    }

    #[tokio::test]
    async fn unknown_reward_type_filter_is_rejected() {
        let api = api(10).await;
        let status = api
            .list_rewards(Request::new(ListRewardsRequest {
                reward_type_filter: 42,
                ..ListRewardsRequest::default()
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn reward_types_map_both_ways() {
        for reward_type in RewardType::ALL {
            let proto = from_core_reward_type(reward_type) as i32;
            assert_eq!(into_core_reward_type(proto).unwrap(), Some(reward_type));
        }
        assert_eq!(into_core_reward_type(0).unwrap(), None);
    }

    #[tokio::test]
    async fn health_names_service_and_backend() {
        let reply = api(10)
            .await
            .health(Request::new(HealthRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(reply.status, "ok");
        assert_eq!(reply.service, SERVICE_NAME);
        assert_eq!(reply.backend, "memory");
    }
}
