// @generated
// Generated from: proto/filrewards/v1/filrewards.proto
// Manual check-in for offline builds.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::prost::Enumeration)]
#[repr(i32)]
pub enum RewardTypeProto {
    Unspecified = 0,
    FirstKeyAccountCreated = 1,
    FirstKeyUserCreated = 2,
    FirstOrgCreated = 3,
    InitialBillingSetup = 4,
    FirstBucketCreated = 5,
    FirstBucketArchiveCreated = 6,
    FirstMailboxCreated = 7,
    FirstThreadDbCreated = 8,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthReply {
    #[prost(string, tag = "1")]
    pub status: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub service: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub backend: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RewardMessage {
    #[prost(string, tag = "1")]
    pub reward_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub org_key: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub dev_key: ::prost::alloc::string::String,
    #[prost(enumeration = "RewardTypeProto", tag = "4")]
    pub reward_type: i32,
    #[prost(int64, tag = "5")]
    pub factor: i64,
    #[prost(int64, tag = "6")]
    pub base_atto_fil_reward: i64,
    #[prost(int64, tag = "7")]
    pub created_at_unix_micros: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClaimMessage {
    #[prost(string, tag = "1")]
    pub claim_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub org_key: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub claimed_by: ::prost::alloc::string::String,
    #[prost(int64, tag = "4")]
    pub amount: i64,
    #[prost(int64, tag = "5")]
    pub created_at_unix_micros: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProcessEventRequest {
    #[prost(string, tag = "1")]
    pub org_key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dev_key: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub event: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProcessEventResponse {
    #[prost(message, optional, tag = "1")]
    pub reward: ::core::option::Option<RewardMessage>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRewardsRequest {
    #[prost(string, tag = "1")]
    pub org_key_filter: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dev_key_filter: ::prost::alloc::string::String,
    #[prost(enumeration = "RewardTypeProto", tag = "3")]
    pub reward_type_filter: i32,
    #[prost(int64, tag = "4")]
    pub limit: i64,
    #[prost(bool, tag = "5")]
    pub ascending: bool,
    #[prost(int64, optional, tag = "6")]
    pub start_at_unix_micros: ::core::option::Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListRewardsResponse {
    #[prost(message, repeated, tag = "1")]
    pub rewards: ::prost::alloc::vec::Vec<RewardMessage>,
    #[prost(bool, tag = "2")]
    pub more: bool,
    #[prost(int64, optional, tag = "3")]
    pub more_start_at_unix_micros: ::core::option::Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClaimRequest {
    #[prost(string, tag = "1")]
    pub org_key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub claimed_by: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClaimResponse {
    #[prost(message, optional, tag = "1")]
    pub claim: ::core::option::Option<ClaimMessage>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListClaimsRequest {
    #[prost(string, tag = "1")]
    pub org_key_filter: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub claimed_by_filter: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub limit: i64,
    #[prost(bool, tag = "4")]
    pub ascending: bool,
    #[prost(int64, optional, tag = "5")]
    pub start_at_unix_micros: ::core::option::Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListClaimsResponse {
    #[prost(message, repeated, tag = "1")]
    pub claims: ::prost::alloc::vec::Vec<ClaimMessage>,
    #[prost(bool, tag = "2")]
    pub more: bool,
    #[prost(int64, optional, tag = "3")]
    pub more_start_at_unix_micros: ::core::option::Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BalanceRequest {
    #[prost(string, tag = "1")]
    pub org_key: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BalanceResponse {
    #[prost(int64, tag = "1")]
    pub rewarded: i64,
    #[prost(int64, tag = "2")]
    pub claimed: i64,
    #[prost(int64, tag = "3")]
    pub available: i64,
}

pub mod fil_rewards_service_client {
    #![allow(clippy::derive_partial_eq_without_eq)]
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct FilRewardsServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl FilRewardsServiceClient<tonic::transport::Channel> {
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> FilRewardsServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
        <T::ResponseBody as Body>::Data: Into<Bytes> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub async fn health(
            &mut self,
            request: impl tonic::IntoRequest<super::HealthRequest>,
        ) -> Result<tonic::Response<super::HealthReply>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static(
                "/filrewards.v1.FilRewardsService/Health",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn process_event(
            &mut self,
            request: impl tonic::IntoRequest<super::ProcessEventRequest>,
        ) -> Result<tonic::Response<super::ProcessEventResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static(
                "/filrewards.v1.FilRewardsService/ProcessEvent",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn list_rewards(
            &mut self,
            request: impl tonic::IntoRequest<super::ListRewardsRequest>,
        ) -> Result<tonic::Response<super::ListRewardsResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static(
                "/filrewards.v1.FilRewardsService/ListRewards",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn claim(
            &mut self,
            request: impl tonic::IntoRequest<super::ClaimRequest>,
        ) -> Result<tonic::Response<super::ClaimResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static(
                "/filrewards.v1.FilRewardsService/Claim",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn list_claims(
            &mut self,
            request: impl tonic::IntoRequest<super::ListClaimsRequest>,
        ) -> Result<tonic::Response<super::ListClaimsResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static(
                "/filrewards.v1.FilRewardsService/ListClaims",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }

        pub async fn balance(
            &mut self,
            request: impl tonic::IntoRequest<super::BalanceRequest>,
        ) -> Result<tonic::Response<super::BalanceResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = tonic::codegen::http::uri::PathAndQuery::from_static(
                "/filrewards.v1.FilRewardsService/Balance",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}

pub mod fil_rewards_service_server {
    #![allow(clippy::derive_partial_eq_without_eq)]
    use tonic::codegen::*;

    #[tonic::async_trait]
    pub trait FilRewardsService: Send + Sync + 'static {
        async fn health(
            &self,
            request: tonic::Request<super::HealthRequest>,
        ) -> Result<tonic::Response<super::HealthReply>, tonic::Status>;
        async fn process_event(
            &self,
            request: tonic::Request<super::ProcessEventRequest>,
        ) -> Result<tonic::Response<super::ProcessEventResponse>, tonic::Status>;
        async fn list_rewards(
            &self,
            request: tonic::Request<super::ListRewardsRequest>,
        ) -> Result<tonic::Response<super::ListRewardsResponse>, tonic::Status>;
        async fn claim(
            &self,
            request: tonic::Request<super::ClaimRequest>,
        ) -> Result<tonic::Response<super::ClaimResponse>, tonic::Status>;
        async fn list_claims(
            &self,
            request: tonic::Request<super::ListClaimsRequest>,
        ) -> Result<tonic::Response<super::ListClaimsResponse>, tonic::Status>;
        async fn balance(
            &self,
            request: tonic::Request<super::BalanceRequest>,
        ) -> Result<tonic::Response<super::BalanceResponse>, tonic::Status>;
    }

    #[derive(Debug, Clone)]
    pub struct FilRewardsServiceServer<T: FilRewardsService> {
        inner: Arc<T>,
    }

    impl<T: FilRewardsService> FilRewardsServiceServer<T> {
        pub fn new(inner: T) -> Self {
            Self {
                inner: Arc::new(inner),
            }
        }
    }

    impl<T: FilRewardsService> Service<http::Request<tonic::body::BoxBody>>
        for FilRewardsServiceServer<T>
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<tonic::body::BoxBody>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/filrewards.v1.FilRewardsService/Health" => {
                    struct HealthSvc<T: FilRewardsService>(pub Arc<T>);
                    impl<T: FilRewardsService> tonic::server::UnaryService<super::HealthRequest>
                        for HealthSvc<T>
                    {
                        type Response = super::HealthReply;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::HealthRequest>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.health(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = HealthSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                "/filrewards.v1.FilRewardsService/ProcessEvent" => {
                    struct ProcessEventSvc<T: FilRewardsService>(pub Arc<T>);
                    impl<T: FilRewardsService> tonic::server::UnaryService<super::ProcessEventRequest>
                        for ProcessEventSvc<T>
                    {
                        type Response = super::ProcessEventResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProcessEventRequest>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.process_event(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = ProcessEventSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                "/filrewards.v1.FilRewardsService/ListRewards" => {
                    struct ListRewardsSvc<T: FilRewardsService>(pub Arc<T>);
                    impl<T: FilRewardsService> tonic::server::UnaryService<super::ListRewardsRequest>
                        for ListRewardsSvc<T>
                    {
                        type Response = super::ListRewardsResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ListRewardsRequest>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.list_rewards(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = ListRewardsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                "/filrewards.v1.FilRewardsService/Claim" => {
                    struct ClaimSvc<T: FilRewardsService>(pub Arc<T>);
                    impl<T: FilRewardsService> tonic::server::UnaryService<super::ClaimRequest>
                        for ClaimSvc<T>
                    {
                        type Response = super::ClaimResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ClaimRequest>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.claim(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = ClaimSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                "/filrewards.v1.FilRewardsService/ListClaims" => {
                    struct ListClaimsSvc<T: FilRewardsService>(pub Arc<T>);
                    impl<T: FilRewardsService> tonic::server::UnaryService<super::ListClaimsRequest>
                        for ListClaimsSvc<T>
                    {
                        type Response = super::ListClaimsResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ListClaimsRequest>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.list_claims(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = ListClaimsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                "/filrewards.v1.FilRewardsService/Balance" => {
                    struct BalanceSvc<T: FilRewardsService>(pub Arc<T>);
                    impl<T: FilRewardsService> tonic::server::UnaryService<super::BalanceRequest>
                        for BalanceSvc<T>
                    {
                        type Response = super::BalanceResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::BalanceRequest>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            Box::pin(async move { inner.balance(request).await })
                        }
                    }
                    Box::pin(async move {
                        let method = BalanceSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    })
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::empty_body())
                        .unwrap())
                }),
            }
        }
    }

    impl<T: FilRewardsService> tonic::server::NamedService for FilRewardsServiceServer<T> {
        const NAME: &'static str = "filrewards.v1.FilRewardsService";
    }
}
