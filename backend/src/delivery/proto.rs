//! `fraud.v1` wire types and client stub
//!
//! Mirrors `proto/fraud/v1/fraud.proto`. Kept in-tree in the shape
//! `tonic-build` emits so the crate builds without `protoc`.

use crate::models::TransactionEvent;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionRequest {
    #[prost(string, tag = "1")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub user_id: i64,
    #[prost(int64, tag = "3")]
    pub timestamp: i64,
    #[prost(double, tag = "4")]
    pub amount: f64,
    #[prost(bool, tag = "5")]
    pub is_fraud: bool,
    #[prost(string, tag = "6")]
    pub r#type: ::prost::alloc::string::String,
    #[prost(double, tag = "7")]
    pub old_balance_orig: f64,
    #[prost(double, tag = "8")]
    pub new_balance_orig: f64,
    #[prost(double, tag = "9")]
    pub old_balance_dest: f64,
    #[prost(double, tag = "10")]
    pub new_balance_dest: f64,
    #[prost(double, tag = "11")]
    pub is_unauthorized_overdraft: f64,
    #[prost(string, tag = "12")]
    pub ip_address: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IngestionResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

impl From<&TransactionEvent> for TransactionRequest {
    fn from(event: &TransactionEvent) -> Self {
        let sample = event.sample();
        Self {
            transaction_id: event.transaction_id().to_string(),
            user_id: event.user_id().value(),
            timestamp: event.timestamp_ms(),
            amount: sample.amount(),
            is_fraud: sample.is_fraud(),
            r#type: sample.transaction_type().as_str().to_string(),
            old_balance_orig: sample.old_balance_orig(),
            new_balance_orig: sample.new_balance_orig(),
            old_balance_dest: sample.old_balance_dest(),
            new_balance_dest: sample.new_balance_dest(),
            is_unauthorized_overdraft: sample.is_unauthorized_overdraft(),
            ip_address: event.ip_address().to_string(),
        }
    }
}

/// Generated client implementations.
pub mod fraud_ingestion_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct FraudIngestionClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl FraudIngestionClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> FraudIngestionClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }

        pub async fn send_transaction(
            &mut self,
            request: impl tonic::IntoRequest<super::TransactionRequest>,
        ) -> std::result::Result<tonic::Response<super::IngestionResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/fraud.v1.FraudIngestion/SendTransaction");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
}
