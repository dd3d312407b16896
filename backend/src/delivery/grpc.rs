//! gRPC ingestion client
//!
//! Opens one insecure, lazily connected channel to `host:port` and reuses it
//! for every call. The channel reconnects underneath on its own; this client
//! never rebuilds it.

use crate::delivery::proto::fraud_ingestion_client::FraudIngestionClient;
use crate::delivery::proto::TransactionRequest;
use crate::delivery::{Acknowledgement, DeliveryError, IngestionSink};
use crate::models::TransactionEvent;
use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

/// Turn `host:port` into an `http://` URI; URIs with a scheme pass through
pub fn endpoint_uri(addr: &str) -> String {
    let addr = addr.trim();
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

/// [`IngestionSink`] over a persistent tonic channel
#[derive(Debug)]
pub struct GrpcIngestionClient {
    client: Option<FraudIngestionClient<Channel>>,
    uri: String,
}

impl GrpcIngestionClient {
    /// Build the channel for `addr` without waiting for the server
    ///
    /// Must be called from within a tokio runtime. An unreachable server is
    /// not an error here; it surfaces as an `Rpc` error on the first send.
    pub fn connect(addr: &str) -> Result<Self, DeliveryError> {
        let uri = endpoint_uri(addr);
        let endpoint =
            Endpoint::from_shared(uri.clone()).map_err(|e| DeliveryError::InvalidAddress {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;

        let channel = endpoint.connect_lazy();
        info!(uri = %uri, "Opened ingestion channel");

        Ok(Self {
            client: Some(FraudIngestionClient::new(channel)),
            uri,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[async_trait]
impl IngestionSink for GrpcIngestionClient {
    async fn send(&mut self, event: &TransactionEvent) -> Result<Acknowledgement, DeliveryError> {
        let client = self.client.as_mut().ok_or(DeliveryError::Closed)?;

        let request = TransactionRequest::from(event);
        let response = client.send_transaction(request).await?;

        Ok(Acknowledgement::from(response.into_inner()))
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            debug!(uri = %self.uri, "Dropped ingestion channel");
        }
    }

    fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_uri() {
        assert_eq!(endpoint_uri("localhost:50051"), "http://localhost:50051");
        assert_eq!(endpoint_uri(" ingest:9000 "), "http://ingest:9000");
        assert_eq!(endpoint_uri("http://10.0.0.5:50051"), "http://10.0.0.5:50051");
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let err = GrpcIngestionClient::connect("not a host:port").unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut client = GrpcIngestionClient::connect("127.0.0.1:1").unwrap();
        assert!(!client.is_closed());

        client.close();
        client.close();
        assert!(client.is_closed());
    }
}
