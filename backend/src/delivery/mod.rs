//! Delivery of events to the ingestion service
//!
//! [`IngestionSink`] is the seam between the scheduler and the remote
//! service. The production sink is [`GrpcIngestionClient`]: one long-lived
//! channel opened at startup and reused for every send.
//!
//! # Failure Taxonomy
//!
//! | Error                          | Class     | Cooldown (default) |
//! |--------------------------------|-----------|--------------------|
//! | [`DeliveryError::Rpc`]         | transport | 2s                 |
//! | [`DeliveryError::Closed`]      | other     | 1s                 |
//! | [`DeliveryError::Unexpected`]  | other     | 1s                 |
//!
//! Neither class tears down the channel or stops the generator.

pub mod grpc;
pub mod proto;

pub use grpc::GrpcIngestionClient;

use crate::models::TransactionEvent;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while delivering an event
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeliveryError {
    /// Server unreachable, deadline exceeded, or any status the server returned
    #[error("{code:?} - {message}")]
    Rpc { code: tonic::Code, message: String },

    /// The sink was closed by shutdown
    #[error("Delivery channel is closed")]
    Closed,

    /// Server address could not be turned into an endpoint
    #[error("Invalid server address {addr}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// Anything else that went wrong around the call
    #[error("{0}")]
    Unexpected(String),
}

impl DeliveryError {
    /// Whether this failure belongs to the transport class
    pub fn is_transport(&self) -> bool {
        matches!(self, DeliveryError::Rpc { .. })
    }
}

impl From<tonic::Status> for DeliveryError {
    fn from(status: tonic::Status) -> Self {
        DeliveryError::Rpc {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

/// Acknowledgement returned by the ingestion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    /// Whether the service accepted the event
    pub success: bool,
    /// Short human-readable status
    pub message: String,
}

impl Acknowledgement {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<proto::IngestionResponse> for Acknowledgement {
    fn from(resp: proto::IngestionResponse) -> Self {
        Self {
            success: resp.success,
            message: resp.message,
        }
    }
}

/// Destination for generated events
#[async_trait]
pub trait IngestionSink: Send {
    /// Send one event and wait for the acknowledgement
    async fn send(&mut self, event: &TransactionEvent) -> Result<Acknowledgement, DeliveryError>;

    /// Release the underlying channel; later sends fail with `Closed`
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}
