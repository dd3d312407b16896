//! Common test utilities for scheduler and run-loop tests.
//!
//! [`RecordingSink`] stands in for the ingestion service. It records every
//! event it is handed and plays back scripted outcomes, so tests can drive
//! success, rejection and failure paths without a server.

#![allow(dead_code)]

use async_trait::async_trait;
use fraud_txgen_core::delivery::{Acknowledgement, DeliveryError, IngestionSink};
use fraud_txgen_core::identity::IdentityPool;
use fraud_txgen_core::synthesis::{ProfileModel, TransactionModel, TransactionSynthesizer};
use fraud_txgen_core::{Orchestrator, OrchestratorConfig, RngManager, TransactionEvent};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SAMPLE_ARTIFACT: &str = include_str!("../../../models/transaction_profile.json");

/// What the sink observed
#[derive(Debug, Default)]
pub struct SinkLog {
    pub events: Vec<TransactionEvent>,
    pub close_calls: usize,
    /// Outcomes for upcoming sends; accepted once exhausted
    pub script: VecDeque<Result<Acknowledgement, DeliveryError>>,
}

pub type SinkHandle = Arc<Mutex<SinkLog>>;

/// In-memory [`IngestionSink`]
pub struct RecordingSink {
    log: SinkHandle,
    closed: bool,
}

impl RecordingSink {
    pub fn new() -> (Self, SinkHandle) {
        let log = SinkHandle::default();
        (
            Self {
                log: log.clone(),
                closed: false,
            },
            log,
        )
    }

    pub fn scripted(
        outcomes: Vec<Result<Acknowledgement, DeliveryError>>,
    ) -> (Self, SinkHandle) {
        let (sink, log) = Self::new();
        log.lock().unwrap().script = outcomes.into();
        (sink, log)
    }
}

#[async_trait]
impl IngestionSink for RecordingSink {
    async fn send(&mut self, event: &TransactionEvent) -> Result<Acknowledgement, DeliveryError> {
        if self.closed {
            return Err(DeliveryError::Closed);
        }
        let mut log = self.log.lock().unwrap();
        log.events.push(event.clone());
        log.script
            .pop_front()
            .unwrap_or_else(|| Ok(Acknowledgement::accepted("Queued")))
    }

    fn close(&mut self) {
        self.closed = true;
        self.log.lock().unwrap().close_calls += 1;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

pub fn unavailable() -> DeliveryError {
    DeliveryError::Rpc {
        code: tonic::Code::Unavailable,
        message: "connection refused".to_string(),
    }
}

pub fn sample_model() -> Box<dyn TransactionModel> {
    Box::new(ProfileModel::from_json(SAMPLE_ARTIFACT).unwrap())
}

pub fn test_config(fraud_probability: f64) -> OrchestratorConfig {
    OrchestratorConfig {
        fraud_probability,
        tick_interval: Duration::from_millis(200),
        transport_cooldown: Duration::from_secs(2),
        error_cooldown: Duration::from_secs(1),
    }
}

/// Orchestrator over `customers` synthetic ids and the given sink
pub fn orchestrator_with(
    config: OrchestratorConfig,
    customers: usize,
    seed: u64,
    sink: RecordingSink,
) -> Orchestrator {
    Orchestrator::new(
        config,
        &IdentityPool::synthetic(customers),
        TransactionSynthesizer::new(sample_model()),
        Box::new(sink),
        RngManager::new(seed),
    )
    .unwrap()
}
