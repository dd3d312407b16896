//! Integration tests for the Orchestrator tick pipeline
//!
//! These tests drive the complete per-tick cycle: agent selection, fraud
//! decision, conditioned synthesis, network context and delivery, against
//! an in-memory sink.

mod common;

use common::{orchestrator_with, sample_model, test_config, unavailable, RecordingSink};
use fraud_txgen_core::config::GeneratorConfig;
use fraud_txgen_core::core::time::{EventClock, TimeSource};
use fraud_txgen_core::delivery::{Acknowledgement, DeliveryError, IngestionSink};
use fraud_txgen_core::identity::{IdentityPool, SYNTHETIC_ID_BASE};
use fraud_txgen_core::orchestrator::{SchedulerState, SimulationError, TickError};
use fraud_txgen_core::synthesis::{ModelLoadError, TransactionModel, TransactionSynthesizer};
use fraud_txgen_core::{build_orchestrator, Orchestrator, RngManager, StartupError};
use std::cell::Cell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_empty_pool_rejected() {
    let (sink, _) = RecordingSink::new();
    let result = Orchestrator::new(
        test_config(0.05),
        &IdentityPool::synthetic(0),
        TransactionSynthesizer::new(sample_model()),
        Box::new(sink),
        RngManager::new(1),
    );

    assert_eq!(result.unwrap_err(), SimulationError::EmptyPopulation);
}

#[test]
fn test_invalid_fraud_probability_rejected() {
    let (sink, _) = RecordingSink::new();
    let result = Orchestrator::new(
        test_config(1.5),
        &IdentityPool::synthetic(3),
        TransactionSynthesizer::new(sample_model()),
        Box::new(sink),
        RngManager::new(1),
    );

    assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
}

#[test]
fn test_population_built_from_pool() {
    let (sink, _) = RecordingSink::new();
    let orch = orchestrator_with(test_config(0.05), 30, 1, sink);

    assert_eq!(orch.state().num_agents(), 30);
    assert_eq!(orch.status(), SchedulerState::Ready);
}

// ============================================================================
// Step
// ============================================================================

#[tokio::test]
async fn test_step_sends_exactly_one_event() {
    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.05), 5, 2, sink);

    let result = orch.step().await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.events.len(), 1);
    let event = &log.events[0];
    assert_eq!(event.transaction_id(), result.transaction_id);
    assert_eq!(event.user_id(), result.user_id);
    assert_eq!(event.ip_address(), result.ip_address);
    assert_eq!(event.is_fraud(), result.is_fraud);
    assert!(result.ack.success);
}

#[tokio::test]
async fn test_events_come_from_the_population() {
    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.05), 10, 3, sink);

    for _ in 0..500 {
        orch.step().await.unwrap();
    }

    let log = log.lock().unwrap();
    let users: HashSet<i64> = log.events.iter().map(|e| e.user_id().value()).collect();
    assert_eq!(users.len(), 10);
    assert!(users
        .iter()
        .all(|id| (SYNTHETIC_ID_BASE..SYNTHETIC_ID_BASE + 10).contains(id)));
}

#[tokio::test]
async fn test_transaction_ids_unique() {
    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.5), 3, 4, sink);

    for _ in 0..1_000 {
        orch.step().await.unwrap();
    }

    let log = log.lock().unwrap();
    let ids: HashSet<&str> = log.events.iter().map(|e| e.transaction_id()).collect();
    assert_eq!(ids.len(), 1_000);
}

#[tokio::test]
async fn test_fraud_probability_one_makes_every_event_fraud() {
    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(1.0), 5, 5, sink);

    for _ in 0..200 {
        orch.step().await.unwrap();
    }

    assert!(log.lock().unwrap().events.iter().all(|e| e.is_fraud()));
}

#[tokio::test]
async fn test_fraud_probability_zero_makes_no_fraud() {
    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.0), 5, 6, sink);

    for _ in 0..200 {
        orch.step().await.unwrap();
    }

    assert!(log.lock().unwrap().events.iter().all(|e| !e.is_fraud()));
}

#[tokio::test]
async fn test_fraud_rate_converges() {
    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.05), 30, 7, sink);

    for _ in 0..20_000 {
        orch.step().await.unwrap();
    }

    let log = log.lock().unwrap();
    let fraud = log.events.iter().filter(|e| e.is_fraud()).count();
    let rate = fraud as f64 / 20_000.0;
    assert!((rate - 0.05).abs() < 0.01, "rate {}", rate);
}

#[tokio::test]
async fn test_prefix_relationship_by_label() {
    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.5), 5, 8, sink);

    let mut legit = (0usize, 0usize);
    let mut fraud = (0usize, 0usize);
    for _ in 0..20_000 {
        let result = orch.step().await.unwrap();
        let agent = orch.state().get_agent(result.user_id).unwrap();
        let shares = result.ip_address.octets()[..2] == agent.home_prefix();

        assert_eq!(shares, result.scenario.shares_home_prefix());
        let bucket = if result.is_fraud { &mut fraud } else { &mut legit };
        bucket.0 += shares as usize;
        bucket.1 += 1;
    }

    let legit_share = legit.0 as f64 / legit.1 as f64;
    let fraud_share = fraud.0 as f64 / fraud.1 as f64;
    assert!((legit_share - 0.85).abs() < 0.02, "legit {}", legit_share);
    assert!((fraud_share - 0.20).abs() < 0.02, "fraud {}", fraud_share);
    assert!(log.lock().unwrap().events.len() == 20_000);
}

#[tokio::test]
async fn test_timestamps_non_decreasing_in_send_order() {
    /// Wall clock that steps back 7ms on every read
    struct Backwards(AtomicI64);
    impl TimeSource for Backwards {
        fn now_ms(&self) -> i64 {
            self.0.fetch_sub(7, Ordering::SeqCst)
        }
    }

    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.05), 3, 9, sink)
        .with_clock(EventClock::new(Box::new(Backwards(AtomicI64::new(1_000_000)))));

    for _ in 0..50 {
        orch.step().await.unwrap();
    }

    let log = log.lock().unwrap();
    let stamps: Vec<i64> = log.events.iter().map(|e| e.timestamp_ms()).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

// ============================================================================
// Tick outcomes and cooldowns
// ============================================================================

#[tokio::test]
async fn test_tick_success_returns_cadence() {
    let (sink, _) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.05), 3, 10, sink);

    assert_eq!(orch.tick().await, Duration::from_millis(200));
    assert_eq!(orch.stats().delivered, 1);
}

#[tokio::test]
async fn test_transport_failure_then_recovery() {
    let (sink, log) = RecordingSink::scripted(vec![Err(unavailable())]);
    let mut orch = orchestrator_with(test_config(0.05), 3, 11, sink);

    assert_eq!(orch.tick().await, Duration::from_secs(2));
    assert_eq!(orch.tick().await, Duration::from_millis(200));

    let stats = orch.stats();
    assert_eq!(stats.ticks, 2);
    assert_eq!(stats.transport_failures, 1);
    assert_eq!(stats.delivered, 1);

    // The failed event is not retried: the second send is a new event
    let log = log.lock().unwrap();
    assert_eq!(log.events.len(), 2);
    assert_ne!(log.events[0].transaction_id(), log.events[1].transaction_id());
}

#[tokio::test]
async fn test_other_failure_uses_error_cooldown() {
    let (sink, _) =
        RecordingSink::scripted(vec![Err(DeliveryError::Unexpected("encoder".into()))]);
    let mut orch = orchestrator_with(test_config(0.05), 3, 12, sink);

    assert_eq!(orch.tick().await, Duration::from_secs(1));
    assert_eq!(orch.stats().other_failures, 1);
}

#[tokio::test]
async fn test_synthesis_failure_uses_error_cooldown() {
    struct AlwaysLegit;
    impl TransactionModel for AlwaysLegit {
        fn sample(
            &mut self,
            _condition: Option<bool>,
            _rng: &mut RngManager,
        ) -> Result<fraud_txgen_core::TransactionSample, fraud_txgen_core::SynthesisError> {
            Ok(fraud_txgen_core::TransactionSample::new(
                1.0,
                fraud_txgen_core::TransactionType::Payment,
                (1.0, 0.0),
                (0.0, 0.0),
                0.0,
                false,
            )?)
        }
    }

    let (sink, log) = RecordingSink::new();
    let mut orch = Orchestrator::new(
        test_config(1.0),
        &IdentityPool::synthetic(3),
        TransactionSynthesizer::new(Box::new(AlwaysLegit)),
        Box::new(sink),
        RngManager::new(13),
    )
    .unwrap();

    let err = orch.step().await.unwrap_err();
    assert!(matches!(err, TickError::Synthesis(_)));
    assert!(!err.is_transport());

    assert_eq!(orch.tick().await, Duration::from_secs(1));
    assert!(log.lock().unwrap().events.is_empty());
}

#[tokio::test]
async fn test_rejection_keeps_cadence() {
    let (sink, _) =
        RecordingSink::scripted(vec![Ok(Acknowledgement::rejected("Kafka push failed"))]);
    let mut orch = orchestrator_with(test_config(0.05), 3, 14, sink);

    assert_eq!(orch.tick().await, Duration::from_millis(200));
    assert_eq!(orch.stats().rejected, 1);
    assert_eq!(orch.stats().failures(), 0);
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_shutdown_closes_once_and_stops() {
    let (sink, log) = RecordingSink::new();
    let mut orch = orchestrator_with(test_config(0.05), 3, 15, sink);

    orch.step().await.unwrap();
    orch.shutdown();
    orch.shutdown();

    assert_eq!(orch.status(), SchedulerState::Stopped);
    assert_eq!(log.lock().unwrap().close_calls, 1);
    assert_eq!(orch.step().await.unwrap_err(), TickError::Stopped);
}

// ============================================================================
// Bootstrap
// ============================================================================

#[test]
fn test_model_failure_exits_1_without_connecting() {
    let connected = Cell::new(false);
    let config = GeneratorConfig::default();

    let err = build_orchestrator(
        &config,
        |_| Err(ModelLoadError::Invalid("corrupt".into())),
        |_| {
            connected.set(true);
            let (sink, _) = RecordingSink::new();
            Ok(Box::new(sink) as Box<dyn IngestionSink>)
        },
    )
    .unwrap_err();

    assert!(matches!(err, StartupError::ModelLoad(_)));
    assert_eq!(err.exit_code(), 1);
    assert!(!connected.get());
}

#[test]
fn test_invalid_config_exits_2() {
    let config = GeneratorConfig {
        fraud_probability: -0.1,
        ..GeneratorConfig::default()
    };

    let err = build_orchestrator(
        &config,
        |_| Ok(sample_model()),
        |_| {
            let (sink, _) = RecordingSink::new();
            Ok(Box::new(sink) as Box<dyn IngestionSink>)
        },
    )
    .unwrap_err();

    assert!(matches!(err, StartupError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_bootstrap_builds_synthetic_population() {
    let config = GeneratorConfig {
        population_cap: 7,
        seed: Some(42),
        ..GeneratorConfig::default()
    };

    let orch = build_orchestrator(
        &config,
        |_| Ok(sample_model()),
        |addr| {
            assert_eq!(addr, "localhost:50051");
            let (sink, _) = RecordingSink::new();
            Ok(Box::new(sink) as Box<dyn IngestionSink>)
        },
    )
    .unwrap();

    assert_eq!(orch.state().num_agents(), 7);
}
