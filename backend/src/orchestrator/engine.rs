//! Orchestrator Engine
//!
//! Per-tick scheduling of the generator:
//!
//! ```text
//! For each tick:
//! 1. Choose one agent uniformly at random
//! 2. Draw is_fraud ~ Bernoulli(fraud_probability)
//! 3. Synthesize a sample conditioned on is_fraud
//! 4. Derive the network context (scenario + address) from the agent
//! 5. Assemble the event (fresh UUID, send-time timestamp) and send it once
//! ```
//!
//! [`Orchestrator::step`] performs one tick and reports what happened.
//! [`Orchestrator::tick`] wraps it for the run loop: it logs the outcome,
//! updates [`RunStats`] and returns how long to wait before the next tick.
//! Failures never escape `tick`; they only change the wait.
//!
//! # Lifecycle
//!
//! `Ready` → `Stopped`, only through [`Orchestrator::shutdown`]. There is no
//! way back: a stopped orchestrator refuses to step.

use crate::config::GeneratorConfig;
use crate::core::time::EventClock;
use crate::delivery::{Acknowledgement, DeliveryError, IngestionSink};
use crate::identity::{CustomerId, IdentityPool};
use crate::models::agent::NetworkScenario;
use crate::models::state::SimulationState;
use crate::models::TransactionEvent;
use crate::rng::RngManager;
use crate::synthesis::{SynthesisError, TransactionSynthesizer};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// Scheduling parameters
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Probability that a tick produces a fraudulent event
    pub fraud_probability: f64,

    /// Wait after a delivered (or rejected) event
    pub tick_interval: Duration,

    /// Wait after a transport failure
    pub transport_cooldown: Duration,

    /// Wait after any other failure
    pub error_cooldown: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

impl From<&GeneratorConfig> for OrchestratorConfig {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            fraud_probability: config.fraud_probability,
            tick_interval: config.tick_interval(),
            transport_cooldown: config.transport_cooldown(),
            error_cooldown: config.error_cooldown(),
        }
    }
}

// ============================================================================
// Results and Errors
// ============================================================================

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Model loaded, channel open, agents built
    Ready,
    /// Channel released; no further ticks
    Stopped,
}

/// Result of a single successful tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Tick number (0-based)
    pub tick: u64,

    pub transaction_id: String,

    pub user_id: CustomerId,

    pub is_fraud: bool,

    pub amount: f64,

    /// Scenario the address was derived from
    pub scenario: NetworkScenario,

    pub ip_address: Ipv4Addr,

    /// Service acknowledgement (may be a rejection)
    pub ack: Acknowledgement,
}

/// Running totals over the life of the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Ticks attempted
    pub ticks: u64,

    /// Events acknowledged with success
    pub delivered: u64,

    /// Events acknowledged with `success = false`
    pub rejected: u64,

    /// Ticks that failed in the transport
    pub transport_failures: u64,

    /// Ticks that failed for any other reason
    pub other_failures: u64,

    /// Fraudulent events that reached the service
    pub fraud_events: u64,
}

impl RunStats {
    pub fn failures(&self) -> u64 {
        self.transport_failures + self.other_failures
    }
}

/// Errors from a single tick
#[derive(Debug, Error, PartialEq)]
pub enum TickError {
    #[error("Orchestrator is stopped")]
    Stopped,

    #[error("No agents to choose from")]
    EmptyPopulation,

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl TickError {
    /// Whether the transport cooldown applies
    pub fn is_transport(&self) -> bool {
        matches!(self, TickError::Delivery(e) if e.is_transport())
    }
}

/// Errors building an orchestrator
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Identity pool is empty, no agents to simulate")]
    EmptyPopulation,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Owns the agent population, the synthesizer and the delivery sink
///
/// # Determinism
///
/// Every draw goes through `rng`. With a seeded RNG the sequence of agents,
/// labels, scenarios and samples is reproducible; only ids and timestamps
/// differ between runs.
pub struct Orchestrator {
    /// Agent population
    state: SimulationState,

    /// Conditioned sampler over the generative model
    synthesizer: TransactionSynthesizer,

    /// Delivery channel
    sink: Box<dyn IngestionSink>,

    rng: RngManager,

    /// Event timestamps
    clock: EventClock,

    config: OrchestratorConfig,

    status: SchedulerState,

    stats: RunStats,
}

impl Orchestrator {
    /// Build the population from `pool` and take ownership of the collaborators
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to tick
    /// * `Err(SimulationError)` - Empty pool or invalid fraud probability
    pub fn new(
        config: OrchestratorConfig,
        pool: &IdentityPool,
        synthesizer: TransactionSynthesizer,
        sink: Box<dyn IngestionSink>,
        mut rng: RngManager,
    ) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        if pool.is_empty() {
            return Err(SimulationError::EmptyPopulation);
        }

        let state = SimulationState::from_pool(pool, &mut rng);
        info!(
            agents = state.num_agents(),
            model = synthesizer.model_name(),
            fraud_probability = config.fraud_probability,
            "Orchestrator ready"
        );

        Ok(Self {
            state,
            synthesizer,
            sink,
            rng,
            clock: EventClock::system(),
            config,
            status: SchedulerState::Ready,
            stats: RunStats::default(),
        })
    }

    /// Replace the event clock
    pub fn with_clock(mut self, clock: EventClock) -> Self {
        self.clock = clock;
        self
    }

    fn validate_config(config: &OrchestratorConfig) -> Result<(), SimulationError> {
        let p = config.fraud_probability;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(SimulationError::InvalidConfig(format!(
                "fraud_probability must be in [0, 1], got {}",
                p
            )));
        }
        Ok(())
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn status(&self) -> SchedulerState {
        self.status
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Execute one tick: select, decide, synthesize, derive, send
    ///
    /// Exactly one send attempt per call; nothing is retried or buffered.
    pub async fn step(&mut self) -> Result<TickResult, TickError> {
        if self.status == SchedulerState::Stopped {
            return Err(TickError::Stopped);
        }

        let tick = self.stats.ticks;
        self.stats.ticks += 1;

        // STEP 1: AGENT
        let agent = self
            .state
            .choose_agent(&mut self.rng)
            .ok_or(TickError::EmptyPopulation)?;

        // STEP 2: FRAUD DECISION
        let is_fraud = self.rng.chance(self.config.fraud_probability);

        // STEP 3: SAMPLE
        let sample = self.synthesizer.sample(Some(is_fraud), &mut self.rng)?;

        // STEP 4: NETWORK CONTEXT
        let (scenario, ip_address) = agent.context(is_fraud, &mut self.rng);
        let user_id = agent.id();

        // STEP 5: DISPATCH
        let event = TransactionEvent::new(user_id, self.clock.stamp(), sample, ip_address);
        debug!(
            tick,
            transaction_id = event.transaction_id(),
            user_id = %user_id,
            is_fraud,
            scenario = %scenario,
            ip = %ip_address,
            "Dispatching event"
        );
        let ack = self.sink.send(&event).await?;

        Ok(TickResult {
            tick,
            transaction_id: event.transaction_id().to_string(),
            user_id,
            is_fraud,
            amount: event.amount(),
            scenario,
            ip_address,
            ack,
        })
    }

    /// Run one tick, log its outcome and return the wait before the next
    ///
    /// * delivered or rejected → `tick_interval`
    /// * transport failure → `transport_cooldown`
    /// * any other failure → `error_cooldown`
    pub async fn tick(&mut self) -> Duration {
        match self.step().await {
            Ok(result) => {
                if result.ack.success {
                    self.stats.delivered += 1;
                    if result.is_fraud {
                        self.stats.fraud_events += 1;
                    }
                    info!(
                        "Sent: User {} | Amt {:.2} | {}",
                        result.user_id, result.amount, result.ack
                    );
                } else {
                    self.stats.rejected += 1;
                    warn!(
                        "Rejected: User {} | Amt {:.2} | {}",
                        result.user_id, result.amount, result.ack
                    );
                }
                self.config.tick_interval
            }
            Err(TickError::Stopped) => {
                warn!("Tick requested after shutdown");
                self.config.tick_interval
            }
            Err(e) if e.is_transport() => {
                self.stats.transport_failures += 1;
                error!("gRPC Error: {}", e);
                self.config.transport_cooldown
            }
            Err(e) => {
                self.stats.other_failures += 1;
                error!("Generator Error: {}", e);
                self.config.error_cooldown
            }
        }
    }

    /// Release the delivery channel and stop
    ///
    /// Idempotent: the channel is released on the first call only.
    pub fn shutdown(&mut self) {
        if self.status == SchedulerState::Stopped {
            return;
        }
        self.sink.close();
        self.status = SchedulerState::Stopped;
        info!("Delivery channel released");
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("agents", &self.state.num_agents())
            .field("synthesizer", &self.synthesizer)
            .field("status", &self.status)
            .field("stats", &self.stats)
            .finish()
    }
}
