//! Fraud Transaction Generator Core
//!
//! Synthetic bank-transaction traffic for exercising a fraud-detection
//! pipeline. A fixed population of customer agents emits one event per tick;
//! each event combines a model-synthesized feature row with a network
//! address derived from the agent's home network, and is delivered over gRPC.
//!
//! # Architecture
//!
//! - **identity**: Customer identifier pool (CSV or synthetic)
//! - **models**: Domain types (CustomerAgent, TransactionSample, State)
//! - **synthesis**: Generative model seam and conditioned sampling
//! - **orchestrator**: Per-tick scheduler and run loop
//! - **delivery**: Ingestion sink trait and gRPC client
//! - **config**: Generator settings
//! - **startup**: Bootstrap sequence and exit codes
//! - **rng**: Seedable random number generation
//!
//! # Critical Invariants
//!
//! 1. A fraudulent event's label always comes from the scheduler's decision
//! 2. Every event carries a fresh transaction id
//! 3. A per-tick failure never stops the generator

// Module declarations
pub mod config;
pub mod core;
pub mod delivery;
pub mod identity;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod startup;
pub mod synthesis;

// Re-exports for convenience
pub use config::{ConfigError, GeneratorConfig};
pub use core::time::EventClock;
pub use delivery::{Acknowledgement, DeliveryError, GrpcIngestionClient, IngestionSink};
pub use identity::{CustomerId, IdentityPool};
pub use models::{
    agent::{CustomerAgent, NetworkScenario},
    state::SimulationState,
    transaction::{TransactionError, TransactionEvent, TransactionSample, TransactionType},
};
pub use orchestrator::{
    run_loop, spawn_signal_listener, Orchestrator, OrchestratorConfig, RunStats, SimulationError,
    TickError, TickResult,
};
pub use rng::RngManager;
pub use startup::{build_orchestrator, StartupError};
pub use synthesis::{ProfileModel, SynthesisError, TransactionModel, TransactionSynthesizer};
