//! Bootstrap sequence
//!
//! Order matters: the model is loaded before anything touches the network,
//! so a missing or corrupt artifact fails fast without opening a channel.
//!
//! ```text
//! validate config → load model → identity pool → open channel → orchestrator
//! ```
//!
//! Loading and connecting are injected so tests can run the sequence without
//! a model file or a server.

use crate::config::{ConfigError, GeneratorConfig};
use crate::delivery::{DeliveryError, IngestionSink};
use crate::identity::IdentityPool;
use crate::orchestrator::{Orchestrator, OrchestratorConfig, SimulationError};
use crate::rng::RngManager;
use crate::synthesis::profile::ModelLoadError;
use crate::synthesis::{TransactionModel, TransactionSynthesizer};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

/// Errors that prevent the generator from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load model: {0}")]
    ModelLoad(#[from] ModelLoadError),

    #[error("Failed to open ingestion channel: {0}")]
    Connect(#[from] DeliveryError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl StartupError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::ModelLoad(_) => 1,
            _ => 2,
        }
    }

    /// Whether the bootstrap already logged this failure
    pub fn already_logged(&self) -> bool {
        matches!(self, StartupError::ModelLoad(_))
    }
}

/// Build a ready orchestrator from `config`
///
/// `connect` is never called when the model fails to load.
pub fn build_orchestrator<L, C>(
    config: &GeneratorConfig,
    load_model: L,
    connect: C,
) -> Result<Orchestrator, StartupError>
where
    L: FnOnce(&Path) -> Result<Box<dyn TransactionModel>, ModelLoadError>,
    C: FnOnce(&str) -> Result<Box<dyn IngestionSink>, DeliveryError>,
{
    config.validate()?;

    let model = load_model(&config.model_path).map_err(|e| {
        error!(severity = "critical", path = %config.model_path.display(), "Failed to load model: {}", e);
        StartupError::ModelLoad(e)
    })?;
    let synthesizer = TransactionSynthesizer::new(model);

    let pool = IdentityPool::load(config.user_ids_path.as_deref(), config.population_cap);
    info!(customers = pool.len(), source = ?pool.source(), "Identity pool ready");

    let sink = connect(&config.server_addr)?;

    let rng = RngManager::from_optional_seed(config.seed);
    let orchestrator = Orchestrator::new(
        OrchestratorConfig::from(config),
        &pool,
        synthesizer,
        sink,
        rng,
    )?;

    Ok(orchestrator)
}
