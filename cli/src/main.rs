//! txgen - synthetic fraud transaction generator
//!
//! Loads the transaction model, builds the customer population and streams
//! one event per tick to the ingestion service until SIGINT/SIGTERM.
//!
//! Settings resolve as defaults < `--config` TOML file < environment / flags.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fraud_txgen_core::synthesis::TransactionModel;
use fraud_txgen_core::{
    build_orchestrator, run_loop, spawn_signal_listener, GeneratorConfig, GrpcIngestionClient,
    IngestionSink, ProfileModel, RunStats, StartupError,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Synthetic fraud transaction generator
#[derive(Parser, Debug)]
#[command(name = "txgen")]
#[command(about = "Streams synthetic bank transactions to a fraud ingestion service")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long, env = "TXGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Ingestion service address (host:port)
    #[arg(long, env = "GRPC_SERVER_ADDRESS")]
    server_addr: Option<String>,

    /// Model artifact (JSON)
    #[arg(long, env = "TXGEN_MODEL_PATH")]
    model_path: Option<PathBuf>,

    /// CSV of customer identifiers
    #[arg(long, env = "TXGEN_USER_IDS_PATH")]
    user_ids_path: Option<PathBuf>,

    /// Maximum number of customers
    #[arg(long, env = "TXGEN_POPULATION_CAP")]
    population_cap: Option<usize>,

    /// Probability that an event is fraudulent
    #[arg(long, env = "TXGEN_FRAUD_PROBABILITY")]
    fraud_probability: Option<f64>,

    /// Delay between ticks in milliseconds
    #[arg(long, env = "TXGEN_TICK_INTERVAL_MS")]
    tick_interval_ms: Option<u64>,

    /// Seconds to wait before the first tick
    #[arg(long, env = "TXGEN_STARTUP_DELAY_SECS")]
    startup_delay_secs: Option<u64>,

    /// Cooldown after a transport failure, in milliseconds
    #[arg(long, env = "TXGEN_TRANSPORT_COOLDOWN_MS")]
    transport_cooldown_ms: Option<u64>,

    /// Cooldown after any other failure, in milliseconds
    #[arg(long, env = "TXGEN_ERROR_COOLDOWN_MS")]
    error_cooldown_ms: Option<u64>,

    /// RNG seed for reproducible runs
    #[arg(long, env = "TXGEN_SEED")]
    seed: Option<u64>,

    /// Stop after this many ticks
    #[arg(long, env = "TXGEN_MAX_TICKS")]
    max_ticks: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Resolve the effective configuration
    fn resolve(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)
                .map_err(StartupError::from)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GeneratorConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Overlay flags and environment values onto `config`
    fn apply(&self, config: &mut GeneratorConfig) {
        if let Some(addr) = &self.server_addr {
            config.server_addr = addr.clone();
        }
        if let Some(path) = &self.model_path {
            config.model_path = path.clone();
        }
        if let Some(path) = &self.user_ids_path {
            config.user_ids_path = Some(path.clone());
        }
        if let Some(cap) = self.population_cap {
            config.population_cap = cap;
        }
        if let Some(p) = self.fraud_probability {
            config.fraud_probability = p;
        }
        if let Some(ms) = self.tick_interval_ms {
            config.tick_interval_ms = ms;
        }
        if let Some(secs) = self.startup_delay_secs {
            config.startup_delay_secs = secs;
        }
        if let Some(ms) = self.transport_cooldown_ms {
            config.transport_cooldown_ms = ms;
        }
        if let Some(ms) = self.error_cooldown_ms {
            config.error_cooldown_ms = ms;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.max_ticks.is_some() {
            config.max_ticks = self.max_ticks;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report(&e)),
    }
}

/// Log a fatal error unless bootstrap already did, and pick the exit status
fn report(e: &anyhow::Error) -> u8 {
    let startup = e.downcast_ref::<StartupError>();
    if !startup.is_some_and(StartupError::already_logged) {
        error!("{:#}", e);
    }
    startup.map_or(2, StartupError::exit_code) as u8
}

async fn run(cli: &Cli) -> Result<RunStats> {
    let config = cli.resolve()?;

    let token = CancellationToken::new();
    let _signals = spawn_signal_listener(token.clone());

    let delay = config.startup_delay();
    if !delay.is_zero() {
        info!(seconds = delay.as_secs(), "Waiting for the pipeline to come up");
        tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(RunStats::default()),
            _ = tokio::time::sleep(delay) => {}
        }
    }

    let mut orchestrator = build_orchestrator(
        &config,
        |path| ProfileModel::load(path).map(|m| Box::new(m) as Box<dyn TransactionModel>),
        |addr| GrpcIngestionClient::connect(addr).map(|c| Box::new(c) as Box<dyn IngestionSink>),
    )?;

    Ok(run_loop(&mut orchestrator, token, config.max_ticks).await)
}
