//! Generator configuration
//!
//! All settings have defaults matching the reference deployment. A TOML file
//! may override them, and the CLI layers environment variables and flags on
//! top (defaults < file < env/CLI).
//!
//! ```toml
//! server_addr = "ingest:50051"
//! fraud_probability = 0.1
//! tick_interval_ms = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Complete generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Ingestion service address (`host:port`)
    pub server_addr: String,

    /// Model artifact path
    pub model_path: PathBuf,

    /// Optional CSV of customer identifiers
    pub user_ids_path: Option<PathBuf>,

    /// Maximum number of agents
    pub population_cap: usize,

    /// Probability that a tick produces a fraudulent event
    pub fraud_probability: f64,

    /// Delay between successful ticks
    pub tick_interval_ms: u64,

    /// Wait before the generator starts (lets the pipeline come up)
    pub startup_delay_secs: u64,

    /// Cooldown after a transport failure
    pub transport_cooldown_ms: u64,

    /// Cooldown after any other failure
    pub error_cooldown_ms: u64,

    /// RNG seed for reproducible runs (entropy when absent)
    pub seed: Option<u64>,

    /// Stop after this many ticks (run until signalled when absent)
    pub max_ticks: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            server_addr: "localhost:50051".to_string(),
            model_path: PathBuf::from("models/transaction_profile.json"),
            user_ids_path: None,
            population_cap: crate::identity::DEFAULT_POPULATION_CAP,
            fraud_probability: 0.05,
            tick_interval_ms: 200,
            startup_delay_secs: 10,
            transport_cooldown_ms: 2_000,
            error_cooldown_ms: 1_000,
            seed: None,
            max_ticks: None,
        }
    }
}

impl GeneratorConfig {
    /// Load a TOML file; keys it omits keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject settings the generator cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("server_addr must not be empty".to_string()));
        }
        if self.population_cap == 0 {
            return Err(ConfigError::Invalid("population_cap must be positive".to_string()));
        }
        if !self.fraud_probability.is_finite() || !(0.0..=1.0).contains(&self.fraud_probability) {
            return Err(ConfigError::Invalid(format!(
                "fraud_probability must be in [0, 1], got {}",
                self.fraud_probability
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }

    pub fn transport_cooldown(&self) -> Duration {
        Duration::from_millis(self.transport_cooldown_ms)
    }

    pub fn error_cooldown(&self) -> Duration {
        Duration::from_millis(self.error_cooldown_ms)
    }
}
