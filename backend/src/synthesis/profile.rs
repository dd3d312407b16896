//! Per-class parametric transaction model
//!
//! The model artifact is a JSON document with a fraud prior and one profile
//! per class:
//!
//! ```json
//! {
//!   "fraud_rate": 0.0013,
//!   "legitimate": { "type_weights": [...], "amount": {...}, ... },
//!   "fraudulent": { "type_weights": [...], "amount": {...}, ... }
//! }
//! ```
//!
//! Conditioned sampling picks the requested class profile; unconditioned
//! sampling first draws the class from `fraud_rate`.
//!
//! # Balance Semantics
//!
//! - `new_balance_orig = old_balance_orig - amount` (may go negative)
//! - `is_unauthorized_overdraft = 1.0` when `amount > old_balance_orig`
//! - `new_balance_dest = old_balance_dest + amount`, except for merchant
//!   types whose destination balances are untracked and reported as 0

use crate::models::{TransactionSample, TransactionType};
use crate::rng::RngManager;
use crate::synthesis::distributions::{round_cents, FeatureDistribution};
use crate::synthesis::{SynthesisError, TransactionModel};
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors raised while loading a model artifact
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Cannot read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse model artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// Weight of one transaction type within a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeWeight {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub weight: f64,
}

/// Feature profile of one class (legitimate or fraudulent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    /// Relative frequency of each transaction type
    pub type_weights: Vec<TypeWeight>,

    /// Transaction amount
    pub amount: FeatureDistribution,

    /// Origin account balance before the transaction
    pub origin_balance: FeatureDistribution,

    /// Destination account balance before the transaction
    pub dest_balance: FeatureDistribution,

    /// Probability that the amount is the whole origin balance
    #[serde(default)]
    pub drain_probability: f64,

    /// Types whose destination balances are not tracked
    #[serde(default)]
    pub merchant_types: Vec<TransactionType>,
}

impl ClassProfile {
    fn validate(&self, class: &str) -> Result<(), ModelLoadError> {
        let invalid = |msg: String| ModelLoadError::Invalid(format!("{}: {}", class, msg));

        if self.type_weights.is_empty() {
            return Err(invalid("type_weights is empty".to_string()));
        }
        if self
            .type_weights
            .iter()
            .any(|tw| !tw.weight.is_finite() || tw.weight < 0.0)
        {
            return Err(invalid("type weights must be finite and non-negative".to_string()));
        }
        if self.type_weights.iter().all(|tw| tw.weight == 0.0) {
            return Err(invalid("type weights are all zero".to_string()));
        }
        let total: f64 = self.type_weights.iter().map(|tw| tw.weight).sum();
        if !total.is_finite() {
            return Err(invalid(format!("type weights sum to {}", total)));
        }
        if !(0.0..=1.0).contains(&self.drain_probability) {
            return Err(invalid(format!(
                "drain_probability must be in [0, 1], got {}",
                self.drain_probability
            )));
        }

        self.amount
            .validate()
            .map_err(|e| invalid(format!("amount: {}", e)))?;
        self.origin_balance
            .validate()
            .map_err(|e| invalid(format!("origin_balance: {}", e)))?;
        self.dest_balance
            .validate()
            .map_err(|e| invalid(format!("dest_balance: {}", e)))?;

        Ok(())
    }
}

/// On-disk model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Fraud prior used for unconditioned sampling
    pub fraud_rate: f64,
    pub legitimate: ClassProfile,
    pub fraudulent: ClassProfile,
}

impl ModelArtifact {
    /// Check every parameter of the artifact
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if !(0.0..=1.0).contains(&self.fraud_rate) {
            return Err(ModelLoadError::Invalid(format!(
                "fraud_rate must be in [0, 1], got {}",
                self.fraud_rate
            )));
        }
        self.legitimate.validate("legitimate")?;
        self.fraudulent.validate("fraudulent")?;
        Ok(())
    }
}

/// Class profile with its type sampler built
#[derive(Debug, Clone)]
struct CompiledClass {
    profile: ClassProfile,
    types: Vec<TransactionType>,
    type_index: WeightedIndex<f64>,
}

impl CompiledClass {
    fn compile(profile: ClassProfile) -> Result<Self, ModelLoadError> {
        let types = profile
            .type_weights
            .iter()
            .map(|tw| tw.transaction_type)
            .collect();
        let type_index = WeightedIndex::new(profile.type_weights.iter().map(|tw| tw.weight))
            .map_err(|e| ModelLoadError::Invalid(format!("type weights: {}", e)))?;

        Ok(Self {
            profile,
            types,
            type_index,
        })
    }

    fn sample(&self, is_fraud: bool, rng: &mut RngManager) -> Result<TransactionSample, SynthesisError> {
        let transaction_type = self.types[self.type_index.sample(rng)];

        let old_balance_orig = self.profile.origin_balance.sample_amount(rng);
        let amount = if old_balance_orig > 0.0 && rng.chance(self.profile.drain_probability) {
            old_balance_orig
        } else {
            self.profile.amount.sample_amount(rng)
        };

        let new_balance_orig = round_cents(old_balance_orig - amount);
        let is_unauthorized_overdraft = if amount > old_balance_orig { 1.0 } else { 0.0 };

        let (old_balance_dest, new_balance_dest) =
            if self.profile.merchant_types.contains(&transaction_type) {
                (0.0, 0.0)
            } else {
                let old = self.profile.dest_balance.sample_amount(rng);
                (old, round_cents(old + amount))
            };

        Ok(TransactionSample::new(
            amount,
            transaction_type,
            (old_balance_orig, new_balance_orig),
            (old_balance_dest, new_balance_dest),
            is_unauthorized_overdraft,
            is_fraud,
        )?)
    }
}

/// Transaction model backed by a [`ModelArtifact`]
///
/// # Example
/// ```
/// use fraud_txgen_core::synthesis::{ProfileModel, TransactionModel};
/// use fraud_txgen_core::RngManager;
///
/// let json = r#"{
///   "fraud_rate": 0.01,
///   "legitimate": {
///     "type_weights": [{"type": "PAYMENT", "weight": 1.0}],
///     "amount": {"kind": "uniform", "min": 1.0, "max": 100.0},
///     "origin_balance": {"kind": "constant", "value": 500.0},
///     "dest_balance": {"kind": "constant", "value": 0.0},
///     "merchant_types": ["PAYMENT"]
///   },
///   "fraudulent": {
///     "type_weights": [{"type": "TRANSFER", "weight": 1.0}],
///     "amount": {"kind": "constant", "value": 900.0},
///     "origin_balance": {"kind": "constant", "value": 900.0},
///     "dest_balance": {"kind": "constant", "value": 0.0},
///     "drain_probability": 1.0
///   }
/// }"#;
///
/// let mut model = ProfileModel::from_json(json).unwrap();
/// let mut rng = RngManager::new(1);
/// let sample = model.sample(Some(true), &mut rng).unwrap();
/// assert!(sample.is_fraud());
/// assert_eq!(sample.new_balance_orig(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ProfileModel {
    fraud_rate: f64,
    legitimate: CompiledClass,
    fraudulent: CompiledClass,
}

impl ProfileModel {
    /// Build a model from a validated artifact
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelLoadError> {
        artifact.validate()?;
        Ok(Self {
            fraud_rate: artifact.fraud_rate,
            legitimate: CompiledClass::compile(artifact.legitimate)?,
            fraudulent: CompiledClass::compile(artifact.fraudulent)?,
        })
    }

    /// Parse and validate an artifact from JSON text
    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let artifact: ModelArtifact = serde_json::from_str(json).map_err(|source| ModelLoadError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::from_artifact(artifact)
    }

    /// Load an artifact from disk
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact =
            serde_json::from_str(&contents).map_err(|source| ModelLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let model = Self::from_artifact(artifact)?;

        info!(
            path = %path.display(),
            fraud_rate = model.fraud_rate,
            "Loaded transaction model"
        );
        Ok(model)
    }

    pub fn fraud_rate(&self) -> f64 {
        self.fraud_rate
    }
}

impl TransactionModel for ProfileModel {
    fn sample(
        &mut self,
        condition: Option<bool>,
        rng: &mut RngManager,
    ) -> Result<TransactionSample, SynthesisError> {
        let is_fraud = match condition {
            Some(label) => label,
            None => rng.chance(self.fraud_rate),
        };

        if is_fraud {
            self.fraudulent.sample(true, rng)
        } else {
            self.legitimate.sample(false, rng)
        }
    }

    fn name(&self) -> &str {
        "profile"
    }
}
