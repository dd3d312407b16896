//! Transaction synthesis
//!
//! The generative model is an injected collaborator behind the
//! [`TransactionModel`] trait: given an optional fraud label it returns one
//! row of transaction features. [`TransactionSynthesizer`] wraps a model and
//! guarantees exact conditioning: when a label is requested, the sample
//! carries that label or the call fails.
//!
//! The shipped model is [`ProfileModel`], loaded from a JSON artifact at
//! startup.

pub mod distributions;
pub mod profile;

pub use distributions::FeatureDistribution;
pub use profile::{ClassProfile, ModelArtifact, ModelLoadError, ProfileModel, TypeWeight};

use crate::models::{TransactionError, TransactionSample};
use crate::rng::RngManager;
use thiserror::Error;

/// Errors that can occur while drawing a sample
#[derive(Debug, Error, PartialEq)]
pub enum SynthesisError {
    #[error("Model returned is_fraud={produced} for a sample conditioned on is_fraud={requested}")]
    ConditionMismatch { requested: bool, produced: bool },

    #[error("Model failure: {0}")]
    Model(String),

    #[error(transparent)]
    Sample(#[from] TransactionError),
}

/// Generative model producing transaction feature rows
pub trait TransactionModel: Send {
    /// Draw one sample, constrained to `condition` when given
    fn sample(
        &mut self,
        condition: Option<bool>,
        rng: &mut RngManager,
    ) -> Result<TransactionSample, SynthesisError>;

    /// Short name for logs
    fn name(&self) -> &str {
        "model"
    }
}

/// Conditioned sampling over an injected model
pub struct TransactionSynthesizer {
    model: Box<dyn TransactionModel>,
    samples_drawn: u64,
}

impl TransactionSynthesizer {
    pub fn new(model: Box<dyn TransactionModel>) -> Self {
        Self {
            model,
            samples_drawn: 0,
        }
    }

    /// Draw one sample
    ///
    /// With `Some(label)` the returned sample's fraud field equals `label`.
    /// With `None` the model's own prior decides.
    pub fn sample(
        &mut self,
        condition: Option<bool>,
        rng: &mut RngManager,
    ) -> Result<TransactionSample, SynthesisError> {
        let sample = self.model.sample(condition, rng)?;

        if let Some(requested) = condition {
            if sample.is_fraud() != requested {
                return Err(SynthesisError::ConditionMismatch {
                    requested,
                    produced: sample.is_fraud(),
                });
            }
        }

        self.samples_drawn += 1;
        Ok(sample)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Number of samples handed out successfully
    pub fn samples_drawn(&self) -> u64 {
        self.samples_drawn
    }
}

impl std::fmt::Debug for TransactionSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSynthesizer")
            .field("model", &self.model.name())
            .field("samples_drawn", &self.samples_drawn)
            .finish()
    }
}
