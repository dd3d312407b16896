//! Feature distributions for the profile model
//!
//! Each numeric feature of a class profile (amount, origin balance,
//! destination balance) is described by one of these distributions in the
//! model artifact.
//!
//! ```json
//! { "kind": "log_normal", "mean": 5.2, "std_dev": 1.4 }
//! ```

use crate::rng::RngManager;
use rand::Rng;
use rand_distr::{Distribution, Exp, LogNormal, Normal};
use serde::{Deserialize, Serialize};

/// Distribution of one numeric feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureDistribution {
    /// Uniform distribution between min and max (inclusive)
    Uniform { min: f64, max: f64 },

    /// Normal distribution with mean and standard deviation
    Normal { mean: f64, std_dev: f64 },

    /// Log-normal distribution (for heavy-tailed amounts and balances)
    ///
    /// `mean` and `std_dev` are parameters of the underlying normal.
    LogNormal { mean: f64, std_dev: f64 },

    /// Exponential distribution with rate parameter
    Exponential { rate: f64 },

    /// Always the same value
    Constant { value: f64 },
}

impl FeatureDistribution {
    /// Check parameters, returning a description of the first problem
    pub fn validate(&self) -> Result<(), String> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(format!("{} must be finite, got {}", name, v))
            }
        };

        match *self {
            FeatureDistribution::Uniform { min, max } => {
                finite("min", min)?;
                finite("max", max)?;
                if min > max {
                    return Err(format!("uniform min {} exceeds max {}", min, max));
                }
                if !(max - min).is_finite() {
                    return Err(format!("uniform range {}..={} is too wide", min, max));
                }
            }
            FeatureDistribution::Normal { mean, std_dev }
            | FeatureDistribution::LogNormal { mean, std_dev } => {
                finite("mean", mean)?;
                finite("std_dev", std_dev)?;
                if std_dev < 0.0 {
                    return Err(format!("std_dev must be non-negative, got {}", std_dev));
                }
            }
            FeatureDistribution::Exponential { rate } => {
                finite("rate", rate)?;
                if rate <= 0.0 {
                    return Err(format!("exponential rate must be positive, got {}", rate));
                }
            }
            FeatureDistribution::Constant { value } => finite("value", value)?,
        }

        Ok(())
    }

    /// Draw one value
    ///
    /// Parameters are checked by [`validate`](Self::validate) when the model
    /// loads; a distribution that still fails to build yields its location
    /// parameter.
    pub fn sample(&self, rng: &mut RngManager) -> f64 {
        match *self {
            FeatureDistribution::Uniform { min, max } => {
                if min == max {
                    min
                } else {
                    rng.gen_range(min..=max)
                }
            }
            FeatureDistribution::Normal { mean, std_dev } => match Normal::new(mean, std_dev) {
                Ok(d) => d.sample(rng),
                Err(_) => mean,
            },
            FeatureDistribution::LogNormal { mean, std_dev } => {
                match LogNormal::new(mean, std_dev) {
                    Ok(d) => d.sample(rng),
                    Err(_) => mean.exp(),
                }
            }
            FeatureDistribution::Exponential { rate } => match Exp::new(rate) {
                Ok(d) => d.sample(rng),
                Err(_) => 0.0,
            },
            FeatureDistribution::Constant { value } => value,
        }
    }

    /// Draw one value, floored at zero and rounded to cents
    pub fn sample_amount(&self, rng: &mut RngManager) -> f64 {
        round_cents(self.sample(rng).max(0.0))
    }
}

/// Round to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
