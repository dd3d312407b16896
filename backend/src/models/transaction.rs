//! Transaction models
//!
//! - [`TransactionSample`]: one row of features drawn from the generative
//!   model (amount, type, balances, overdraft indicator, fraud label)
//! - [`TransactionEvent`]: the unit sent downstream; a sample plus identity,
//!   time and network context
//!
//! Both are immutable once built. Balances may be zero or negative, and the
//! overdraft indicator stays an `f64` in the model's own scale.

use crate::identity::CustomerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when building transaction values
#[derive(Debug, Error, PartialEq)]
pub enum TransactionError {
    #[error("Unknown transaction type: {0}")]
    UnknownType(String),

    #[error("Transaction amount must be a non-negative finite number, got {0}")]
    InvalidAmount(f64),
}

/// Transaction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Payment,
    Transfer,
    CashOut,
    CashIn,
    Debit,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Payment,
        TransactionType::Transfer,
        TransactionType::CashOut,
        TransactionType::CashIn,
        TransactionType::Debit,
    ];

    /// Wire name, e.g. `CASH_OUT`
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Payment => "PAYMENT",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::CashOut => "CASH_OUT",
            TransactionType::CashIn => "CASH_IN",
            TransactionType::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TransactionError::UnknownType(s.to_string()))
    }
}

/// One synthesized row of transaction features
///
/// # Example
/// ```
/// use fraud_txgen_core::{TransactionSample, TransactionType};
///
/// let sample = TransactionSample::new(
///     250.0,
///     TransactionType::Transfer,
///     (1_000.0, 750.0),
///     (0.0, 250.0),
///     0.0,
///     false,
/// ).unwrap();
/// assert_eq!(sample.amount(), 250.0);
/// assert!(!sample.is_fraud());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSample {
    amount: f64,
    transaction_type: TransactionType,
    old_balance_orig: f64,
    new_balance_orig: f64,
    old_balance_dest: f64,
    new_balance_dest: f64,
    is_unauthorized_overdraft: f64,
    is_fraud: bool,
}

impl TransactionSample {
    /// Build a sample
    ///
    /// `origin` and `destination` are `(old_balance, new_balance)` pairs.
    pub fn new(
        amount: f64,
        transaction_type: TransactionType,
        origin: (f64, f64),
        destination: (f64, f64),
        is_unauthorized_overdraft: f64,
        is_fraud: bool,
    ) -> Result<Self, TransactionError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(TransactionError::InvalidAmount(amount));
        }

        Ok(Self {
            amount,
            transaction_type,
            old_balance_orig: origin.0,
            new_balance_orig: origin.1,
            old_balance_dest: destination.0,
            new_balance_dest: destination.1,
            is_unauthorized_overdraft,
            is_fraud,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn old_balance_orig(&self) -> f64 {
        self.old_balance_orig
    }

    pub fn new_balance_orig(&self) -> f64 {
        self.new_balance_orig
    }

    pub fn old_balance_dest(&self) -> f64 {
        self.old_balance_dest
    }

    pub fn new_balance_dest(&self) -> f64 {
        self.new_balance_dest
    }

    pub fn is_unauthorized_overdraft(&self) -> f64 {
        self.is_unauthorized_overdraft
    }

    pub fn is_fraud(&self) -> bool {
        self.is_fraud
    }
}

/// Event delivered to the ingestion service
///
/// `transaction_id` is a fresh UUID v4 per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    transaction_id: String,
    user_id: CustomerId,
    /// Milliseconds since the Unix epoch, captured at send time
    timestamp_ms: i64,
    sample: TransactionSample,
    ip_address: Ipv4Addr,
}

impl TransactionEvent {
    /// Assemble an event with a freshly generated transaction id
    pub fn new(
        user_id: CustomerId,
        timestamp_ms: i64,
        sample: TransactionSample,
        ip_address: Ipv4Addr,
    ) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), user_id, timestamp_ms, sample, ip_address)
    }

    /// Assemble an event with a caller-supplied transaction id
    pub fn with_id(
        transaction_id: String,
        user_id: CustomerId,
        timestamp_ms: i64,
        sample: TransactionSample,
        ip_address: Ipv4Addr,
    ) -> Self {
        Self {
            transaction_id,
            user_id,
            timestamp_ms,
            sample,
            ip_address,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn user_id(&self) -> CustomerId {
        self.user_id
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn sample(&self) -> &TransactionSample {
        &self.sample
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }

    pub fn amount(&self) -> f64 {
        self.sample.amount
    }

    pub fn is_fraud(&self) -> bool {
        self.sample.is_fraud
    }
}
