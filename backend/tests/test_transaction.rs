//! Tests for TransactionSample and TransactionEvent

use fraud_txgen_core::{
    CustomerId, TransactionError, TransactionEvent, TransactionSample, TransactionType,
};
use std::collections::HashSet;
use std::net::Ipv4Addr;

fn sample(amount: f64, is_fraud: bool) -> TransactionSample {
    TransactionSample::new(
        amount,
        TransactionType::Transfer,
        (1_000.0, 1_000.0 - amount),
        (0.0, amount),
        0.0,
        is_fraud,
    )
    .unwrap()
}

#[test]
fn test_sample_accessors() {
    let s = TransactionSample::new(
        1_500.0,
        TransactionType::CashOut,
        (1_000.0, -500.0),
        (20.0, 1_520.0),
        1.0,
        true,
    )
    .unwrap();

    assert_eq!(s.amount(), 1_500.0);
    assert_eq!(s.transaction_type(), TransactionType::CashOut);
    assert_eq!(s.old_balance_orig(), 1_000.0);
    assert_eq!(s.new_balance_orig(), -500.0);
    assert_eq!(s.old_balance_dest(), 20.0);
    assert_eq!(s.new_balance_dest(), 1_520.0);
    assert_eq!(s.is_unauthorized_overdraft(), 1.0);
    assert!(s.is_fraud());
}

#[test]
fn test_zero_amount_is_valid() {
    assert_eq!(sample(0.0, false).amount(), 0.0);
}

#[test]
fn test_invalid_amounts_rejected() {
    for amount in [-0.01, f64::NAN, f64::INFINITY] {
        let result = TransactionSample::new(
            amount,
            TransactionType::Payment,
            (0.0, 0.0),
            (0.0, 0.0),
            0.0,
            false,
        );
        assert!(matches!(result, Err(TransactionError::InvalidAmount(_))));
    }
}

#[test]
fn test_type_wire_names() {
    let names: Vec<_> = TransactionType::ALL.iter().map(|t| t.as_str()).collect();
    assert_eq!(names, ["PAYMENT", "TRANSFER", "CASH_OUT", "CASH_IN", "DEBIT"]);
}

#[test]
fn test_type_parse_case_insensitive() {
    assert_eq!("cash_out".parse::<TransactionType>(), Ok(TransactionType::CashOut));
    assert_eq!(" DEBIT ".parse::<TransactionType>(), Ok(TransactionType::Debit));
    assert_eq!(
        "WIRE".parse::<TransactionType>(),
        Err(TransactionError::UnknownType("WIRE".to_string()))
    );
}

#[test]
fn test_event_carries_sample_and_context() {
    let ip = Ipv4Addr::new(81, 2, 69, 160);
    let event = TransactionEvent::new(CustomerId(42), 1_700_000_000_000, sample(250.0, true), ip);

    assert_eq!(event.user_id(), CustomerId(42));
    assert_eq!(event.timestamp_ms(), 1_700_000_000_000);
    assert_eq!(event.ip_address(), ip);
    assert_eq!(event.amount(), 250.0);
    assert!(event.is_fraud());
    assert!(uuid::Uuid::parse_str(event.transaction_id()).is_ok());
}

#[test]
fn test_event_ids_are_unique() {
    let ids: HashSet<String> = (0..10_000)
        .map(|_| {
            TransactionEvent::new(CustomerId(1), 0, sample(1.0, false), Ipv4Addr::LOCALHOST)
                .transaction_id()
                .to_string()
        })
        .collect();

    assert_eq!(ids.len(), 10_000);
}
