//! Domain models for the transaction generator

pub mod agent;
pub mod state;
pub mod transaction;

// Re-exports
pub use agent::{CustomerAgent, NetworkScenario};
pub use state::SimulationState;
pub use transaction::{TransactionError, TransactionEvent, TransactionSample, TransactionType};
