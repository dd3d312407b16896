//! Random number generation
//!
//! Wraps a ChaCha8 stream cipher RNG so a run can be replayed from a seed.
//! CRITICAL: All randomness in the generator MUST go through this module.

mod manager;

pub use manager::RngManager;
