//! Orchestrator - scheduler and run loop
//!
//! See `engine.rs` for the per-tick pipeline and `run_loop.rs` for pacing
//! and shutdown.

pub mod engine;
pub mod run_loop;

// Re-export main types for convenience
pub use engine::{
    Orchestrator, OrchestratorConfig, RunStats, SchedulerState, SimulationError, TickError,
    TickResult,
};
pub use run_loop::{run_loop, spawn_signal_listener};
