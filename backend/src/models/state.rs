//! Simulation State
//!
//! Holds the agent population. Built once from the identity pool at startup
//! and read-only afterwards: agents are never added or removed while the
//! generator runs.
//!
//! # Critical Invariants
//!
//! 1. **Identifier Uniqueness**: Each customer id maps to exactly one agent
//! 2. **Index Validity**: Every id in the selection index has an agent

use crate::identity::{CustomerId, IdentityPool};
use crate::models::agent::CustomerAgent;
use crate::rng::RngManager;
use std::collections::HashMap;

/// Agent population keyed by customer id
///
/// # Example
///
/// ```rust
/// use fraud_txgen_core::{identity::IdentityPool, RngManager, SimulationState};
///
/// let mut rng = RngManager::new(1);
/// let state = SimulationState::from_pool(&IdentityPool::synthetic(5), &mut rng);
/// assert_eq!(state.num_agents(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// All agents, indexed by id
    agents: HashMap<CustomerId, CustomerAgent>,

    /// Ids in pool order, for uniform selection
    agent_ids: Vec<CustomerId>,
}

impl SimulationState {
    /// Create state from prebuilt agents (later duplicates are ignored)
    pub fn new(agents: Vec<CustomerAgent>) -> Self {
        let mut map = HashMap::with_capacity(agents.len());
        let mut agent_ids = Vec::with_capacity(agents.len());

        for agent in agents {
            let id = agent.id();
            if !map.contains_key(&id) {
                agent_ids.push(id);
                map.insert(id, agent);
            }
        }

        Self {
            agents: map,
            agent_ids,
        }
    }

    /// One agent per pool identifier, each with a fresh home address
    pub fn from_pool(pool: &IdentityPool, rng: &mut RngManager) -> Self {
        let agents = pool
            .ids()
            .iter()
            .map(|&id| CustomerAgent::new(id, rng))
            .collect();
        Self::new(agents)
    }

    /// Get reference to an agent by ID
    pub fn get_agent(&self, id: CustomerId) -> Option<&CustomerAgent> {
        self.agents.get(&id)
    }

    /// Pick an agent uniformly at random
    pub fn choose_agent(&self, rng: &mut RngManager) -> Option<&CustomerAgent> {
        if self.agent_ids.is_empty() {
            return None;
        }
        let idx = rng.range(0, self.agent_ids.len());
        self.agents.get(&self.agent_ids[idx])
    }

    /// All agent ids in pool order
    pub fn agent_ids(&self) -> &[CustomerId] {
        &self.agent_ids
    }

    pub fn num_agents(&self) -> usize {
        self.agent_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agent_ids.is_empty()
    }
}
