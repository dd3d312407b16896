//! Customer agent model
//!
//! Represents a simulated bank customer with a stable network identity.
//! Each agent has:
//! - An immutable customer identifier
//! - A home address (the customer's usual connection origin), fixed at creation
//! - A home prefix (first two octets of the home address, the "/16 network")
//!
//! Per transaction the agent picks a network scenario and derives the
//! address the transaction appears to come from.
//!
//! # Scenario Weights
//!
//! | Fraud | Scenario     | Weight |
//! |-------|--------------|--------|
//! | no    | `Home`       | 0.85   |
//! | no    | `Domestic`   | 0.10   |
//! | no    | `Foreign`    | 0.05   |
//! | yes   | `Foreign`    | 0.80   |
//! | yes   | `HomeSpoof`  | 0.20   |
//!
//! `Home` and `HomeSpoof` share one derivation, so a spoofed familiar
//! address is indistinguishable from a genuine one by address alone.

use crate::identity::CustomerId;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Scenario weights for legitimate transactions
pub const LEGITIMATE_SCENARIOS: [(NetworkScenario, f64); 3] = [
    (NetworkScenario::Home, 0.85),
    (NetworkScenario::Domestic, 0.10),
    (NetworkScenario::Foreign, 0.05),
];

/// Scenario weights for fraudulent transactions
pub const FRAUD_SCENARIOS: [(NetworkScenario, f64); 2] = [
    (NetworkScenario::Foreign, 0.80),
    (NetworkScenario::HomeSpoof, 0.20),
];

/// Network-context pattern governing address derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkScenario {
    /// Customer's usual network, different device
    Home,
    /// Same country, different region (shares the first octet only)
    Domestic,
    /// Unrelated origin
    Foreign,
    /// Attacker presenting an address from the customer's home network
    HomeSpoof,
}

impl NetworkScenario {
    /// Whether addresses for this scenario share the agent's home prefix
    pub fn shares_home_prefix(&self) -> bool {
        matches!(self, NetworkScenario::Home | NetworkScenario::HomeSpoof)
    }
}

impl fmt::Display for NetworkScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkScenario::Home => "HOME",
            NetworkScenario::Domestic => "DOMESTIC",
            NetworkScenario::Foreign => "FOREIGN",
            NetworkScenario::HomeSpoof => "HOME_SPOOF",
        };
        f.write_str(name)
    }
}

/// Simulated customer with a stable home network
///
/// # Example
/// ```
/// use fraud_txgen_core::{CustomerAgent, CustomerId, RngManager};
///
/// let mut rng = RngManager::new(42);
/// let agent = CustomerAgent::new(CustomerId(100_000), &mut rng);
///
/// let (scenario, ip) = agent.context(false, &mut rng);
/// if scenario.shares_home_prefix() {
///     assert_eq!(ip.octets()[..2], agent.home_prefix());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerAgent {
    /// Customer identifier (never reused within a process)
    id: CustomerId,

    /// Usual connection origin, assigned once
    home_address: Ipv4Addr,

    /// First two octets of `home_address`
    home_prefix: [u8; 2],
}

impl CustomerAgent {
    /// Create an agent with a freshly drawn public home address
    pub fn new(id: CustomerId, rng: &mut RngManager) -> Self {
        Self::with_home_address(id, random_public_address(rng, None))
    }

    /// Create an agent with a known home address
    pub fn with_home_address(id: CustomerId, home_address: Ipv4Addr) -> Self {
        let [a, b, _, _] = home_address.octets();
        Self {
            id,
            home_address,
            home_prefix: [a, b],
        }
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn home_address(&self) -> Ipv4Addr {
        self.home_address
    }

    pub fn home_prefix(&self) -> [u8; 2] {
        self.home_prefix
    }

    /// Address a transaction appears to come from
    pub fn context_ip(&self, is_fraud: bool, rng: &mut RngManager) -> Ipv4Addr {
        self.context(is_fraud, rng).1
    }

    /// Draw a scenario for this transaction and derive its address
    pub fn context(&self, is_fraud: bool, rng: &mut RngManager) -> (NetworkScenario, Ipv4Addr) {
        let scenario = select_scenario(is_fraud, rng);
        (scenario, self.address_for(scenario, rng))
    }

    /// Derive an address for an explicit scenario
    pub fn address_for(&self, scenario: NetworkScenario, rng: &mut RngManager) -> Ipv4Addr {
        let [a, b] = self.home_prefix;
        match scenario {
            NetworkScenario::Home | NetworkScenario::HomeSpoof => {
                Ipv4Addr::new(a, b, random_octet(rng), random_host_octet(rng))
            }
            NetworkScenario::Domestic => {
                // Any second octet except the home one
                let mut second = rng.range(0, 255) as u8;
                if second >= b {
                    second += 1;
                }
                Ipv4Addr::new(a, second, random_octet(rng), random_host_octet(rng))
            }
            NetworkScenario::Foreign => random_public_address(rng, Some(a)),
        }
    }
}

/// Weighted scenario draw for the given fraud label
pub fn select_scenario(is_fraud: bool, rng: &mut RngManager) -> NetworkScenario {
    if is_fraud {
        weighted_pick(&FRAUD_SCENARIOS, rng)
    } else {
        weighted_pick(&LEGITIMATE_SCENARIOS, rng)
    }
}

fn weighted_pick(table: &[(NetworkScenario, f64)], rng: &mut RngManager) -> NetworkScenario {
    let total: f64 = table.iter().map(|(_, w)| w).sum();
    let mut target = rng.next_f64() * total;

    for (scenario, weight) in table {
        target -= weight;
        if target < 0.0 {
            return *scenario;
        }
    }

    // Float rounding can leave a sliver at the top of the range
    table[table.len() - 1].0
}

fn random_octet(rng: &mut RngManager) -> u8 {
    rng.range(0, 256) as u8
}

/// Host octet, avoiding network (.0) and broadcast (.255)
fn random_host_octet(rng: &mut RngManager) -> u8 {
    rng.range(1, 255) as u8
}

/// First octets that never appear on a public internet origin
///
/// 0/8 "this network", 10/8 private, 100/8 (contains carrier-grade NAT),
/// 127/8 loopback, 169/8 (contains link-local), 172/8 (contains private
/// 172.16/12), 192/8 (contains 192.168/16). 224 and above are multicast
/// and reserved and are excluded by the draw range.
const NON_PUBLIC_FIRST_OCTETS: [u8; 7] = [0, 10, 100, 127, 169, 172, 192];

/// Whether `octet` can lead a public-looking address
pub fn is_public_first_octet(octet: u8) -> bool {
    (1..=223).contains(&octet) && !NON_PUBLIC_FIRST_OCTETS.contains(&octet)
}

/// Random public-looking address, optionally avoiding one first octet
pub fn random_public_address(rng: &mut RngManager, avoid_first: Option<u8>) -> Ipv4Addr {
    let first = loop {
        let candidate = rng.range(1, 224) as u8;
        if is_public_first_octet(candidate) && Some(candidate) != avoid_first {
            break candidate;
        }
    };

    Ipv4Addr::new(
        first,
        random_octet(rng),
        random_octet(rng),
        random_host_octet(rng),
    )
}
