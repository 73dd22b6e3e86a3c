// Core ID types, quantities and the fixed enumerations of the gift economy

use std::fmt;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

// === TYPE ALIASES ===

/// Whole units of a resource. Stock is never fractional.
pub type Quantity = u64;

/// Name of a sub-economy. Agents and solvers belong to one or more of these.
pub type EconomyName = String;

/// Scope sentinel added to solvers that serve every sub-economy.
pub const GLOBAL_ECONOMY: &str = "global";

// === NEWTYPE IDS ===

#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ResourceId(pub u32);

impl ResourceId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SolverId(pub u32);

impl SolverId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "solver_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request_{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DonationId(pub u64);

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReceiptId(pub u64);

// === ENUMERATIONS ===

/// Tier of a resource in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Tier 1: may depend on atomic resources
    Complex,
    /// Tier 2: no dependencies
    Atomic,
}

/// Behavioral type of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentType {
    DecentralizationConscious,
    Honest,
    Rational,
}

impl AgentType {
    /// Order matches the weight vector passed to the population initializer.
    pub const ALL: [AgentType; 3] = [
        AgentType::DecentralizationConscious,
        AgentType::Honest,
        AgentType::Rational,
    ];
}

/// Computational task a solver node performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverRole {
    /// Splits complex requests into atomic subrequests
    Breakdown,
    /// Pairs requests with donation responses
    Matchmaking,
    /// Checks donation receipts
    Validation,
}

impl SolverRole {
    pub const ALL: [SolverRole; 3] = [
        SolverRole::Breakdown,
        SolverRole::Matchmaking,
        SolverRole::Validation,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_labels() {
        assert_eq!(ResourceId::new(7).to_string(), "resource_7");
        assert_eq!(AgentId::new(0).to_string(), "agent_0");
        assert_eq!(SolverId::new(3).to_string(), "solver_3");
    }

    #[test]
    fn test_agent_type_serializes_kebab_case() {
        let json = serde_json::to_string(&AgentType::DecentralizationConscious).unwrap();
        assert_eq!(json, "\"decentralization-conscious\"");
    }
}
