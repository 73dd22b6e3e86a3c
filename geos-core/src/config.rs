// Scenario configuration for setting up a gift economy

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::error::{GeosError, Result};
use crate::types::{EconomyName, Quantity};

/// Parameters of one simulation setup run.
///
/// All weight pairs are `[no, yes]` weights for a coin flip; agent type
/// weights follow [`crate::types::AgentType::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub economies: Vec<EconomyName>,
    pub agent_count: u32,
    pub solver_count: u32,
    pub agent_type_weights: [f64; 3],
    pub global_solver_weights: [f64; 2],
    pub complex_resources: u32,
    pub atomic_resources: u32,
    pub dependency_weights: [f64; 2],
    /// `[min, max]` units seeded into the global pool per resource
    pub initial_stock: [Quantity; 2],
    /// `[min, max]` distinct resources handed to each agent
    pub resources_per_agent: [usize; 2],
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            economies: vec!["north".into(), "south".into(), "east".into(), "west".into()],
            agent_count: 100,
            solver_count: 10,
            agent_type_weights: [1.0, 1.0, 1.0],
            global_solver_weights: [0.8, 0.2],
            complex_resources: 5,
            atomic_resources: 15,
            dependency_weights: [0.7, 0.3],
            initial_stock: [50, 500],
            resources_per_agent: [1, 5],
        }
    }
}

impl ScenarioConfig {
    /// Parse a JSON config. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn resource_count(&self) -> usize {
        self.complex_resources as usize + self.atomic_resources as usize
    }

    /// Reject parameter combinations that can only fail later.
    pub fn validate(&self) -> Result<()> {
        let [lo, hi] = self.initial_stock;
        if lo > hi {
            return Err(GeosError::InvalidBounds { min: lo, max: hi });
        }
        // Resource ids are u32 and the pool total must fit in a Quantity
        let resources = self
            .complex_resources
            .checked_add(self.atomic_resources)
            .ok_or(GeosError::QuantityOverflow("resource count"))?;
        if hi.checked_mul(u64::from(resources)).is_none() {
            return Err(GeosError::QuantityOverflow("initial stock total"));
        }
        let [min_count, max_count] = self.resources_per_agent;
        if min_count > max_count {
            return Err(GeosError::InvalidBounds {
                min: min_count as u64,
                max: max_count as u64,
            });
        }
        if max_count > self.resource_count() {
            return Err(GeosError::InvalidSampleSize {
                requested: max_count,
                available: self.resource_count(),
            });
        }
        let needs_economies = self.agent_count > 0 || self.solver_count > 0;
        if needs_economies && self.economies.is_empty() {
            return Err(GeosError::InvalidSampleSize {
                requested: 1,
                available: 0,
            });
        }
        Ok(())
    }
}
