// Gift economies of scale: resource distribution and decentralization metrics
//
// Module structure:
// - types         IDs, quantities and fixed enumerations
// - inventory     Stock records held by agents and the global pool
// - agents/       Agent and solver entities
// - requests      Requests, donation responses, receipts, constraints
// - catalog       Two-tier resource catalog builder
// - population    Agent and solver initialization
// - distribution  Initial allocation of the global pool to agents
// - metrics       Idling, concentration, distribution, decentralization
// - config        Scenario configuration
// - world         Setup run container

use wasm_bindgen::prelude::*;

pub mod agents;
pub mod catalog;
pub mod config;
pub mod distribution;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod population;
pub mod requests;
pub mod sampling;
pub mod types;
pub mod world;

pub use agents::{Agent, Solver};
pub use catalog::{Catalog, Resource, build_resource_catalog};
pub use config::ScenarioConfig;
pub use distribution::{
    Allocation, AllocationDraws, RESERVED_UNITS, RandomDraws, distribute_inventory, distribute_with,
};
pub use error::{GeosError, Result};
pub use inventory::{Inventory, StockRecord};
pub use metrics::{
    Concentration, EconomyReport, IdlingCapacity, ResourceMetrics, concentration_index,
    cumulative_idling_capacity, decentralization_index, distribution_index, economy_report,
};
pub use population::{EntityKind, Population, init_agents, init_population, init_solvers};
pub use requests::{
    Constraint, DonationReceipt, DonationResponse, DonationState, ReceiptSender, Request,
    RequestState,
};
pub use types::*;
pub use world::{World, seed_global_inventory};

#[cfg(feature = "instrument")]
pub use instrument;

// ============================================================================
// WASM API
// ============================================================================

fn to_js_error(err: GeosError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[wasm_bindgen]
pub struct GiftEconomy {
    world: World,
}

#[wasm_bindgen]
impl GiftEconomy {
    #[wasm_bindgen(constructor)]
    pub fn new(config: ScenarioConfig) -> std::result::Result<GiftEconomy, JsValue> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        let world = World::from_config(config).map_err(to_js_error)?;
        Ok(Self { world })
    }

    /// Hand out the global pool. Returns the number of transfers, or 0 if
    /// the pool was already distributed.
    #[wasm_bindgen]
    pub fn distribute(&mut self) -> std::result::Result<usize, JsValue> {
        let allocations = self.world.distribute().map_err(to_js_error)?;
        Ok(allocations.map_or(0, |a| a.len()))
    }

    #[wasm_bindgen]
    pub fn report(&self) -> std::result::Result<EconomyReport, JsValue> {
        self.world.report().map_err(to_js_error)
    }

    /// Inventory of one agent, or `undefined` for an unknown id.
    #[wasm_bindgen]
    pub fn agent_inventory(&self, agent_id: u32) -> std::result::Result<JsValue, JsValue> {
        match self.world.agents.get(&AgentId::new(agent_id)) {
            Some(agent) => Ok(serde_wasm_bindgen::to_value(&agent.inventory)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen]
    pub fn global_inventory(&self) -> std::result::Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.world.global)?)
    }
}
