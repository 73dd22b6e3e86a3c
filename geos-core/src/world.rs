// World state for a gift economy setup run

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agents::{Agent, Solver};
use crate::catalog::{Catalog, build_resource_catalog};
use crate::config::ScenarioConfig;
use crate::distribution::{Allocation, distribute_inventory};
use crate::error::{GeosError, Result};
use crate::inventory::Inventory;
use crate::metrics::{EconomyReport, economy_report};
use crate::population::{init_agents, init_solvers};
use crate::types::{AgentId, Quantity, ResourceId, SolverId};

/// Fill a global pool with every catalog resource.
///
/// Quantities are uniform in `[min, max]`; undistributed stock is entirely idle.
pub fn seed_global_inventory<R: Rng>(
    rng: &mut R,
    catalog: &Catalog,
    min: Quantity,
    max: Quantity,
) -> Result<Inventory> {
    if min > max {
        return Err(GeosError::InvalidBounds { min, max });
    }
    let mut global = Inventory::new();
    for &id in catalog.keys() {
        let quantity = rng.random_range(min..=max);
        global.add_resource(id, quantity, quantity)?;
    }
    Ok(global)
}

/// Everything built during setup, plus the random source that built it.
#[derive(Debug, Clone)]
pub struct World {
    pub config: ScenarioConfig,
    pub catalog: Catalog,
    pub agents: BTreeMap<AgentId, Agent>,
    pub solvers: BTreeMap<SolverId, Solver>,
    pub global: Inventory,
    rng: StdRng,
    distributed: bool,
}

impl World {
    /// Build catalog, population and global pool from `config`.
    ///
    /// The same config (including its seed) always yields the same world.
    pub fn from_config(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let catalog = build_resource_catalog(
            &mut rng,
            config.complex_resources,
            config.atomic_resources,
            config.dependency_weights,
        )?;
        let agents = init_agents(
            &mut rng,
            &config.economies,
            config.agent_count,
            &config.agent_type_weights,
        )?;
        let solvers = init_solvers(
            &mut rng,
            &config.economies,
            config.solver_count,
            config.global_solver_weights,
        )?;
        let [lo, hi] = config.initial_stock;
        let global = seed_global_inventory(&mut rng, &catalog, lo, hi)?;

        Ok(Self {
            config,
            catalog,
            agents,
            solvers,
            global,
            rng,
            distributed: false,
        })
    }

    pub fn is_distributed(&self) -> bool {
        self.distributed
    }

    /// Hand out the global pool to agents.
    ///
    /// Runs at most once per world; later calls return `Ok(None)` and leave
    /// all inventories untouched.
    pub fn distribute(&mut self) -> Result<Option<Vec<Allocation>>> {
        if self.distributed {
            return Ok(None);
        }
        let [min_count, max_count] = self.config.resources_per_agent;
        let allocations = distribute_inventory(
            &mut self.rng,
            &mut self.agents,
            min_count,
            max_count,
            &mut self.global,
        )?;
        self.distributed = true;
        Ok(Some(allocations))
    }

    /// Compute all metrics over the current state.
    pub fn report(&self) -> Result<EconomyReport> {
        economy_report(&self.global, &self.agents)
    }

    /// Units of each resource held anywhere (agents plus global pool).
    pub fn total_stock(&self) -> Result<BTreeMap<ResourceId, Quantity>> {
        let mut totals: BTreeMap<ResourceId, Quantity> = BTreeMap::new();
        let holdings = self
            .agents
            .values()
            .map(|a| &a.inventory)
            .chain(std::iter::once(&self.global));
        for inventory in holdings {
            for (id, record) in inventory.iter() {
                let total = totals.entry(*id).or_insert(0);
                *total = total
                    .checked_add(record.quantity)
                    .ok_or(GeosError::QuantityOverflow("resource total"))?;
            }
        }
        Ok(totals)
    }
}
