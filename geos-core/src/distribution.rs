//! Initial allocation of the global inventory to agents.
//!
//! Every agent draws a random subset of the resources in the global pool and
//! a random quantity of each. Quantities move out of the pool and into the
//! agent's own inventory, so for every resource
//! `sum(agent quantities) + global remainder == original global quantity`.
//!
//! Agents are served in id order. Near depletion this order decides who still
//! gets stock; that variance is part of the allocation policy.

use std::collections::BTreeMap;

use rand::Rng;

use crate::agents::Agent;
use crate::error::{GeosError, Result};
use crate::inventory::Inventory;
use crate::sampling::sample_distinct;
use crate::types::{AgentId, Quantity, ResourceId};

/// Global stock at or below this level is not handed out.
pub const RESERVED_UNITS: Quantity = 2;

/// Source of the four random choices the allocation makes.
///
/// [`RandomDraws`] answers them from an `Rng`; other implementations can
/// script exact scenarios.
pub trait AllocationDraws {
    /// Number of distinct resources for one agent, in `[min, max]`.
    fn resource_count(&mut self, min: usize, max: usize) -> usize;

    /// `count` distinct resources out of `available`.
    fn pick_resources(&mut self, available: &[ResourceId], count: usize) -> Result<Vec<ResourceId>>;

    /// Units to transfer when `remaining` (> [`RESERVED_UNITS`]) are left,
    /// in `[1, remaining - 1]`. Anything else fails with
    /// [`GeosError::InvalidTransfer`].
    fn transfer_quantity(&mut self, remaining: Quantity) -> Quantity;

    /// How many of the `transferred` units the agent declares idle, in `[0, transferred]`.
    fn idle_portion(&mut self, transferred: Quantity) -> Quantity;
}

/// Uniform draws from a random number generator.
pub struct RandomDraws<'a, R: Rng> {
    rng: &'a mut R,
}

impl<'a, R: Rng> RandomDraws<'a, R> {
    pub fn new(rng: &'a mut R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> AllocationDraws for RandomDraws<'_, R> {
    fn resource_count(&mut self, min: usize, max: usize) -> usize {
        self.rng.random_range(min..=max)
    }

    fn pick_resources(&mut self, available: &[ResourceId], count: usize) -> Result<Vec<ResourceId>> {
        sample_distinct(&mut *self.rng, available, count)
    }

    fn transfer_quantity(&mut self, remaining: Quantity) -> Quantity {
        self.rng.random_range(1..=remaining - 1)
    }

    fn idle_portion(&mut self, transferred: Quantity) -> Quantity {
        self.rng.random_range(0..=transferred)
    }
}

/// One transfer from the global pool to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub agent: AgentId,
    pub resource: ResourceId,
    pub quantity: Quantity,
    pub idle: Quantity,
}

/// Hand out global stock to `agents` using uniform random draws.
///
/// See [`distribute_with`].
pub fn distribute_inventory<R: Rng>(
    rng: &mut R,
    agents: &mut BTreeMap<AgentId, Agent>,
    min_count: usize,
    max_count: usize,
    global: &mut Inventory,
) -> Result<Vec<Allocation>> {
    distribute_with(&mut RandomDraws::new(rng), agents, min_count, max_count, global)
}

/// Hand out global stock to `agents`, mutating both in place.
///
/// For each agent, `k` in `[min_count, max_count]` distinct resources are
/// drawn from the global key set. A resource with at most
/// [`RESERVED_UNITS`] left is skipped for that agent; otherwise between 1 and
/// `remaining - 1` units move to the agent, with a random idle portion.
///
/// Fails if `min_count > max_count`, if `max_count` exceeds the number of
/// resources in the pool, or if a draw falls outside its documented range.
/// On any error neither `global` nor `agents` is changed.
pub fn distribute_with<D: AllocationDraws>(
    draws: &mut D,
    agents: &mut BTreeMap<AgentId, Agent>,
    min_count: usize,
    max_count: usize,
    global: &mut Inventory,
) -> Result<Vec<Allocation>> {
    if min_count > max_count {
        return Err(GeosError::InvalidBounds {
            min: min_count as u64,
            max: max_count as u64,
        });
    }
    if max_count > global.len() {
        return Err(GeosError::InvalidSampleSize {
            requested: max_count,
            available: global.len(),
        });
    }

    // The key set never changes during distribution; records only shrink.
    let available: Vec<ResourceId> = global.resource_ids().collect();
    let mut allocations = Vec::new();

    // Staged copies, committed only after every transfer succeeded
    let mut pool = global.clone();
    let mut staged = agents.clone();

    for agent in staged.values_mut() {
        let count = draws.resource_count(min_count, max_count);
        if count < min_count || count > max_count {
            return Err(GeosError::InvalidSampleSize {
                requested: count,
                available: available.len(),
            });
        }
        let picked = draws.pick_resources(&available, count)?;

        for resource in picked {
            let remaining = pool.quantity(resource);
            if remaining <= RESERVED_UNITS {
                #[cfg(feature = "instrument")]
                tracing::info!(
                    target: "allocation_skip",
                    agent_id = agent.id.0,
                    resource_id = resource.0,
                    global_remaining = remaining,
                );
                continue;
            }

            let quantity = draws.transfer_quantity(remaining);
            if quantity == 0 || quantity >= remaining {
                return Err(GeosError::InvalidTransfer {
                    resource,
                    quantity,
                    remaining,
                });
            }
            let idle = draws.idle_portion(quantity);
            if idle > quantity {
                return Err(GeosError::IdleExceedsQuantity {
                    resource,
                    idle,
                    quantity,
                });
            }

            pool.withdraw(resource, quantity)?;
            agent.inventory.deposit(resource, quantity, idle)?;

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "allocation",
                agent_id = agent.id.0,
                resource_id = resource.0,
                quantity = quantity,
                idle = idle,
                global_remaining = pool.quantity(resource),
            );

            allocations.push(Allocation {
                agent: agent.id,
                resource,
                quantity,
                idle,
            });
        }
    }

    *global = pool;
    *agents = staged;
    Ok(allocations)
}
