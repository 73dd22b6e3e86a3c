//! Decentralization metrics over the post-distribution state.
//!
//! All four measures are read-only and rounded to two decimals:
//! - cumulative idling capacity: idle / total stock, system-wide and per resource
//! - concentration index: `1 - (max share - min share)` among holders
//! - distribution index: fraction of the population holding the resource
//! - decentralization index: mean of distribution and concentration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::agents::Agent;
use crate::error::{GeosError, Result};
use crate::inventory::{Inventory, checked_total};
use crate::types::{AgentId, Quantity, ResourceId};

/// Round to two decimal places, half away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// === IDLING CAPACITY ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdlingCapacity {
    pub overall: f64,
    /// One entry per resource in the global inventory. `None` when the
    /// resource has no stock anywhere, so the ratio is undefined.
    pub by_resource: BTreeMap<ResourceId, Option<f64>>,
}

/// Share of all stock (agents plus the global remainder) that is idle.
///
/// Fails with [`GeosError::DivisionUndefined`] when there is no stock at all.
pub fn cumulative_idling_capacity(
    global: &Inventory,
    agents: &BTreeMap<AgentId, Agent>,
) -> Result<IdlingCapacity> {
    let mut idle: BTreeMap<ResourceId, Quantity> = BTreeMap::new();
    let mut total: BTreeMap<ResourceId, Quantity> = BTreeMap::new();

    let holdings = agents
        .values()
        .map(|a| &a.inventory)
        .chain(std::iter::once(global));
    for inventory in holdings {
        for (id, record) in inventory.iter() {
            let i = idle.entry(*id).or_default();
            *i = i
                .checked_add(record.idle_stock)
                .ok_or(GeosError::QuantityOverflow("idle stock total"))?;
            let t = total.entry(*id).or_default();
            *t = t
                .checked_add(record.quantity)
                .ok_or(GeosError::QuantityOverflow("stock total"))?;
        }
    }

    let idle_overall = checked_total(idle.values().copied(), "idle stock total")?;
    let total_overall = checked_total(total.values().copied(), "stock total")?;
    if total_overall == 0 {
        return Err(GeosError::DivisionUndefined("cumulative idling capacity"));
    }

    let by_resource = global
        .resource_ids()
        .map(|id| {
            let t = total.get(&id).copied().unwrap_or(0);
            let ratio = (t > 0).then(|| {
                let i = idle.get(&id).copied().unwrap_or(0);
                round2(i as f64 / t as f64)
            });
            (id, ratio)
        })
        .collect();

    Ok(IdlingCapacity {
        overall: round2(idle_overall as f64 / total_overall as f64),
        by_resource,
    })
}

// === CONCENTRATION ===

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    /// `1 - (max_share - min_share)`, rounded. 1.0 means all holders hold equal amounts.
    pub index: f64,
    /// Smallest holder share, unrounded.
    pub min_share: f64,
    /// Largest holder share, unrounded.
    pub max_share: f64,
}

impl Concentration {
    const NO_HOLDERS: Self = Self {
        index: 0.0,
        min_share: 0.0,
        max_share: 0.0,
    };
}

/// How evenly `resource` is spread among the agents holding it.
///
/// Only agents with a nonzero quantity count as holders, and idle versus
/// active stock makes no difference. With no holders the index is 0.0.
pub fn concentration_index(resource: ResourceId, agents: &BTreeMap<AgentId, Agent>) -> Concentration {
    let held: Vec<Quantity> = agents
        .values()
        .map(|a| a.inventory.quantity(resource))
        .filter(|&q| q > 0)
        .collect();

    // Widened so any number of full holdings sums without overflow
    let total: u128 = held.iter().map(|&q| u128::from(q)).sum();
    if total == 0 {
        return Concentration::NO_HOLDERS;
    }

    let (min, max) = held
        .iter()
        .fold((Quantity::MAX, 0), |(lo, hi), &q| (lo.min(q), hi.max(q)));
    let min_share = min as f64 / total as f64;
    let max_share = max as f64 / total as f64;

    Concentration {
        index: round2(1.0 - (max_share - min_share)),
        min_share,
        max_share,
    }
}

// === DISTRIBUTION ===

/// Fraction of a population of `agent_count` agents holding any of `resource`.
///
/// Fails with [`GeosError::DivisionUndefined`] for an empty population.
pub fn distribution_index(
    resource: ResourceId,
    agents: &BTreeMap<AgentId, Agent>,
    agent_count: usize,
) -> Result<f64> {
    if agent_count == 0 {
        return Err(GeosError::DivisionUndefined("distribution index"));
    }
    let holders = agents.values().filter(|a| a.inventory.holds(resource)).count();
    Ok(round2(holders as f64 / agent_count as f64))
}

// === DECENTRALIZATION ===

pub fn decentralization_index(distribution: f64, concentration: f64) -> f64 {
    round2((distribution + concentration) / 2.0)
}

// === REPORT ===

/// All indices for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ResourceMetrics {
    pub resource: ResourceId,
    pub distribution: f64,
    pub concentration: f64,
    pub decentralization: f64,
    pub idling: Option<f64>,
}

/// Summary statistics of a distributed economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct EconomyReport {
    pub idling_overall: f64,
    pub resources: Vec<ResourceMetrics>,
}

/// Compute every index for every resource in the global inventory.
pub fn economy_report(global: &Inventory, agents: &BTreeMap<AgentId, Agent>) -> Result<EconomyReport> {
    let idling = cumulative_idling_capacity(global, agents)?;

    let mut resources = Vec::with_capacity(idling.by_resource.len());
    for (&resource, &idle_ratio) in &idling.by_resource {
        let distribution = distribution_index(resource, agents, agents.len())?;
        let concentration = concentration_index(resource, agents).index;
        let metrics = ResourceMetrics {
            resource,
            distribution,
            concentration,
            decentralization: decentralization_index(distribution, concentration),
            idling: idle_ratio,
        };

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "resource_metrics",
            resource_id = resource.0,
            distribution = metrics.distribution,
            concentration = metrics.concentration,
            decentralization = metrics.decentralization,
            idling = metrics.idling.unwrap_or(f64::NAN),
        );

        resources.push(metrics);
    }

    Ok(EconomyReport {
        idling_overall: idling.overall,
        resources,
    })
}
