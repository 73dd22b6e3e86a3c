// Population initializer: agents and solvers assigned to sub-economies

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::agents::{Agent, Solver};
use crate::error::{GeosError, Result};
use crate::sampling::{WeightedCoin, choose_weighted, sample_nonempty_subset};
use crate::types::{AgentId, AgentType, EconomyName, GLOBAL_ECONOMY, SolverId, SolverRole};

/// Which kind of entity `init_population` creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Agent,
    Solver,
}

#[derive(Debug, Clone)]
pub enum Population {
    Agents(BTreeMap<AgentId, Agent>),
    Solvers(BTreeMap<SolverId, Solver>),
}

/// Create `count` agents.
///
/// Each agent joins a non-empty random subset of `economies` and gets one
/// type drawn with `type_weights`, ordered as [`AgentType::ALL`].
pub fn init_agents<R: Rng>(
    rng: &mut R,
    economies: &[EconomyName],
    count: u32,
    type_weights: &[f64],
) -> Result<BTreeMap<AgentId, Agent>> {
    let mut agents = BTreeMap::new();

    for i in 0..count {
        let id = AgentId::new(i);
        let joined: BTreeSet<EconomyName> =
            sample_nonempty_subset(rng, economies)?.into_iter().collect();
        let agent_type = choose_weighted(rng, &AgentType::ALL, type_weights)?;

        agents.insert(id, Agent::new(id, joined, agent_type));
    }

    Ok(agents)
}

/// Create `count` solvers.
///
/// Each solver joins a non-empty random subset of `economies`; a weighted
/// coin (`global_weights = [no, yes]`) decides whether it also serves the
/// global scope. Its roles are a non-empty random subset of [`SolverRole::ALL`].
pub fn init_solvers<R: Rng>(
    rng: &mut R,
    economies: &[EconomyName],
    count: u32,
    global_weights: [f64; 2],
) -> Result<BTreeMap<SolverId, Solver>> {
    let coin = WeightedCoin::new(global_weights)?;
    let mut solvers = BTreeMap::new();

    for i in 0..count {
        let id = SolverId::new(i);
        let mut joined: BTreeSet<EconomyName> =
            sample_nonempty_subset(rng, economies)?.into_iter().collect();
        if coin.flip(rng) {
            joined.insert(GLOBAL_ECONOMY.to_string());
        }
        let roles: BTreeSet<SolverRole> = sample_nonempty_subset(rng, &SolverRole::ALL)?
            .into_iter()
            .collect();

        solvers.insert(id, Solver::new(id, roles, joined));
    }

    Ok(solvers)
}

/// Dispatch to [`init_agents`] or [`init_solvers`].
///
/// For agents `weights` holds one weight per [`AgentType`]; for solvers it is
/// the `[no, yes]` pair of the global-scope coin.
pub fn init_population<R: Rng>(
    rng: &mut R,
    economies: &[EconomyName],
    count: u32,
    weights: &[f64],
    kind: EntityKind,
) -> Result<Population> {
    match kind {
        EntityKind::Agent => Ok(Population::Agents(init_agents(rng, economies, count, weights)?)),
        EntityKind::Solver => {
            let pair = match *weights {
                [no, yes] => [no, yes],
                _ => {
                    return Err(GeosError::InvalidWeights(format!(
                        "solver scope takes 2 weights, got {}",
                        weights.len()
                    )));
                }
            };
            Ok(Population::Solvers(init_solvers(rng, economies, count, pair)?))
        }
    }
}
