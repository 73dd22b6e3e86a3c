//! Scripted allocation scenarios
//!
//! The random draws are replaced by fixed answers so every transfer can be
//! checked by hand.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use geos_core::{
    Agent, AgentId, AgentType, AllocationDraws, GeosError, Inventory, Quantity, Request,
    RequestId, RequestState, ResourceId, ResourceKind, Solver, SolverId, SolverRole,
    distribute_with, economy_report,
};

// === TEST FIXTURES ===

const R1: ResourceId = ResourceId(1);
const R2: ResourceId = ResourceId(2);

/// Draws answered from queues, in the order the allocation asks for them.
///
/// Answers are passed through unchecked, so a script can also feed values
/// outside the documented ranges.
#[derive(Default)]
struct Scripted {
    counts: VecDeque<usize>,
    picks: VecDeque<Vec<ResourceId>>,
    transfers: VecDeque<Quantity>,
    idles: VecDeque<Quantity>,
}

impl AllocationDraws for Scripted {
    fn resource_count(&mut self, min: usize, _max: usize) -> usize {
        self.counts.pop_front().unwrap_or(min)
    }

    fn pick_resources(
        &mut self,
        available: &[ResourceId],
        count: usize,
    ) -> geos_core::Result<Vec<ResourceId>> {
        Ok(self
            .picks
            .pop_front()
            .unwrap_or_else(|| available[..count].to_vec()))
    }

    fn transfer_quantity(&mut self, _remaining: Quantity) -> Quantity {
        self.transfers.pop_front().expect("transfer not scripted")
    }

    fn idle_portion(&mut self, _transferred: Quantity) -> Quantity {
        self.idles.pop_front().unwrap_or(0)
    }
}

fn agents(n: u32) -> BTreeMap<AgentId, Agent> {
    (0..n)
        .map(|i| {
            let id = AgentId::new(i);
            let economies = BTreeSet::from(["north".to_string()]);
            (id, Agent::new(id, economies, AgentType::DecentralizationConscious))
        })
        .collect()
}

// === ALLOCATION ===

#[test]
fn test_two_agents_share_one_resource() {
    let mut global = Inventory::new();
    global.add_resource(R1, 10, 10).unwrap();
    let mut agents = agents(2);
    let mut draws = Scripted {
        transfers: VecDeque::from([3, 4]),
        idles: VecDeque::from([1, 4]),
        ..Default::default()
    };

    let allocations = distribute_with(&mut draws, &mut agents, 1, 1, &mut global).unwrap();

    assert_eq!(allocations.len(), 2);
    let a = &agents[&AgentId::new(0)].inventory;
    let b = &agents[&AgentId::new(1)].inventory;
    assert_eq!((a.quantity(R1), a.idle_stock(R1)), (3, 1));
    assert_eq!((b.quantity(R1), b.idle_stock(R1)), (4, 4));
    assert_eq!(global.quantity(R1), 3);
    assert_eq!(global.idle_stock(R1), 3);
}

#[test]
fn test_reserve_blocks_later_agents() {
    let mut global = Inventory::new();
    global.add_resource(R1, 10, 10).unwrap();
    let mut agents = agents(3);
    // First agent leaves exactly RESERVED_UNITS behind
    let mut draws = Scripted {
        transfers: VecDeque::from([8]),
        ..Default::default()
    };

    let allocations = distribute_with(&mut draws, &mut agents, 1, 1, &mut global).unwrap();

    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].agent, AgentId::new(0));
    assert_eq!(global.quantity(R1), 2);
    assert!(!agents[&AgentId::new(1)].inventory.contains(R1));
    assert!(!agents[&AgentId::new(2)].inventory.contains(R1));
}

#[test]
fn test_agent_picks_several_resources() {
    let mut global = Inventory::new();
    global.add_resource(R1, 20, 20).unwrap();
    global.add_resource(R2, 5, 5).unwrap();
    let mut agents = agents(1);
    let mut draws = Scripted {
        counts: VecDeque::from([2]),
        picks: VecDeque::from([vec![R2, R1]]),
        transfers: VecDeque::from([4, 19]),
        idles: VecDeque::from([0, 9]),
    };

    let allocations = distribute_with(&mut draws, &mut agents, 1, 2, &mut global).unwrap();

    // Picks are served in drawn order
    assert_eq!(allocations[0].resource, R2);
    assert_eq!(allocations[1].resource, R1);
    assert_eq!(global.quantity(R2), 1);
    assert_eq!(global.quantity(R1), 1);

    let report = economy_report(&global, &agents).unwrap();
    // R1: idle 9 + 1 of 20; R2: idle 0 + 1 of 5
    assert_eq!(report.resources[0].idling, Some(0.5));
    assert_eq!(report.resources[1].idling, Some(0.2));
    assert_eq!(report.resources[0].distribution, 1.0);
    assert_eq!(report.resources[0].concentration, 1.0);
}

#[test]
fn test_bad_bounds_leave_state_untouched() {
    let mut global = Inventory::new();
    global.add_resource(R1, 10, 10).unwrap();
    let snapshot = global.clone();
    let mut agents = agents(2);

    let err = distribute_with(&mut Scripted::default(), &mut agents, 2, 1, &mut global);
    assert!(matches!(err, Err(GeosError::InvalidBounds { min: 2, max: 1 })));

    let err = distribute_with(&mut Scripted::default(), &mut agents, 1, 2, &mut global);
    assert!(matches!(
        err,
        Err(GeosError::InvalidSampleSize {
            requested: 2,
            available: 1
        })
    ));

    assert_eq!(global, snapshot);
    assert!(agents.values().all(|a| a.inventory.is_empty()));
}

#[test]
fn test_zero_count_takes_nothing() {
    let mut global = Inventory::new();
    global.add_resource(R1, 10, 10).unwrap();
    let mut agents = agents(4);

    let allocations =
        distribute_with(&mut Scripted::default(), &mut agents, 0, 0, &mut global).unwrap();

    assert!(allocations.is_empty());
    assert_eq!(global.quantity(R1), 10);
}

// === REJECTED DRAWS ===

/// Run a script against a fresh 10-unit pool and two agents, expecting an error.
fn run_rejected(draws: Scripted) -> GeosError {
    let mut global = Inventory::new();
    global.add_resource(R1, 10, 10).unwrap();
    global.add_resource(R2, 6, 0).unwrap();
    let snapshot = global.clone();
    let mut agents = agents(2);
    let mut draws = draws;

    let err = distribute_with(&mut draws, &mut agents, 1, 2, &mut global).unwrap_err();

    assert_eq!(global, snapshot, "pool changed on {err}");
    assert!(
        agents.values().all(|a| a.inventory.is_empty()),
        "agents changed on {err}"
    );
    err
}

#[test]
fn test_idle_above_transfer_is_rejected() {
    let err = run_rejected(Scripted {
        picks: VecDeque::from([vec![R1]]),
        transfers: VecDeque::from([3]),
        idles: VecDeque::from([5]),
        ..Default::default()
    });
    assert!(matches!(
        err,
        GeosError::IdleExceedsQuantity { resource: R1, idle: 5, quantity: 3 }
    ));
}

#[test]
fn test_transfer_emptying_pool_is_rejected() {
    let err = run_rejected(Scripted {
        picks: VecDeque::from([vec![R1]]),
        transfers: VecDeque::from([10]),
        ..Default::default()
    });
    assert!(matches!(
        err,
        GeosError::InvalidTransfer { resource: R1, quantity: 10, remaining: 10 }
    ));
}

#[test]
fn test_empty_transfer_is_rejected() {
    let err = run_rejected(Scripted {
        picks: VecDeque::from([vec![R2]]),
        transfers: VecDeque::from([0]),
        ..Default::default()
    });
    assert!(matches!(err, GeosError::InvalidTransfer { quantity: 0, .. }));
}

#[test]
fn test_late_failure_rolls_back_earlier_transfers() {
    // First agent's transfers are valid; the second agent drains R1
    let err = run_rejected(Scripted {
        counts: VecDeque::from([2, 1]),
        picks: VecDeque::from([vec![R1, R2], vec![R1]]),
        transfers: VecDeque::from([3, 2, 7]),
        idles: VecDeque::from([1, 0]),
    });
    assert!(matches!(
        err,
        GeosError::InvalidTransfer { quantity: 7, remaining: 7, .. }
    ));
}

#[test]
fn test_count_outside_bounds_is_rejected() {
    let err = run_rejected(Scripted {
        counts: VecDeque::from([3]),
        ..Default::default()
    });
    assert!(matches!(err, GeosError::InvalidSampleSize { requested: 3, .. }));
}

// === REQUEST BOOKKEEPING ===

#[test]
fn test_solver_request_lifecycle() {
    let roles = BTreeSet::from([SolverRole::Matchmaking]);
    let mut solver = Solver::new(SolverId::new(0), roles, BTreeSet::new());
    let mut request = Request::new(
        RequestId(7),
        R1,
        ResourceKind::Atomic,
        3,
        AgentId::new(0),
        solver.id,
    );

    solver.add_requests([request.id, RequestId(8)]);
    assert!(solver.is_assigned(RequestId(7)));

    // One unknown id rejects the whole removal
    let err = solver.remove_requests(&[RequestId(7), RequestId(99)]);
    assert!(matches!(
        err,
        Err(GeosError::RequestNotAssigned { request: RequestId(99), .. })
    ));
    assert_eq!(solver.requests().count(), 2);

    request.fulfill().unwrap();
    solver.remove_requests(&[request.id]).unwrap();
    assert_eq!(solver.requests().collect::<Vec<_>>(), vec![RequestId(8)]);

    assert_eq!(request.state(), RequestState::Fulfilled);
    assert!(matches!(
        request.expire(),
        Err(GeosError::RequestClosed {
            state: RequestState::Fulfilled,
            ..
        })
    ));
}
