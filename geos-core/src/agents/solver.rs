use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{GeosError, Result};
use crate::types::{EconomyName, GLOBAL_ECONOMY, RequestId, SolverId, SolverRole};

/// Non-user node that breaks down, matches, or validates requests for the
/// sub-economies it serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solver {
    pub id: SolverId,
    pub roles: BTreeSet<SolverRole>,
    pub economies: BTreeSet<EconomyName>,
    requests: BTreeSet<RequestId>,
}

impl Solver {
    pub fn new(id: SolverId, roles: BTreeSet<SolverRole>, economies: BTreeSet<EconomyName>) -> Self {
        Self {
            id,
            roles,
            economies,
            requests: BTreeSet::new(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.economies.contains(GLOBAL_ECONOMY)
    }

    pub fn has_role(&self, role: SolverRole) -> bool {
        self.roles.contains(&role)
    }

    /// Assign requests. Already-assigned ids are left as they are.
    pub fn add_requests(&mut self, requests: impl IntoIterator<Item = RequestId>) {
        self.requests.extend(requests);
    }

    /// Unassign requests. Fails without removing anything if any id is not
    /// currently assigned.
    pub fn remove_requests(&mut self, requests: &[RequestId]) -> Result<()> {
        if let Some(&missing) = requests.iter().find(|&&r| !self.requests.contains(&r)) {
            return Err(GeosError::RequestNotAssigned {
                solver: self.id,
                request: missing,
            });
        }
        for r in requests {
            self.requests.remove(r);
        }
        Ok(())
    }

    pub fn requests(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.requests.iter().copied()
    }

    pub fn is_assigned(&self, request: RequestId) -> bool {
        self.requests.contains(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> Solver {
        Solver::new(
            SolverId::new(0),
            BTreeSet::from([SolverRole::Matchmaking]),
            BTreeSet::from(["north".to_string()]),
        )
    }

    #[test]
    fn test_add_requests_is_set_like() {
        let mut s = solver();
        s.add_requests([RequestId(1), RequestId(2), RequestId(1)]);
        assert_eq!(s.requests().collect::<Vec<_>>(), vec![RequestId(1), RequestId(2)]);
    }

    #[test]
    fn test_remove_absent_request_fails_atomically() {
        let mut s = solver();
        s.add_requests([RequestId(1), RequestId(2)]);

        let err = s.remove_requests(&[RequestId(1), RequestId(5)]).unwrap_err();
        assert!(matches!(
            err,
            GeosError::RequestNotAssigned { request: RequestId(5), .. }
        ));
        // Nothing removed on failure
        assert!(s.is_assigned(RequestId(1)));

        s.remove_requests(&[RequestId(1)]).unwrap();
        assert!(!s.is_assigned(RequestId(1)));
        assert!(s.is_assigned(RequestId(2)));
    }

    #[test]
    fn test_global_scope() {
        let mut s = solver();
        assert!(!s.is_global());
        s.economies.insert(GLOBAL_ECONOMY.to_string());
        assert!(s.is_global());
        assert!(s.has_role(SolverRole::Matchmaking));
        assert!(!s.has_role(SolverRole::Validation));
    }
}
