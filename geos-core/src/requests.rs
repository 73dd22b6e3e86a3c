// Requests, donation responses, receipts and their constraints.
//
// These are the records exchanged between agents and solvers. Setup only
// creates them; the breakdown/matching/validation workflows live elsewhere.

use serde::{Deserialize, Serialize};

use crate::error::{GeosError, Result};
use crate::types::{AgentId, DonationId, Quantity, ReceiptId, RequestId, ResourceId, ResourceKind, SolverId};

// === CONSTRAINTS ===

/// Restriction attached to a request or donation, such as a location or a
/// time window. `content` is free-form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: String,
    pub content: String,
}

impl Constraint {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
        }
    }
}

// === REQUESTS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Submitted,
    Fulfilled,
    Expired,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestState::Submitted)
    }
}

/// Intent to acquire `quantity` units of a resource.
///
/// A request inherits the kind of its resource; complex requests are split
/// into atomic `subrequests` by a breakdown solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub resource: ResourceId,
    pub kind: ResourceKind,
    pub quantity: Quantity,
    pub requestor: AgentId,
    pub solver: SolverId,
    pub constraints: Vec<Constraint>,
    pub subrequests: Vec<RequestId>,
    pub strategy_added: bool,
    state: RequestState,
}

impl Request {
    pub fn new(
        id: RequestId,
        resource: ResourceId,
        kind: ResourceKind,
        quantity: Quantity,
        requestor: AgentId,
        solver: SolverId,
    ) -> Self {
        Self {
            id,
            resource,
            kind,
            quantity,
            requestor,
            solver,
            constraints: Vec::new(),
            subrequests: Vec::new(),
            strategy_added: false,
            state: RequestState::Submitted,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn fulfill(&mut self) -> Result<()> {
        self.close(RequestState::Fulfilled)
    }

    /// An expired request is no longer open to donations.
    pub fn expire(&mut self) -> Result<()> {
        self.close(RequestState::Expired)
    }

    fn close(&mut self, next: RequestState) -> Result<()> {
        if self.state.is_terminal() {
            return Err(GeosError::RequestClosed {
                request: self.id,
                state: self.state,
            });
        }
        self.state = next;
        Ok(())
    }
}

// === DONATIONS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationState {
    Submitted,
}

/// A donor's announced intent to cover (part of) a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationResponse {
    pub id: DonationId,
    pub donor: AgentId,
    pub request: RequestId,
    pub quantity: Quantity,
    pub constraints: Vec<Constraint>,
    pub state: DonationState,
}

impl DonationResponse {
    pub fn new(id: DonationId, donor: AgentId, request: RequestId, quantity: Quantity) -> Self {
        Self {
            id,
            donor,
            request,
            quantity,
            constraints: Vec::new(),
            state: DonationState::Submitted,
        }
    }
}

/// Which side of a donation issued a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptSender {
    Requestor,
    Donor,
}

/// Confirmation that a donation took place, submitted for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationReceipt {
    pub id: ReceiptId,
    pub sender: ReceiptSender,
    pub agent: AgentId,
    pub request: RequestId,
    pub solver: SolverId,
    pub resource: ResourceId,
    pub quantity: Quantity,
}
