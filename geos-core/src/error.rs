//! Error types for `geos-core`.
//!
//! Every fallible operation returns [`GeosError`] through the [`Result`] alias.
//! The low-stock skip during distribution is an allocation rule, not an error.

use crate::requests::RequestState;
use crate::types::{Quantity, RequestId, ResourceId, SolverId};

pub type Result<T> = std::result::Result<T, GeosError>;

#[derive(Debug, thiserror::Error)]
pub enum GeosError {
    /// A subset larger than the population it is drawn from was requested.
    #[error("cannot sample {requested} items from a population of {available}")]
    InvalidSampleSize { requested: usize, available: usize },

    /// A `[min, max]` range with `min > max`.
    #[error("invalid bounds: min {min} exceeds max {max}")]
    InvalidBounds { min: u64, max: u64 },

    /// Withdrawal larger than the stock on hand, or from an absent record.
    #[error("insufficient stock of {resource}: requested {requested}, available {available}")]
    InsufficientStock {
        resource: ResourceId,
        requested: Quantity,
        available: Quantity,
    },

    /// A stock record whose idle portion would exceed its quantity.
    #[error("idle stock {idle} of {resource} exceeds quantity {quantity}")]
    IdleExceedsQuantity {
        resource: ResourceId,
        idle: Quantity,
        quantity: Quantity,
    },

    /// A draw asked to move a quantity outside `[1, remaining - 1]`.
    #[error("cannot transfer {quantity} of {resource} with {remaining} remaining")]
    InvalidTransfer {
        resource: ResourceId,
        quantity: Quantity,
        remaining: Quantity,
    },

    /// A stock total that does not fit in a `Quantity`.
    #[error("{0} overflows")]
    QuantityOverflow(&'static str),

    /// Ratio metric with a zero denominator.
    #[error("{0} is undefined: zero denominator")]
    DivisionUndefined(&'static str),

    /// Weights rejected by the weighted sampler (negative, NaN, or all zero).
    #[error("invalid sampling weights: {0}")]
    InvalidWeights(String),

    #[error("request {request} is not assigned to {solver}")]
    RequestNotAssigned { solver: SolverId, request: RequestId },

    #[error("request {request} is already {state:?}")]
    RequestClosed {
        request: RequestId,
        state: RequestState,
    },

    #[error("failed to parse scenario config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<rand::distr::weighted::Error> for GeosError {
    fn from(err: rand::distr::weighted::Error) -> Self {
        Self::InvalidWeights(err.to_string())
    }
}
