pub mod agent;
pub mod solver;

pub use agent::*;
pub use solver::*;
