//! Layer-order pipeline: overlap grouping, taco/tortilla patterns,
//! transitivity, bend detection, crease orders and the branching solver.

pub mod adjacent;
pub mod bends;
pub mod constraints;
mod engine;
pub mod overlap;
mod pair;
pub mod patterns;
mod solution;
mod solve;
mod solver;
pub mod table;
pub mod transitivity;

#[cfg(test)]
pub(crate) mod fixtures;

pub use adjacent::crease_order;
pub use pair::{FacePair, Order, PairOrders};
pub use solution::{FaceOrder, LayerBranch, LayerSolution};
pub use solve::{SolveLayers, DEFAULT_MAX_BRANCH_NODES};
pub use solver::{SolvedTree, Solver};
