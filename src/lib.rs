//! Layer-order solver for flat-folded crease patterns.
//!
//! Given a folded mesh (vertex positions after folding, edges with their
//! fold assignments, convex faces), [`SolveLayers`] finds every consistent
//! stacking order of the overlapping faces. The result is a
//! [`LayerSolution`]: orders that hold in every solution, plus a tree of
//! mutually exclusive branches.

pub mod error;
pub mod layer;
pub mod math;
pub mod mesh;

pub use error::{LayerError, Result};
pub use layer::{FaceOrder, FacePair, LayerBranch, LayerSolution, Order, PairOrders, SolveLayers};
pub use mesh::{Assignment, Mesh};
