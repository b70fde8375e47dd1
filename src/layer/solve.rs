use crate::error::{GeometryError, Result};
use crate::math::DEFAULT_EPSILON;
use crate::mesh::Mesh;

use super::engine::solve_layers;
use super::solution::LayerSolution;

/// Default bound on explored branch nodes.
pub const DEFAULT_MAX_BRANCH_NODES: usize = 1_000_000;

/// Finds every consistent layer ordering of a folded mesh.
pub struct SolveLayers<'a> {
    mesh: &'a Mesh,
    epsilon: f64,
    max_branch_nodes: usize,
}

impl<'a> SolveLayers<'a> {
    /// Creates a new `SolveLayers` operation with default settings.
    #[must_use]
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            epsilon: DEFAULT_EPSILON,
            max_branch_nodes: DEFAULT_MAX_BRANCH_NODES,
        }
    }

    /// Sets the tolerance of every geometric predicate.
    #[must_use]
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the maximum number of branch nodes to explore.
    #[must_use]
    pub fn max_branch_nodes(mut self, max_branch_nodes: usize) -> Self {
        self.max_branch_nodes = max_branch_nodes;
        self
    }

    /// Executes the solve.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidEpsilon`] for a non-positive or
    /// non-finite epsilon, a `MeshError` if the mesh is inconsistent, and a
    /// `SolveError` if no ordering exists or the branch limit is hit.
    pub fn execute(&self) -> Result<LayerSolution> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(GeometryError::InvalidEpsilon(self.epsilon).into());
        }
        self.mesh.validate()?;
        solve_layers(self.mesh, self.epsilon, self.max_branch_nodes)
    }
}
