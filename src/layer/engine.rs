use tracing::{debug, info};

use crate::error::{Result, SolveError};
use crate::mesh::Mesh;

use super::adjacent::edge_adjacent_orders;
use super::bends::detect_bends;
use super::constraints::ConstraintSet;
use super::overlap::OverlapInfo;
use super::patterns::extract_patterns;
use super::solution::LayerSolution;
use super::solver::Solver;
use super::transitivity::{filter_transitivity, transitivity_trios};

/// Computes every layer ordering of a folded mesh.
///
/// Orchestrates the full pipeline: overlap grouping, pattern extraction,
/// transitivity, bend detection, crease orders and the branching solver.
pub fn solve_layers(mesh: &Mesh, epsilon: f64, max_nodes: usize) -> Result<LayerSolution> {
    // Step 1: Group coplanar faces and find overlapping pairs
    let overlap = OverlapInfo::compute(mesh, epsilon);
    let pairs = overlap.face_pairs();
    if pairs.is_empty() {
        debug!(faces = mesh.face_count(), "no overlapping faces");
        return Ok(LayerSolution::empty());
    }

    // Step 2: Patterns and transitivity trios, group by group
    let per_group: Vec<_> = (0..overlap.groups().len())
        .map(|group| {
            let patterns = extract_patterns(mesh, &overlap, group, epsilon);
            let trios = filter_transitivity(transitivity_trios(&overlap, group, epsilon), &patterns);
            (patterns, trios)
        })
        .collect();

    // Step 3: Faces bent out of plane
    let bends = detect_bends(mesh, &overlap, epsilon)?;
    let constraints = ConstraintSet::assemble(&per_group, &bends.tortilla_tortilla);

    // Step 4: Orders known before any search
    let mut initial = edge_adjacent_orders(mesh, &overlap, epsilon)?;
    initial
        .try_extend(&bends.orders)
        .map_err(|pair| SolveError::NoSolution { pair: Some(pair) })?;

    // Step 5: Propagate and branch
    let tree = Solver::new(&constraints, &pairs, &initial, max_nodes).solve()?;
    let solution = LayerSolution {
        root: tree.root,
        branches: tree.branches,
        faces_winding: overlap.faces_winding().to_vec(),
    };
    info!(
        pairs = pairs.len(),
        constraints = constraints.len(),
        root = solution.root.len(),
        branch_lists = solution.branches.len(),
        "layer solve complete"
    );
    Ok(solution)
}
