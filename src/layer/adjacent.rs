use tracing::debug;

use crate::error::{Result, SolveError};
use crate::mesh::{Assignment, Mesh};

use super::overlap::OverlapInfo;
use super::pair::{FacePair, Order, PairOrders};

/// Order of the origin face relative to its neighbour across a crease,
/// assuming the origin face is upright: a mountain keeps the origin face on
/// top, a valley sends it below. Non-folding assignments give nothing.
#[must_use]
pub fn assignment_order(assignment: Assignment) -> Option<Order> {
    match assignment {
        Assignment::Mountain => Some(Order::Above),
        Assignment::Valley => Some(Order::Below),
        _ => None,
    }
}

/// Re-expresses an order seen from the origin face in the group frame.
/// A face that is turned over sees the stack upside down.
#[must_use]
pub fn apply_winding(order: Order, origin_upright: bool) -> Order {
    order.flip_if(!origin_upright)
}

/// Re-expresses an order of `(origin, other)` for the canonical pair, which
/// lists the smaller face first.
#[must_use]
pub fn apply_pair_swap(order: Order, swapped: bool) -> Order {
    order.flip_if(swapped)
}

/// Order of the canonical pair of two faces joined by a crease.
///
/// `origin_upright` is the winding of the crease's first adjacent face and
/// `swapped` tells whether that face is the larger index of the pair.
#[must_use]
pub fn crease_order(assignment: Assignment, origin_upright: bool, swapped: bool) -> Option<Order> {
    let order = assignment_order(assignment)?;
    let order = apply_winding(order, origin_upright);
    Some(apply_pair_swap(order, swapped))
}

/// Orders fixed by the fold assignment of a shared edge alone.
///
/// Only creases whose two faces lie in the same group and overlap there
/// (folded flat onto each other) produce an order.
///
/// # Errors
///
/// Returns [`SolveError::NoSolution`] when two creases between the same
/// faces demand opposite orders.
pub fn edge_adjacent_orders(mesh: &Mesh, overlap: &OverlapInfo, epsilon: f64) -> Result<PairOrders> {
    let mut orders = PairOrders::new();
    for edge in mesh.edges() {
        let &[origin, other] = mesh.edge_faces(edge) else {
            continue;
        };
        if overlap.face_group(origin).is_none()
            || overlap.face_group(origin) != overlap.face_group(other)
            || !overlap.overlaps(origin, other)
        {
            continue;
        }
        let (pair, swapped) = FacePair::oriented(origin, other);
        let assignment = mesh.resolved_assignment(edge, epsilon);
        let Some(order) = crease_order(assignment, overlap.winding(origin), swapped) else {
            continue;
        };
        orders
            .try_insert(pair, order)
            .map_err(|pair| SolveError::NoSolution { pair: Some(pair) })?;
    }
    debug!(orders = orders.len(), "edge-adjacent orders");
    Ok(orders)
}
