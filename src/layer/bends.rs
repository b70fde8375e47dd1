use tracing::{debug, warn};

use crate::error::{Result, SolveError};
use crate::math::polygon_2d::segment_overlaps_convex_polygon;
use crate::math::segment_2d::{segments_collinear_overlap, side_of_line};
use crate::math::{Point3, Vector3};
use crate::mesh::Mesh;

use super::overlap::OverlapInfo;
use super::pair::{FacePair, Order, PairOrders};

/// Constraints contributed by edges bent out of plane: each joins two faces
/// that lie in different overlap groups.
#[derive(Debug, Clone, Default)]
pub struct BendConstraints {
    /// Orders forced by a bend edge crossing a face of its own plane.
    pub orders: PairOrders,
    /// Tortilla-tortilla constraints tying the stacking of two bends that
    /// run along the same line.
    pub tortilla_tortilla: Vec<[u32; 4]>,
}

/// A bend edge with its faces oriented so that `faces[0]` lies in the
/// lower group.
#[derive(Debug, Clone, Copy)]
struct BendEdge {
    edge: u32,
    points: [Point3; 2],
    faces: [u32; 2],
    groups: [usize; 2],
}

impl BendEdge {
    /// Direction in which `faces[i]` leaves the edge line.
    fn departure(&self, overlap: &OverlapInfo, i: usize) -> Vector3 {
        let axis = (self.points[1] - self.points[0]).normalize();
        let d = overlap.center_3d(self.faces[i]) - self.points[0];
        d - axis * axis.dot(&d)
    }

    /// Side of the other group's plane, seen from group `i`, that the far
    /// face leaves towards. `None` if it runs inside the plane.
    fn lean(&self, overlap: &OverlapInfo, i: usize, epsilon: f64) -> Option<Order> {
        let normal = overlap.groups()[self.groups[i]].frame().normal();
        let h = self.departure(overlap, 1 - i).dot(normal);
        if h > epsilon {
            Some(Order::Above)
        } else if h < -epsilon {
            Some(Order::Below)
        } else {
            None
        }
    }
}

/// Runs both bend detectors over the unprojected mesh.
///
/// These only add information for non-coplanar folds; full stacking of
/// faces in different planes is not resolved.
///
/// # Errors
///
/// Returns [`SolveError::NoSolution`] when two bends force opposite orders
/// on the same face pair.
pub fn detect_bends(mesh: &Mesh, overlap: &OverlapInfo, epsilon: f64) -> Result<BendConstraints> {
    let bends = bend_edges(mesh, overlap, epsilon);
    let mut result = BendConstraints::default();
    if bends.is_empty() {
        return Ok(result);
    }
    bend_face_orders(mesh, overlap, &bends, epsilon, &mut result)?;
    bend_pairs(overlap, &bends, epsilon, &mut result);
    debug!(
        bends = bends.len(),
        orders = result.orders.len(),
        tortilla_tortilla = result.tortilla_tortilla.len(),
        "bend detection"
    );
    Ok(result)
}

fn bend_edges(mesh: &Mesh, overlap: &OverlapInfo, epsilon: f64) -> Vec<BendEdge> {
    mesh.edges()
        .filter_map(|edge| {
            let &[p, q] = mesh.edge_faces(edge) else {
                return None;
            };
            let (gp, gq) = (overlap.face_group(p)?, overlap.face_group(q)?);
            if gp == gq {
                return None;
            }
            let points = mesh.edge_points(edge);
            if (points[1] - points[0]).norm() < epsilon {
                warn!(edge, "skipping degenerate bend edge");
                return None;
            }
            let (faces, groups) = if gp < gq {
                ([p, q], [gp, gq])
            } else {
                ([q, p], [gq, gp])
            };
            Some(BendEdge {
                edge,
                points,
                faces,
                groups,
            })
        })
        .collect()
}

/// A bend edge lying across a face `f` of one of its planes pins its own
/// face in that plane on the side the far face leaves towards.
fn bend_face_orders(
    mesh: &Mesh,
    overlap: &OverlapInfo,
    bends: &[BendEdge],
    epsilon: f64,
    result: &mut BendConstraints,
) -> Result<()> {
    for bend in bends {
        for i in 0..2 {
            let Some(lean) = bend.lean(overlap, i, epsilon) else {
                continue;
            };
            let group = &overlap.groups()[bend.groups[i]];
            let s0 = group.frame().project(&bend.points[0]);
            let s1 = group.frame().project(&bend.points[1]);
            let own = bend.faces[i];
            for &f in group.faces() {
                if f == own || mesh.edge_faces(bend.edge).contains(&f) {
                    continue;
                }
                if !segment_overlaps_convex_polygon(overlap.polygon(f), &s0, &s1, epsilon) {
                    continue;
                }
                let (pair, swapped) = FacePair::oriented(own, f);
                result
                    .orders
                    .try_insert(pair, lean.flip_if(swapped))
                    .map_err(|pair| SolveError::NoSolution { pair: Some(pair) })?;
            }
        }
    }
    Ok(())
}

/// Two bends along the same line between the same planes, with their faces
/// leaving in the same directions, stack the same way in both planes
/// (or mirrored, when the fold opens towards one normal only).
fn bend_pairs(overlap: &OverlapInfo, bends: &[BendEdge], epsilon: f64, result: &mut BendConstraints) {
    for (i, first) in bends.iter().enumerate() {
        for second in &bends[i + 1..] {
            if first.groups != second.groups
                || first.faces.iter().any(|f| second.faces.contains(f))
            {
                continue;
            }
            let frames = first.groups.map(|g| overlap.groups()[g].frame());
            let x = frames[0];
            let (a0, a1) = (x.project(&first.points[0]), x.project(&first.points[1]));
            let (b0, b1) = (x.project(&second.points[0]), x.project(&second.points[1]));
            if !segments_collinear_overlap(&a0, &a1, &b0, &b1, epsilon) {
                continue;
            }
            let same_side = (0..2).all(|k| {
                let frame = frames[k];
                let (e0, e1) = (frame.project(&first.points[0]), frame.project(&first.points[1]));
                let s = side_of_line(&e0, &e1, overlap.center(first.faces[k]), epsilon);
                s.is_some() && s == side_of_line(&e0, &e1, overlap.center(second.faces[k]), epsilon)
            });
            if !same_side {
                continue;
            }
            let (Some(lean_x), Some(lean_y)) =
                (first.lean(overlap, 0, epsilon), first.lean(overlap, 1, epsilon))
            else {
                continue;
            };
            let [p1, q1] = first.faces;
            let [p2, q2] = second.faces;
            if lean_x == lean_y {
                result.tortilla_tortilla.push([p1, q1, p2, q2]);
            } else {
                result.tortilla_tortilla.push([p1, q2, p2, q1]);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::LayerError;
    use crate::mesh::Assignment;

    const EPS: f64 = 1e-6;

    /// Builds a mesh from 3D faces with their own vertices, joined along
    /// the listed `(face, side, face, side)` hinges.
    fn mesh_3d(faces: &[Vec<Point3>], hinges: &[(usize, usize, usize, usize)]) -> Mesh {
        let mut coords = Vec::new();
        let mut faces_vertices = Vec::new();
        let mut edges = Vec::new();
        let mut edges_faces = Vec::new();
        for (face, points) in faces.iter().enumerate() {
            let base = u32::try_from(coords.len()).unwrap();
            let n = u32::try_from(points.len()).unwrap();
            coords.extend_from_slice(points);
            for k in 0..n {
                edges.push([base + k, base + (k + 1) % n]);
                edges_faces.push(vec![u32::try_from(face).unwrap()]);
            }
            faces_vertices.push((0..n).map(|k| base + k).collect());
        }
        let offset = |face: usize, side: usize| -> usize {
            faces[..face].iter().map(Vec::len).sum::<usize>() + side
        };
        for &(a, sa, b, sb) in hinges {
            edges_faces[offset(a, sa)] = vec![u32::try_from(a).unwrap(), u32::try_from(b).unwrap()];
            edges_faces[offset(b, sb)].clear();
        }
        let n = edges.len();
        Mesh::new(coords, edges, vec![Assignment::Valley; n], faces_vertices)
            .unwrap()
            .with_edges_faces(edges_faces)
            .unwrap()
    }

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Floor face at x in [x0, 0], z = `z`; wall face at x = `x`, z in
    /// [z, 1]. Side 1 of the floor and side 0 of the wall run along y.
    fn l_shape(x0: f64, z: f64, x: f64) -> [Vec<Point3>; 2] {
        [
            vec![p(x0, 0.0, z), p(x, 0.0, z), p(x, 1.0, z), p(x0, 1.0, z)],
            vec![p(x, 0.0, z), p(x, 1.0, z), p(x, 1.0, 1.0), p(x, 0.0, 1.0)],
        ]
    }

    #[test]
    fn bend_over_a_face_forces_an_order() {
        // An L standing on a wide floor face that extends under the bend.
        let [floor, wall] = l_shape(-1.0, 0.0, 0.0);
        let base = vec![p(-1.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(-1.0, 1.0, 0.0)];
        let mesh = mesh_3d(&[floor, wall, base], &[(0, 1, 1, 0)]);
        let overlap = OverlapInfo::compute(&mesh, EPS);
        assert_eq!(overlap.face_group(0), overlap.face_group(2));
        let bends = detect_bends(&mesh, &overlap, EPS).unwrap();
        // The wall rises along +Z, so the floor face sits on top of the base.
        assert_eq!(bends.orders.get_oriented(0, 2), Some(Order::Above));
        assert!(bends.tortilla_tortilla.is_empty());
    }

    #[test]
    fn nested_bends_tie_their_stacks() {
        let [f0, w0] = l_shape(-1.0, 0.0, 0.0);
        let [f1, w1] = l_shape(-1.0, 0.0, 0.0);
        let mesh = mesh_3d(&[f0, w0, f1, w1], &[(0, 1, 1, 0), (2, 1, 3, 0)]);
        let overlap = OverlapInfo::compute(&mesh, EPS);
        let bends = detect_bends(&mesh, &overlap, EPS).unwrap();
        // The dihedral interior is above the floor and behind the wall
        // (x < 0), so the two stacks are mirrored.
        assert_eq!(bends.tortilla_tortilla, vec![[0, 3, 2, 1]]);
    }

    #[test]
    fn opposite_bends_over_one_face_have_no_solution() {
        // Floor face 0 on a wide base face 3, with a wall rising along
        // x = 0 and another hanging down along x = -1: the floor would
        // have to lie both above and below the base.
        let floor = vec![p(-1.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(-1.0, 1.0, 0.0)];
        let up = vec![p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(0.0, 0.0, 1.0)];
        let down = vec![
            p(-1.0, 0.0, 0.0),
            p(-1.0, 1.0, 0.0),
            p(-1.0, 1.0, -1.0),
            p(-1.0, 0.0, -1.0),
        ];
        let base = vec![p(-2.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(-2.0, 1.0, 0.0)];
        let mesh = mesh_3d(&[floor, up, down, base], &[(0, 1, 1, 0), (0, 3, 2, 0)]);
        let overlap = OverlapInfo::compute(&mesh, EPS);
        assert_eq!(overlap.face_group(0), overlap.face_group(3));
        let err = detect_bends(&mesh, &overlap, EPS).unwrap_err();
        assert!(matches!(
            err,
            LayerError::Solve(SolveError::NoSolution { pair: Some(pair) }) if pair == FacePair::new(0, 3)
        ));
    }

    #[test]
    fn flat_mesh_has_no_bends() {
        let base = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)];
        let mesh = mesh_3d(&[base.clone(), base], &[]);
        let overlap = OverlapInfo::compute(&mesh, EPS);
        let bends = detect_bends(&mesh, &overlap, EPS).unwrap();
        assert!(bends.orders.is_empty());
        assert!(bends.tortilla_tortilla.is_empty());
    }
}
