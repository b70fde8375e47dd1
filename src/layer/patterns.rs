use tracing::{debug, warn};

use crate::math::polygon_2d::segment_overlaps_convex_polygon;
use crate::math::segment_2d::{segments_collinear_overlap, side_of_line, Side};
use crate::math::Point2;
use crate::mesh::Mesh;

use super::overlap::OverlapInfo;

/// Raw taco/tortilla patterns found in one overlap group, in detection
/// order. Face arrangements follow [`super::constraints::Constraint`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatterns {
    pub taco_taco: Vec<[u32; 4]>,
    pub taco_tortilla: Vec<[u32; 3]>,
    pub tortilla_tortilla: Vec<[u32; 4]>,
}

impl GroupPatterns {
    /// Total number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.taco_taco.len() + self.taco_tortilla.len() + self.tortilla_tortilla.len()
    }

    /// Returns `true` if no pattern was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An edge whose two faces both lie in the group, projected into 2D.
#[derive(Debug, Clone, Copy)]
struct FoldEdge {
    start: Point2,
    end: Point2,
    faces: [u32; 2],
}

impl FoldEdge {
    /// Side of each face against this edge's directed line.
    fn sides(&self, overlap: &OverlapInfo, epsilon: f64) -> Option<[Side; 2]> {
        Self::sides_against(&self.start, &self.end, self.faces, overlap, epsilon)
    }

    fn sides_against(
        start: &Point2,
        end: &Point2,
        faces: [u32; 2],
        overlap: &OverlapInfo,
        epsilon: f64,
    ) -> Option<[Side; 2]> {
        let a = side_of_line(start, end, overlap.center(faces[0]), epsilon)?;
        let b = side_of_line(start, end, overlap.center(faces[1]), epsilon)?;
        Some([a, b])
    }
}

/// Finds the taco-taco, taco-tortilla and tortilla-tortilla patterns of one
/// overlap group.
#[must_use]
pub fn extract_patterns(
    mesh: &Mesh,
    overlap: &OverlapInfo,
    group: usize,
    epsilon: f64,
) -> GroupPatterns {
    let edges = fold_edges(mesh, overlap, group, epsilon);
    let mut patterns = GroupPatterns::default();
    edge_edge_patterns(&edges, overlap, epsilon, &mut patterns);
    edge_face_patterns(&edges, overlap, group, epsilon, &mut patterns);
    debug!(
        group,
        fold_edges = edges.len(),
        taco_taco = patterns.taco_taco.len(),
        taco_tortilla = patterns.taco_tortilla.len(),
        tortilla_tortilla = patterns.tortilla_tortilla.len(),
        "patterns extracted"
    );
    patterns
}

fn fold_edges(mesh: &Mesh, overlap: &OverlapInfo, group: usize, epsilon: f64) -> Vec<FoldEdge> {
    let frame = overlap.groups()[group].frame();
    mesh.edges()
        .filter_map(|edge| {
            let &[a, b] = mesh.edge_faces(edge) else {
                return None;
            };
            if overlap.face_group(a) != Some(group) || overlap.face_group(b) != Some(group) {
                return None;
            }
            let [p, q] = mesh.edge_points(edge);
            let fold = FoldEdge {
                start: frame.project(&p),
                end: frame.project(&q),
                faces: [a, b],
            };
            if (fold.end - fold.start).norm() < epsilon {
                warn!(edge, "skipping degenerate fold edge");
                return None;
            }
            if fold.sides(overlap, epsilon).is_none() {
                warn!(edge, "skipping fold edge with a face on its line");
                return None;
            }
            Some(fold)
        })
        .collect()
}

fn edge_edge_patterns(
    edges: &[FoldEdge],
    overlap: &OverlapInfo,
    epsilon: f64,
    patterns: &mut GroupPatterns,
) {
    for (i, first) in edges.iter().enumerate() {
        for second in &edges[i + 1..] {
            if first.faces.iter().any(|f| second.faces.contains(f)) {
                continue;
            }
            if !segments_collinear_overlap(
                &first.start,
                &first.end,
                &second.start,
                &second.end,
                epsilon,
            ) {
                continue;
            }
            // Both edges are measured against the first edge's line.
            let (Some(s1), Some(s2)) = (
                first.sides(overlap, epsilon),
                FoldEdge::sides_against(&first.start, &first.end, second.faces, overlap, epsilon),
            ) else {
                continue;
            };
            classify_edge_pair(first.faces, s1, second.faces, s2, patterns);
        }
    }
}

fn classify_edge_pair(
    f1: [u32; 2],
    s1: [Side; 2],
    f2: [u32; 2],
    s2: [Side; 2],
    patterns: &mut GroupPatterns,
) {
    let taco1 = s1[0] == s1[1];
    let taco2 = s2[0] == s2[1];
    match (taco1, taco2) {
        (true, true) => {
            if s1[0] == s2[0] {
                patterns.taco_taco.push([f1[0], f1[1], f2[0], f2[1]]);
            }
        }
        (true, false) => {
            let t = if s2[0] == s1[0] { f2[0] } else { f2[1] };
            patterns.taco_tortilla.push([f1[0], t, f1[1]]);
        }
        (false, true) => {
            let t = if s1[0] == s2[0] { f1[0] } else { f1[1] };
            patterns.taco_tortilla.push([f2[0], t, f2[1]]);
        }
        (false, false) => {
            let (l1, r1) = if s1[0] == Side::Left { (f1[0], f1[1]) } else { (f1[1], f1[0]) };
            let (l2, r2) = if s2[0] == Side::Left { (f2[0], f2[1]) } else { (f2[1], f2[0]) };
            patterns.tortilla_tortilla.push([l1, r1, l2, r2]);
        }
    }
}

fn edge_face_patterns(
    edges: &[FoldEdge],
    overlap: &OverlapInfo,
    group: usize,
    epsilon: f64,
    patterns: &mut GroupPatterns,
) {
    let faces = overlap.groups()[group].faces();
    for edge in edges {
        let Some(sides) = edge.sides(overlap, epsilon) else {
            continue;
        };
        let [a, b] = edge.faces;
        for &f in faces {
            if f == a || f == b || !overlap.bounds_touch_segment(f, &edge.start, &edge.end, epsilon) {
                continue;
            }
            if !segment_overlaps_convex_polygon(overlap.polygon(f), &edge.start, &edge.end, epsilon) {
                continue;
            }
            if sides[0] == sides[1] {
                patterns.taco_tortilla.push([a, f, b]);
            } else {
                patterns.tortilla_tortilla.push([a, b, f, f]);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layer::fixtures::{square, MeshBuilder};
    use crate::mesh::Assignment;

    const EPS: f64 = 1e-6;

    fn extract(mesh: &Mesh) -> GroupPatterns {
        let overlap = OverlapInfo::compute(mesh, EPS);
        extract_patterns(mesh, &overlap, 0, EPS)
    }

    #[test]
    fn nested_tacos_make_taco_taco() {
        // Two folded strips sharing the crease line x = 1, both opening left.
        let mut b = MeshBuilder::new();
        b.face(&square(0.0, 1.0));
        b.face(&square(0.0, 1.0));
        b.face(&square(0.2, 1.0));
        b.face(&square(0.2, 1.0));
        b.join(0, 1, 1, 1);
        b.join(2, 1, 3, 1);
        let patterns = extract(&b.build());
        assert_eq!(patterns.taco_taco, vec![[0, 1, 2, 3]]);
        assert!(patterns.taco_tortilla.is_empty());
    }

    #[test]
    fn opposite_tacos_do_not_interact() {
        let mut b = MeshBuilder::new();
        b.face(&square(0.0, 1.0));
        b.face(&square(0.0, 1.0));
        b.face(&square(1.0, 2.0));
        b.face(&square(1.0, 2.0));
        b.join(0, 1, 1, 1);
        b.join(2, 3, 3, 3);
        let patterns = extract(&b.build());
        assert!(patterns.is_empty());
    }

    #[test]
    fn taco_against_flat_hinge() {
        // Faces 0/1 fold at x = 1; faces 2/3 lie flat on both sides of it.
        let mut b = MeshBuilder::new();
        b.face(&square(0.0, 1.0));
        b.face(&square(0.0, 1.0));
        b.face(&square(0.0, 1.0));
        b.face(&square(1.0, 2.0));
        b.join(0, 1, 1, 1);
        b.join(2, 1, 3, 3);
        let patterns = extract(&b.build());
        assert_eq!(patterns.taco_tortilla, vec![[0, 2, 1]]);
        assert!(patterns.tortilla_tortilla.is_empty());
    }

    #[test]
    fn crease_through_a_face() {
        // A taco folded at x = 1 lying on a wide face that spans the crease.
        let mut b = MeshBuilder::new();
        b.face(&square(0.0, 1.0));
        b.face(&square(0.0, 1.0));
        b.face(&square(0.0, 2.0));
        b.join(0, 1, 1, 1);
        let patterns = extract(&b.build());
        assert_eq!(patterns.taco_tortilla, vec![[0, 2, 1]]);
    }

    #[test]
    fn flat_hinges_make_tortilla_tortilla() {
        let mut b = MeshBuilder::new();
        b.face(&square(0.0, 1.0));
        b.face(&square(1.0, 2.0));
        b.face(&square(0.0, 1.0));
        b.face(&square(1.0, 2.0));
        b.join(0, 1, 1, 3);
        b.join(2, 1, 3, 3);
        let patterns = extract(&b.build());
        assert_eq!(patterns.tortilla_tortilla, vec![[0, 1, 2, 3]]);
    }

    #[test]
    fn flat_hinge_over_a_face() {
        let mut b = MeshBuilder::new();
        b.face(&square(0.0, 1.0));
        b.face(&square(1.0, 2.0));
        b.face(&square(0.5, 1.5));
        b.join(0, 1, 1, 3);
        let patterns = extract(&b.build());
        assert_eq!(patterns.tortilla_tortilla, vec![[0, 1, 2, 2]]);
    }

    #[test]
    fn zero_length_fold_edge_is_skipped() {
        // Two stacked squares whose only shared edge collapses to a point.
        let mut coords = square(0.0, 1.0).to_vec();
        coords.extend(square(0.0, 1.0));
        coords.extend([Point2::new(0.5, 0.5), Point2::new(0.5, 0.5)]);
        let mut edges: Vec<[u32; 2]> = (0..8).map(|k| [k, k / 4 * 4 + (k + 1) % 4]).collect();
        edges.push([8, 9]);
        let faces = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
        let mut edges_faces: Vec<Vec<u32>> = (0..8).map(|k| vec![k / 4]).collect();
        edges_faces.push(vec![0, 1]);
        let assignment = vec![Assignment::Valley; edges.len()];
        let mesh = Mesh::new_2d(&coords, edges, assignment, faces)
            .unwrap()
            .with_edges_faces(edges_faces)
            .unwrap();
        let overlap = OverlapInfo::compute(&mesh, EPS);
        assert!(fold_edges(&mesh, &overlap, 0, EPS).is_empty());
        assert!(extract(&mesh).is_empty());
    }

    #[test]
    fn loose_faces_have_no_patterns() {
        let mut b = MeshBuilder::new();
        b.face(&square(0.0, 1.0));
        b.face(&square(0.0, 1.0));
        assert!(extract(&b.build()).is_empty());
    }
}
