//! Hand-built folded meshes for tests.

use crate::math::Point2;
use crate::mesh::{index_u32 as idx, Assignment, Mesh};

/// Axis-aligned unit-height rectangle from `x0` to `x1`, counter-clockwise.
pub(crate) fn square(x0: f64, x1: f64) -> [Point2; 4] {
    [
        Point2::new(x0, 0.0),
        Point2::new(x1, 0.0),
        Point2::new(x1, 1.0),
        Point2::new(x0, 1.0),
    ]
}

/// The same rectangle wound clockwise (a face turned over). Side `k` of
/// the reversed loop runs between its points `k` and `k + 1`.
pub(crate) fn flipped_square(x0: f64, x1: f64) -> [Point2; 4] {
    let mut points = square(x0, x1);
    points.reverse();
    points
}

/// Builds a flat folded mesh face by face. Every face gets its own
/// vertices, so faces are only joined where [`MeshBuilder::crease`] says.
pub(crate) struct MeshBuilder {
    coords: Vec<Point2>,
    faces: Vec<Vec<u32>>,
    edges: Vec<[u32; 2]>,
    edges_faces: Vec<Vec<u32>>,
    assignment: Vec<Assignment>,
}

impl MeshBuilder {
    pub(crate) fn new() -> Self {
        Self {
            coords: Vec::new(),
            faces: Vec::new(),
            edges: Vec::new(),
            edges_faces: Vec::new(),
            assignment: Vec::new(),
        }
    }

    pub(crate) fn face(&mut self, points: &[Point2]) {
        let face = idx(self.faces.len());
        let base = idx(self.coords.len());
        let n = idx(points.len());
        self.coords.extend_from_slice(points);
        for k in 0..n {
            self.edges.push([base + k, base + (k + 1) % n]);
            self.edges_faces.push(vec![face]);
            self.assignment.push(Assignment::Boundary);
        }
        self.faces.push((0..n).map(|k| base + k).collect());
    }

    /// Joins side `side_a` of face `a` with side `side_b` of face `b`
    /// through a flat hinge.
    pub(crate) fn join(&mut self, a: usize, side_a: usize, b: usize, side_b: usize) {
        self.crease(a, side_a, b, side_b, Assignment::Flat);
    }

    /// Joins two face sides with a crease. The edge of face `a` carries
    /// both faces; the edge of face `b` is left dangling.
    pub(crate) fn crease(
        &mut self,
        a: usize,
        side_a: usize,
        b: usize,
        side_b: usize,
        assignment: Assignment,
    ) {
        let edge_a = self.edge_of(a, side_a);
        let edge_b = self.edge_of(b, side_b);
        self.edges_faces[edge_a] = vec![idx(a), idx(b)];
        self.assignment[edge_a] = assignment;
        self.edges_faces[edge_b].clear();
    }

    fn edge_of(&self, face: usize, side: usize) -> usize {
        self.faces[..face].iter().map(Vec::len).sum::<usize>() + side
    }

    pub(crate) fn build(self) -> Mesh {
        Mesh::new_2d(&self.coords, self.edges, self.assignment, self.faces)
            .and_then(|mesh| mesh.with_edges_faces(self.edges_faces))
            .unwrap_or_else(|err| panic!("invalid test mesh: {err}"))
    }
}
