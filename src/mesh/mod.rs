mod assignment;

pub use assignment::Assignment;

use std::collections::HashMap;

use crate::error::{MeshError, Result};
use crate::math::{Point2, Point3};

/// A folded crease-pattern mesh in FOLD layout.
///
/// Vertex coordinates are the folded positions. Faces are convex, planar
/// vertex loops. The solver only ever reads a `Mesh`; every derived
/// structure refers back to it by index.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices_coords: Vec<Point3>,
    edges_vertices: Vec<[u32; 2]>,
    edges_assignment: Vec<Assignment>,
    edges_fold_angle: Option<Vec<f64>>,
    edges_faces: Vec<Vec<u32>>,
    faces_vertices: Vec<Vec<u32>>,
    faces_edges: Vec<Vec<u32>>,
}

impl Mesh {
    /// Creates a mesh from folded 3D coordinates, deriving `faces_edges`
    /// and `edges_faces` from the index arrays.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if an index is out of range, the assignment
    /// array does not match the edges, or a face side has no matching edge.
    pub fn new(
        vertices_coords: Vec<Point3>,
        edges_vertices: Vec<[u32; 2]>,
        edges_assignment: Vec<Assignment>,
        faces_vertices: Vec<Vec<u32>>,
    ) -> Result<Self> {
        let faces_edges = derive_faces_edges(&edges_vertices, &faces_vertices)?;
        let edges_faces = derive_edges_faces(edges_vertices.len(), &faces_edges);
        let mesh = Self {
            vertices_coords,
            edges_vertices,
            edges_assignment,
            edges_fold_angle: None,
            edges_faces,
            faces_vertices,
            faces_edges,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Creates a mesh from flat-folded 2D coordinates (lifted to `z = 0`).
    ///
    /// # Errors
    ///
    /// See [`Mesh::new`].
    pub fn new_2d(
        vertices_coords: &[Point2],
        edges_vertices: Vec<[u32; 2]>,
        edges_assignment: Vec<Assignment>,
        faces_vertices: Vec<Vec<u32>>,
    ) -> Result<Self> {
        let coords = vertices_coords
            .iter()
            .map(|p| Point3::new(p.x, p.y, 0.0))
            .collect();
        Self::new(coords, edges_vertices, edges_assignment, faces_vertices)
    }

    /// Replaces the derived `faces_edges` with the given adjacency and
    /// re-derives `edges_faces` from it.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if the array does not match the faces or
    /// refers to a missing edge.
    pub fn with_faces_edges(mut self, faces_edges: Vec<Vec<u32>>) -> Result<Self> {
        self.edges_faces = derive_edges_faces(self.edges_vertices.len(), &faces_edges);
        self.faces_edges = faces_edges;
        self.validate()?;
        Ok(self)
    }

    /// Replaces the derived `edges_faces` with the given adjacency.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] if the array does not match the edges or
    /// refers to a missing face.
    pub fn with_edges_faces(mut self, edges_faces: Vec<Vec<u32>>) -> Result<Self> {
        self.edges_faces = edges_faces;
        self.validate()?;
        Ok(self)
    }

    /// Attaches per-edge fold angles in degrees (FOLD `edges_foldAngle`).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::LengthMismatch`] if there is not one angle per edge.
    pub fn with_fold_angles(mut self, angles: Vec<f64>) -> Result<Self> {
        self.edges_fold_angle = Some(angles);
        self.validate()?;
        Ok(self)
    }

    /// Checks every index and array length.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found as a [`MeshError`].
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices_coords.len();
        let edge_count = self.edges_vertices.len();
        let face_count = self.faces_vertices.len();

        check_len("edges_assignment", edge_count, self.edges_assignment.len())?;
        check_len("edges_faces", edge_count, self.edges_faces.len())?;
        check_len("faces_edges", face_count, self.faces_edges.len())?;
        if let Some(angles) = &self.edges_fold_angle {
            check_len("edges_foldAngle", edge_count, angles.len())?;
        }

        for pair in &self.edges_vertices {
            check_indices("edges_vertices", pair, vertex_count)?;
        }
        for faces in &self.edges_faces {
            check_indices("edges_faces", faces, face_count)?;
        }
        for vertices in &self.faces_vertices {
            check_indices("faces_vertices", vertices, vertex_count)?;
        }
        for edges in &self.faces_edges {
            check_indices("faces_edges", edges, edge_count)?;
        }
        Ok(())
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices_coords.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges_vertices.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces_vertices.len()
    }

    /// Folded position of a vertex.
    #[must_use]
    pub fn vertex(&self, vertex: u32) -> &Point3 {
        &self.vertices_coords[vertex as usize]
    }

    /// The two vertices of an edge.
    #[must_use]
    pub fn edge_vertices(&self, edge: u32) -> [u32; 2] {
        self.edges_vertices[edge as usize]
    }

    /// Folded positions of an edge's endpoints.
    #[must_use]
    pub fn edge_points(&self, edge: u32) -> [Point3; 2] {
        let [a, b] = self.edge_vertices(edge);
        [*self.vertex(a), *self.vertex(b)]
    }

    /// Assignment of an edge as given.
    #[must_use]
    pub fn edge_assignment(&self, edge: u32) -> Assignment {
        self.edges_assignment[edge as usize]
    }

    /// Assignment of an edge, with unassigned creases resolved by the sign
    /// of their fold angle when one is available.
    #[must_use]
    pub fn resolved_assignment(&self, edge: u32, epsilon: f64) -> Assignment {
        let angle = self
            .edges_fold_angle
            .as_ref()
            .map(|angles| angles[edge as usize]);
        self.edge_assignment(edge).resolve(angle, epsilon)
    }

    /// Faces adjacent to an edge.
    #[must_use]
    pub fn edge_faces(&self, edge: u32) -> &[u32] {
        &self.edges_faces[edge as usize]
    }

    /// Vertex loop of a face.
    #[must_use]
    pub fn face_vertices(&self, face: u32) -> &[u32] {
        &self.faces_vertices[face as usize]
    }

    /// Edges around a face.
    #[must_use]
    pub fn face_edges(&self, face: u32) -> &[u32] {
        &self.faces_edges[face as usize]
    }

    /// Folded positions of a face's vertex loop.
    #[must_use]
    pub fn face_points(&self, face: u32) -> Vec<Point3> {
        self.face_vertices(face)
            .iter()
            .map(|&v| *self.vertex(v))
            .collect()
    }

    /// Iterates every face index.
    pub fn faces(&self) -> impl Iterator<Item = u32> {
        0..index_u32(self.face_count())
    }

    /// Iterates every edge index.
    pub fn edges(&self) -> impl Iterator<Item = u32> {
        0..index_u32(self.edge_count())
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn index_u32(n: usize) -> u32 {
    n as u32
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(MeshError::LengthMismatch {
            what,
            expected,
            found,
        }
        .into())
    }
}

fn check_indices(what: &'static str, indices: &[u32], len: usize) -> Result<()> {
    match indices.iter().find(|&&i| i as usize >= len) {
        Some(&index) => Err(MeshError::IndexOutOfRange {
            what,
            index: index as usize,
            len,
        }
        .into()),
        None => Ok(()),
    }
}

/// Matches each side of every face loop to the edge joining the same two
/// vertices.
fn derive_faces_edges(
    edges_vertices: &[[u32; 2]],
    faces_vertices: &[Vec<u32>],
) -> Result<Vec<Vec<u32>>> {
    let lookup: HashMap<(u32, u32), u32> = edges_vertices
        .iter()
        .enumerate()
        .map(|(e, &[a, b])| ((a.min(b), a.max(b)), index_u32(e)))
        .collect();

    faces_vertices
        .iter()
        .map(|vertices| {
            let n = vertices.len();
            (0..n)
                .map(|i| {
                    let a = vertices[i];
                    let b = vertices[(i + 1) % n];
                    lookup
                        .get(&(a.min(b), a.max(b)))
                        .copied()
                        .ok_or_else(|| {
                            MeshError::MissingAdjacency("face side has no matching edge").into()
                        })
                })
                .collect::<Result<Vec<u32>>>()
        })
        .collect()
}

/// Inverts `faces_edges`; faces are listed in ascending order per edge.
fn derive_edges_faces(edge_count: usize, faces_edges: &[Vec<u32>]) -> Vec<Vec<u32>> {
    let mut edges_faces = vec![Vec::new(); edge_count];
    for (face, edges) in faces_edges.iter().enumerate() {
        for &edge in edges {
            if let Some(faces) = edges_faces.get_mut(edge as usize) {
                faces.push(index_u32(face));
            }
        }
    }
    edges_faces
}
