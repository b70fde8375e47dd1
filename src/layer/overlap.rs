use tracing::{debug, warn};

use crate::math::plane_3d::{canonical_normal, newell_normal, PlaneFrame};
use crate::math::polygon_2d::{convex_polygons_overlap, signed_area_2d, vertex_centroid_2d};
use crate::math::{Matrix4, Point2, Point3, Vector3};
use crate::mesh::Mesh;

use super::pair::FacePair;

/// A set of coplanar faces sharing one 2D frame.
#[derive(Debug, Clone)]
pub struct OverlapGroup {
    frame: PlaneFrame,
    faces: Vec<u32>,
}

impl OverlapGroup {
    /// The plane of the group and its projection into 2D.
    #[must_use]
    pub fn frame(&self) -> &PlaneFrame {
        &self.frame
    }

    /// Transform mapping the group's plane onto `z = 0`.
    #[must_use]
    pub fn transform(&self) -> &Matrix4 {
        self.frame.transform()
    }

    /// Faces of the group, ascending.
    #[must_use]
    pub fn faces(&self) -> &[u32] {
        &self.faces
    }
}

/// Axis-aligned bounds of a projected face.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Point2,
    max: Point2,
}

impl Bounds {
    fn of(points: &[Point2]) -> Self {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for pt in points {
            min.x = min.x.min(pt.x);
            min.y = min.y.min(pt.y);
            max.x = max.x.max(pt.x);
            max.y = max.y.max(pt.y);
        }
        Self { min, max }
    }

    fn overlaps(&self, other: &Self, epsilon: f64) -> bool {
        self.max.x - other.min.x > epsilon
            && other.max.x - self.min.x > epsilon
            && self.max.y - other.min.y > epsilon
            && other.max.y - self.min.y > epsilon
    }
}

/// Coplanar face groups, per-face projections and the overlap graph.
///
/// Everything is indexed by face; groups only hold face indices, never
/// copies of the mesh.
#[derive(Debug, Clone)]
pub struct OverlapInfo {
    groups: Vec<OverlapGroup>,
    faces_group: Vec<Option<usize>>,
    faces_winding: Vec<bool>,
    faces_polygon: Vec<Vec<Point2>>,
    faces_center: Vec<Point2>,
    faces_center_3d: Vec<Point3>,
    faces_bounds: Vec<Bounds>,
    faces_overlap: Vec<Vec<u32>>,
    degenerate_faces: Vec<u32>,
}

impl OverlapInfo {
    /// Groups the faces of `mesh` by plane, projects each group into 2D and
    /// records which faces of a group overlap.
    ///
    /// Faces with fewer than three vertices or no area are logged, left out
    /// of every group and never overlap anything.
    #[must_use]
    pub fn compute(mesh: &Mesh, epsilon: f64) -> Self {
        let face_count = mesh.face_count();
        let mut info = Self {
            groups: Vec::new(),
            faces_group: vec![None; face_count],
            faces_winding: vec![true; face_count],
            faces_polygon: vec![Vec::new(); face_count],
            faces_center: vec![Point2::origin(); face_count],
            faces_center_3d: vec![Point3::origin(); face_count],
            faces_bounds: Vec::with_capacity(face_count),
            faces_overlap: vec![Vec::new(); face_count],
            degenerate_faces: Vec::new(),
        };

        for face in mesh.faces() {
            let points = mesh.face_points(face);
            info.faces_center_3d[face as usize] = centroid_3d(&points);
            let Some(normal) = newell_normal(&points, epsilon) else {
                warn!(face, "skipping degenerate face with no area");
                info.degenerate_faces.push(face);
                continue;
            };
            info.assign_group(face, &points, &normal, epsilon);
        }

        info.faces_bounds = info.faces_polygon.iter().map(|p| Bounds::of(p)).collect();
        for g in 0..info.groups.len() {
            info.find_overlaps(g, epsilon);
        }

        debug!(
            groups = info.groups.len(),
            degenerate = info.degenerate_faces.len(),
            pairs = info.face_pairs().len(),
            "overlap grouping complete"
        );
        info
    }

    fn assign_group(&mut self, face: u32, points: &[Point3], normal: &Vector3, epsilon: f64) {
        let canonical = canonical_normal(normal, epsilon);
        let center = self.faces_center_3d[face as usize];
        let existing = self.groups.iter().position(|group| {
            let frame = group.frame();
            frame.normal().dot(&canonical).abs() > 1.0 - epsilon
                && frame.distance(&center).abs() < epsilon
        });
        let g = existing.unwrap_or_else(|| {
            self.groups.push(OverlapGroup {
                frame: PlaneFrame::new(canonical, &center, epsilon),
                faces: Vec::new(),
            });
            self.groups.len() - 1
        });

        let frame = self.groups[g].frame();
        let polygon: Vec<Point2> = points.iter().map(|p| frame.project(p)).collect();
        let area = signed_area_2d(&polygon);
        if area.abs() < epsilon {
            warn!(face, area, "skipping degenerate face after projection");
            self.degenerate_faces.push(face);
            if self.groups[g].faces.is_empty() {
                self.groups.pop();
            }
            return;
        }

        let f = face as usize;
        self.faces_winding[f] = area > 0.0;
        self.faces_center[f] = vertex_centroid_2d(&polygon);
        self.faces_polygon[f] = polygon;
        self.faces_group[f] = Some(g);
        self.groups[g].faces.push(face);
    }

    fn find_overlaps(&mut self, g: usize, epsilon: f64) {
        let faces = self.groups[g].faces.clone();
        for (i, &a) in faces.iter().enumerate() {
            for &b in &faces[i + 1..] {
                let (ai, bi) = (a as usize, b as usize);
                if !self.faces_bounds[ai].overlaps(&self.faces_bounds[bi], epsilon) {
                    continue;
                }
                if convex_polygons_overlap(&self.faces_polygon[ai], &self.faces_polygon[bi], epsilon)
                {
                    self.faces_overlap[ai].push(b);
                    self.faces_overlap[bi].push(a);
                }
            }
        }
        for &face in &faces {
            self.faces_overlap[face as usize].sort_unstable();
        }
    }

    /// All coplanar groups, in discovery order.
    #[must_use]
    pub fn groups(&self) -> &[OverlapGroup] {
        &self.groups
    }

    /// Group of a face, or `None` for a degenerate face.
    #[must_use]
    pub fn face_group(&self, face: u32) -> Option<usize> {
        self.faces_group[face as usize]
    }

    /// Winding of every face: `true` when it faces along its group normal.
    #[must_use]
    pub fn faces_winding(&self) -> &[bool] {
        &self.faces_winding
    }

    /// Winding of one face.
    #[must_use]
    pub fn winding(&self, face: u32) -> bool {
        self.faces_winding[face as usize]
    }

    /// Face polygon projected into its group frame (empty if degenerate).
    #[must_use]
    pub fn polygon(&self, face: u32) -> &[Point2] {
        &self.faces_polygon[face as usize]
    }

    /// Vertex centroid of the projected face polygon.
    #[must_use]
    pub fn center(&self, face: u32) -> &Point2 {
        &self.faces_center[face as usize]
    }

    /// Vertex centroid of the face in folded 3D coordinates.
    #[must_use]
    pub fn center_3d(&self, face: u32) -> &Point3 {
        &self.faces_center_3d[face as usize]
    }

    /// Faces overlapping `face`, ascending.
    #[must_use]
    pub fn overlapping(&self, face: u32) -> &[u32] {
        &self.faces_overlap[face as usize]
    }

    /// Returns `true` if the two faces overlap.
    #[must_use]
    pub fn overlaps(&self, a: u32, b: u32) -> bool {
        self.faces_overlap[a as usize].binary_search(&b).is_ok()
    }

    /// Returns `true` if the bounding boxes of a face and a projected
    /// segment can intersect.
    #[must_use]
    pub fn bounds_touch_segment(&self, face: u32, s0: &Point2, s1: &Point2, epsilon: f64) -> bool {
        let bounds = Bounds::of(&[*s0, *s1]);
        let face = &self.faces_bounds[face as usize];
        bounds.max.x - face.min.x > -epsilon
            && face.max.x - bounds.min.x > -epsilon
            && bounds.max.y - face.min.y > -epsilon
            && face.max.y - bounds.min.y > -epsilon
    }

    /// Faces that were excluded as degenerate.
    #[must_use]
    pub fn degenerate_faces(&self) -> &[u32] {
        &self.degenerate_faces
    }

    /// Every overlapping face pair, group by group, ascending inside a group.
    #[must_use]
    pub fn face_pairs(&self) -> Vec<FacePair> {
        self.groups
            .iter()
            .flat_map(|group| {
                group.faces.iter().flat_map(move |&a| {
                    self.overlapping(a)
                        .iter()
                        .filter(move |&&b| b > a)
                        .map(move |&b| FacePair::new(a, b))
                })
            })
            .collect()
    }
}

fn centroid_3d(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, pt| acc + pt.coords);
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    Point3::from(sum / n)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::Assignment;
    use approx::assert_relative_eq;

    const EPS: f64 = 1e-6;

    /// Three unit squares, the first two stacked, the third off to the side.
    fn loose_squares() -> Mesh {
        let mut coords = Vec::new();
        let mut edges = Vec::new();
        let mut faces = Vec::new();
        for (i, (x, ccw)) in [(0.0, true), (0.0, false), (5.0, true)].into_iter().enumerate() {
            let base = u32::try_from(i * 4).unwrap();
            coords.extend([
                Point2::new(x, 0.0),
                Point2::new(x + 1.0, 0.0),
                Point2::new(x + 1.0, 1.0),
                Point2::new(x, 1.0),
            ]);
            for k in 0..4 {
                edges.push([base + k, base + (k + 1) % 4]);
            }
            let mut loop_ = vec![base, base + 1, base + 2, base + 3];
            if !ccw {
                loop_.reverse();
            }
            faces.push(loop_);
        }
        let assignment = vec![Assignment::Boundary; edges.len()];
        Mesh::new_2d(&coords, edges, assignment, faces).unwrap()
    }

    #[test]
    fn flat_mesh_is_one_group() {
        let info = OverlapInfo::compute(&loose_squares(), EPS);
        assert_eq!(info.groups().len(), 1);
        assert_eq!(info.groups()[0].faces(), &[0, 1, 2]);
        assert_eq!(*info.groups()[0].transform(), Matrix4::identity());
    }

    #[test]
    fn winding_follows_loop_direction() {
        let info = OverlapInfo::compute(&loose_squares(), EPS);
        assert_eq!(info.faces_winding(), &[true, false, true]);
    }

    #[test]
    fn only_stacked_faces_overlap() {
        let info = OverlapInfo::compute(&loose_squares(), EPS);
        assert!(info.overlaps(0, 1));
        assert!(info.overlaps(1, 0));
        assert!(!info.overlaps(0, 2));
        assert_eq!(info.face_pairs(), vec![FacePair::new(0, 1)]);
    }

    #[test]
    fn centers_are_projected() {
        let info = OverlapInfo::compute(&loose_squares(), EPS);
        assert_relative_eq!(*info.center(2), Point2::new(5.5, 0.5));
    }

    #[test]
    fn degenerate_face_is_isolated() {
        let coords = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        let edges = vec![[0, 1], [1, 2], [2, 0]];
        let mesh = Mesh::new_2d(
            &coords,
            edges,
            vec![Assignment::Boundary; 3],
            vec![vec![0, 1, 2]],
        )
        .unwrap();
        let info = OverlapInfo::compute(&mesh, EPS);
        assert_eq!(info.degenerate_faces(), &[0]);
        assert_eq!(info.face_group(0), None);
        assert!(info.groups().is_empty());
        assert!(info.face_pairs().is_empty());
    }

    #[test]
    fn perpendicular_faces_form_two_groups() {
        // An L: one square on the floor, one standing on its far edge.
        let coords = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        let edges = vec![[0, 1], [1, 2], [2, 3], [3, 0], [2, 4], [4, 5], [5, 1]];
        let faces = vec![vec![0, 1, 2, 3], vec![1, 5, 4, 2]];
        let mut assignment = vec![Assignment::Boundary; edges.len()];
        assignment[1] = Assignment::Valley;
        let mesh = Mesh::new(coords, edges, assignment, faces).unwrap();
        let info = OverlapInfo::compute(&mesh, EPS);
        assert_eq!(info.groups().len(), 2);
        assert_eq!(info.face_group(0), Some(0));
        assert_eq!(info.face_group(1), Some(1));
        assert_relative_eq!(*info.groups()[1].frame().normal(), Vector3::x(), epsilon = 1e-12);
        assert!(info.face_pairs().is_empty());
    }
}
