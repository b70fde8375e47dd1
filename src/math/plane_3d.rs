use nalgebra::{Rotation3, Translation3};

use super::{Matrix4, Point2, Point3, Vector3};

/// Computes the unit normal of a planar polygon with Newell's method.
///
/// The normal follows the right-hand rule over the vertex order, so a
/// counter-clockwise polygon in the XY plane yields `+Z`. Returns `None`
/// when the polygon encloses less than `epsilon` of area.
#[must_use]
pub fn newell_normal(points: &[Point3], epsilon: f64) -> Option<Vector3> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    // |normal| is twice the polygon area.
    let len = normal.norm();
    if len * 0.5 < epsilon {
        return None;
    }
    Some(normal / len)
}

/// Flips a unit normal so that its first significant component among
/// z, y, x is positive. Coplanar faces with opposite windings then share
/// one frame, and flat 2D input always maps to `+Z`.
#[must_use]
pub fn canonical_normal(normal: &Vector3, epsilon: f64) -> Vector3 {
    let key = if normal.z.abs() > epsilon {
        normal.z
    } else if normal.y.abs() > epsilon {
        normal.y
    } else {
        normal.x
    };
    if key < 0.0 {
        -normal
    } else {
        *normal
    }
}

/// A plane together with the rigid transform that lays it onto `z = 0`.
#[derive(Debug, Clone)]
pub struct PlaneFrame {
    normal: Vector3,
    offset: f64,
    transform: Matrix4,
}

impl PlaneFrame {
    /// Builds the frame of the plane with the given (canonical) unit normal
    /// passing through `point`.
    #[must_use]
    pub fn new(normal: Vector3, point: &Point3, epsilon: f64) -> Self {
        let offset = normal.dot(&point.coords);
        let rotation = if (normal - Vector3::z()).norm() < epsilon {
            Rotation3::identity()
        } else {
            Rotation3::rotation_between(&normal, &Vector3::z()).unwrap_or_else(|| {
                // Anti-parallel to +Z: half turn about X.
                Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
            })
        };
        let translation = Translation3::new(0.0, 0.0, -offset);
        let transform = translation.to_homogeneous() * rotation.to_homogeneous();
        Self {
            normal,
            offset,
            transform,
        }
    }

    /// Returns the unit normal of the plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the signed distance of the plane from the origin.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Returns the transform mapping the plane onto `z = 0`.
    #[must_use]
    pub fn transform(&self) -> &Matrix4 {
        &self.transform
    }

    /// Signed distance from `point` to the plane.
    #[must_use]
    pub fn distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Maps a 3D point into the plane's 2D frame, dropping the out-of-plane
    /// component.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point2 {
        let q = self.transform.transform_point(point);
        Point2::new(q.x, q.y)
    }
}
