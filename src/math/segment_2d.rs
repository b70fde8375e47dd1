use super::{cross_2d, Point2};

/// Which side of a directed line a point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Classifies `point` against the directed line through `a` and `b`.
///
/// Returns `None` when the point lies within `epsilon` of the line or the
/// segment is shorter than `epsilon`.
#[must_use]
pub fn side_of_line(a: &Point2, b: &Point2, point: &Point2, epsilon: f64) -> Option<Side> {
    let d = b - a;
    let len = d.norm();
    if len < epsilon {
        return None;
    }
    let dist = cross_2d(&d, &(point - a)) / len;
    if dist > epsilon {
        Some(Side::Left)
    } else if dist < -epsilon {
        Some(Side::Right)
    } else {
        None
    }
}

/// Tests whether two segments are collinear and share a stretch longer than
/// `epsilon`.
///
/// Segments that only touch at an endpoint, or that are parallel but offset
/// by more than `epsilon`, do not overlap.
#[must_use]
pub fn segments_collinear_overlap(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
    epsilon: f64,
) -> bool {
    let d = a1 - a0;
    let len = d.norm();
    if len < epsilon || (b1 - b0).norm() < epsilon {
        return false;
    }
    let u = d / len;

    // Both endpoints of b must sit on a's line.
    if cross_2d(&u, &(b0 - a0)).abs() > epsilon || cross_2d(&u, &(b1 - a0)).abs() > epsilon {
        return false;
    }

    let t0 = u.dot(&(b0 - a0));
    let t1 = u.dot(&(b1 - a0));
    let lo = t0.min(t1).max(0.0);
    let hi = t0.max(t1).min(len);
    hi - lo > epsilon
}
