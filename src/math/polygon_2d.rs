use super::{cross_2d, Point2, Vector2};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Average of the polygon's vertices.
///
/// For convex faces this always lies strictly inside the polygon, which is
/// all the side-of-edge tests need.
#[must_use]
pub fn vertex_centroid_2d(points: &[Point2]) -> Point2 {
    if points.is_empty() {
        return Point2::origin();
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, pt| acc + pt.coords);
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    Point2::from(sum / n)
}

/// Returns the polygon with counter-clockwise winding.
#[must_use]
pub fn to_counter_clockwise(points: &[Point2]) -> Vec<Point2> {
    let mut out = points.to_vec();
    if signed_area_2d(points) < 0.0 {
        out.reverse();
    }
    out
}

/// Iterates the (start, end, inward unit normal) of every edge of a
/// counter-clockwise convex polygon. Edges shorter than `epsilon` are skipped.
fn inward_edges(ccw: &[Point2], epsilon: f64) -> impl Iterator<Item = (Point2, Vector2)> + '_ {
    let n = ccw.len();
    (0..n).filter_map(move |i| {
        let a = ccw[i];
        let b = ccw[(i + 1) % n];
        let d = b - a;
        let len = d.norm();
        if len < epsilon {
            return None;
        }
        Some((a, Vector2::new(-d.y, d.x) / len))
    })
}

/// Tests whether a point lies strictly inside a convex polygon, at least
/// `epsilon` away from every edge.
#[must_use]
pub fn point_in_convex_polygon(polygon: &[Point2], point: &Point2, epsilon: f64) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let ccw = to_counter_clockwise(polygon);
    let inside = inward_edges(&ccw, epsilon).all(|(a, n)| n.dot(&(point - a)) > epsilon);
    inside
}

/// Projects a polygon onto an axis and returns `(min, max)`.
fn project(points: &[Point2], axis: &Vector2) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), pt| {
        let t = axis.dot(&pt.coords);
        (lo.min(t), hi.max(t))
    })
}

/// Tests whether two convex polygons share an area, using the separating
/// axis theorem.
///
/// Polygons whose projections overlap by less than `epsilon` on some edge
/// normal are considered separate, so polygons that only touch along an edge
/// or at a corner do not overlap.
#[must_use]
pub fn convex_polygons_overlap(a: &[Point2], b: &[Point2], epsilon: f64) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }
    let a = to_counter_clockwise(a);
    let b = to_counter_clockwise(b);
    let separated = inward_edges(&a, epsilon)
        .chain(inward_edges(&b, epsilon))
        .any(|(_, axis)| {
            let (a_lo, a_hi) = project(&a, &axis);
            let (b_lo, b_hi) = project(&b, &axis);
            a_hi - b_lo < epsilon || b_hi - a_lo < epsilon
        });
    !separated
}

/// Tests whether a segment passes through the interior of a convex polygon.
///
/// The polygon is shrunk by `epsilon` before clipping, so a segment lying on
/// the boundary (such as one of the polygon's own edges) does not overlap.
#[must_use]
pub fn segment_overlaps_convex_polygon(
    polygon: &[Point2],
    s0: &Point2,
    s1: &Point2,
    epsilon: f64,
) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let ccw = to_counter_clockwise(polygon);
    let d = s1 - s0;
    let len = d.norm();
    if len < epsilon {
        return point_in_convex_polygon(&ccw, s0, epsilon);
    }

    // Cyrus-Beck clipping of s0 + t * d against every inward half-plane.
    let mut t_in = 0.0_f64;
    let mut t_out = 1.0_f64;
    for (a, n) in inward_edges(&ccw, epsilon) {
        let dist = n.dot(&(s0 - a)) - epsilon;
        let rate = n.dot(&d);
        if rate.abs() < f64::EPSILON {
            if dist < 0.0 {
                return false;
            }
            continue;
        }
        let t = -dist / rate;
        if rate > 0.0 {
            t_in = t_in.max(t);
        } else {
            t_out = t_out.min(t);
        }
        if t_in >= t_out {
            return false;
        }
    }
    (t_out - t_in) * len > epsilon
}

/// Intersects two convex polygons (Sutherland-Hodgman).
///
/// Returns the counter-clockwise intersection polygon, or `None` when the
/// polygons do not share an area.
#[must_use]
pub fn clip_convex_polygons(a: &[Point2], b: &[Point2], epsilon: f64) -> Option<Vec<Point2>> {
    if !convex_polygons_overlap(a, b, epsilon) {
        return None;
    }
    let mut output = to_counter_clockwise(a);
    let clip = to_counter_clockwise(b);
    let n = clip.len();
    for i in 0..n {
        let c0 = clip[i];
        let c1 = clip[(i + 1) % n];
        let edge = c1 - c0;
        let inside = |pt: &Point2| cross_2d(&edge, &(pt - c0)) >= 0.0;

        let input = std::mem::take(&mut output);
        let m = input.len();
        for j in 0..m {
            let cur = input[j];
            let prev = input[(j + m - 1) % m];
            let cur_in = inside(&cur);
            let prev_in = inside(&prev);
            if cur_in != prev_in {
                if let Some(x) = line_intersection(&prev, &cur, &c0, &c1) {
                    output.push(x);
                }
            }
            if cur_in {
                output.push(cur);
            }
        }
        if output.is_empty() {
            return None;
        }
    }
    (output.len() >= 3).then_some(output)
}

/// Intersection of the segment `p0-p1` with the infinite line `q0-q1`.
fn line_intersection(p0: &Point2, p1: &Point2, q0: &Point2, q1: &Point2) -> Option<Point2> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = cross_2d(&r, &s);
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let t = cross_2d(&(q0 - p0), &s) / denom;
    Some(p0 + r * t)
}
