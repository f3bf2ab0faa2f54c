//! Polygon simplification by Douglas-Peucker reduction.
//!
//! Removes vertices whose removal displaces the boundary by at most a
//! caller-chosen tolerance. Closed polygons are handled by walking the ring
//! as an open polyline whose shared endpoint is the first vertex, so the
//! first vertex always survives as an anchor.

use nalgebra::Point2;
use tracing::debug;

use crate::types::Polygon;

/// Simplify a closed polygon with the Douglas-Peucker algorithm.
///
/// Vertices farther than `epsilon` from the chord between surviving
/// neighbors are kept; the rest are dropped. An `epsilon` of zero removes
/// only exactly-collinear vertices. Output vertices are a subset of the
/// input in the original order, starting at the same first vertex.
///
/// Polygons with fewer than 3 vertices are returned unchanged: there is
/// nothing meaningful to reduce, and degenerate inputs pass through
/// rather than fail. The output is never reduced below 3 vertices either:
/// a tolerance large enough to collapse the ring returns the input
/// unchanged, so a valid polygon stays a valid polygon.
pub fn simplify_polygon(polygon: &Polygon, epsilon: f64) -> Polygon {
    let n = polygon.len();
    if n < 3 {
        return polygon.clone();
    }

    // Close the ring explicitly; the duplicate endpoint anchors both ends
    let mut ring: Vec<Point2<f64>> = Vec::with_capacity(n + 1);
    ring.extend_from_slice(&polygon.points);
    ring.push(polygon.points[0]);

    let keep = douglas_peucker_mask(&ring, epsilon);

    let kept = keep.iter().take(n).filter(|&&k| k).count();
    if kept < 3 {
        debug!(
            target: "glyph_mesh::simplify",
            input = n,
            epsilon,
            "tolerance would collapse the polygon; keeping input"
        );
        return polygon.clone();
    }

    let mut out = Vec::new();
    for (i, point) in ring.iter().enumerate().take(n) {
        if keep[i] {
            out.push(*point);
        }
    }

    debug!(
        target: "glyph_mesh::simplify",
        input = n,
        output = out.len(),
        epsilon,
        "simplified polygon"
    );

    Polygon::new(out)
}

/// Compute the Douglas-Peucker keep mask for an open polyline.
///
/// Iterative with an explicit span stack; recursion depth on raw raster
/// contours can reach the vertex count.
fn douglas_peucker_mask(points: &[Point2<f64>], epsilon: f64) -> Vec<bool> {
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut spans = vec![(0usize, last)];
    while let Some((lo, hi)) = spans.pop() {
        if hi <= lo + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = lo;
        for i in (lo + 1)..hi {
            let d = perpendicular_distance(&points[i], &points[lo], &points[hi]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > epsilon {
            keep[max_idx] = true;
            spans.push((lo, max_idx));
            spans.push((max_idx, hi));
        }
    }

    keep
}

/// Distance from `p` to the line through `a` and `b`.
///
/// Falls back to point distance when the chord is degenerate, which
/// happens for the closing span of a ring whose endpoints coincide.
fn perpendicular_distance(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return (p - a).norm();
    }
    (dy * (p.x - a.x) - dx * (p.y - a.y)).abs() / len_sq.sqrt()
}
