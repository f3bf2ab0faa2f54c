//! Unconstrained Delaunay triangulation with gap filtering.
//!
//! Incremental Bowyer-Watson: a super-triangle encloses all input points,
//! each point is inserted by carving out the triangles whose circumcircle
//! contains it and fanning the cavity boundary to the new point, and the
//! super-triangle's remnants are dropped at the end. Output triangle
//! indices refer to the input [`PointSet`] order, so the boundary prefix
//! convention survives triangulation.
//!
//! Triangles whose centroid falls inside a gap polygon are discarded, with
//! one safeguard: when that would discard everything, the unfiltered mesh
//! is kept, so at least three non-collinear points always yield triangles.

use hashbrown::HashMap;
use nalgebra::Point2;
use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult};
use crate::types::{Mesh, PointSet, Polygon, Triangle2};

/// Triangulation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TriangulationMethod {
    /// Incremental Bowyer-Watson Delaunay triangulation.
    #[default]
    Delaunay,
}

/// Parameters for triangulation.
#[derive(Debug, Clone, Default)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TriangulateParams {
    /// Triangulation algorithm.
    pub method: TriangulationMethod,
}

impl TriangulateParams {
    /// Default parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of triangulation.
#[derive(Debug)]
pub struct TriangulateResult {
    /// The triangulated mesh. Points are the input point set unchanged.
    pub mesh: Mesh,
    /// Triangles produced before gap filtering.
    pub candidate_triangles: usize,
    /// Triangles removed because their centroid fell inside a gap.
    pub filtered_out: usize,
    /// True when gap filtering would have removed every triangle and the
    /// unfiltered set was kept instead.
    pub filter_bypassed: bool,
}

/// Triangles below this area are numerical slivers, not geometry.
const DEGENERATE_AREA: f64 = 1e-9;

/// Triangulate a point set, discarding triangles that land in gaps.
///
/// Indices in the result reference `points` in its original order. With
/// at least 3 non-collinear points the mesh is never empty: if every
/// triangle centroid lands in a gap, filtering is bypassed. Fully
/// collinear input produces a mesh with zero triangles.
///
/// # Errors
///
/// - `MeshError::InsufficientPoints` when fewer than 3 points are given.
/// - `MeshError::InvalidCoordinate` when any coordinate is NaN or infinite.
pub fn triangulate(
    points: &PointSet,
    gaps: &[Polygon],
    params: &TriangulateParams,
) -> MeshResult<TriangulateResult> {
    match params.method {
        TriangulationMethod::Delaunay => {}
    }

    let n = points.len();
    if n < 3 {
        return Err(MeshError::insufficient_points(n));
    }
    for (i, p) in points.points.iter().enumerate() {
        if !p.x.is_finite() {
            return Err(MeshError::invalid_coordinate(i, "x", p.x));
        }
        if !p.y.is_finite() {
            return Err(MeshError::invalid_coordinate(i, "y", p.y));
        }
    }

    let candidates = bowyer_watson(&points.points);
    let candidate_triangles = candidates.len();

    let (triangles, filtered_out, filter_bypassed) =
        filter_gap_triangles(candidates, &points.points, gaps);

    debug!(
        target: "glyph_mesh::delaunay",
        points = n,
        candidates = candidate_triangles,
        filtered = filtered_out,
        bypassed = filter_bypassed,
        "triangulation complete"
    );

    Ok(TriangulateResult {
        mesh: Mesh {
            points: points.points.clone(),
            triangles,
        },
        candidate_triangles,
        filtered_out,
        filter_bypassed,
    })
}

/// A working triangle with its cached circumcircle.
///
/// Degenerate triangles carry a negative radius so the containment test
/// rejects every query point.
struct TriEntry {
    v: [usize; 3],
    center: Point2<f64>,
    radius_sq: f64,
}

impl TriEntry {
    fn new(v: [usize; 3], verts: &[Point2<f64>]) -> Self {
        match circumcircle(&verts[v[0]], &verts[v[1]], &verts[v[2]]) {
            Some((center, radius_sq)) => Self {
                v,
                center,
                radius_sq,
            },
            None => Self {
                v,
                center: Point2::origin(),
                radius_sq: -1.0,
            },
        }
    }

    #[inline]
    fn circumcircle_contains(&self, p: &Point2<f64>) -> bool {
        (p - self.center).norm_squared() < self.radius_sq
    }
}

/// Circumcircle of a triangle as (center, radius squared).
/// Returns None for collinear vertices.
fn circumcircle(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
) -> Option<(Point2<f64>, f64)> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * (ab.x * ac.y - ab.y * ac.x);
    if d.abs() < 1e-12 {
        return None;
    }

    let ab_sq = ab.norm_squared();
    let ac_sq = ac.norm_squared();
    let ux = (ac.y * ab_sq - ab.y * ac_sq) / d;
    let uy = (ab.x * ac_sq - ac.x * ab_sq) / d;

    let center = Point2::new(a.x + ux, a.y + uy);
    let radius_sq = ux * ux + uy * uy;
    Some((center, radius_sq))
}

/// Incremental Bowyer-Watson over the given points.
///
/// Exact duplicate points are inserted once; later copies are skipped, so
/// out-and-back ribbon contours cannot produce degenerate cavities. The
/// returned triangles reference input indices, are free of super-triangle
/// vertices, and wind consistently with positive doubled signed area.
fn bowyer_watson(input: &[Point2<f64>]) -> Vec<[u32; 3]> {
    let n = input.len();
    let mut verts: Vec<Point2<f64>> = Vec::with_capacity(n + 3);
    verts.extend_from_slice(input);

    let mut min = verts[0];
    let mut max = verts[0];
    for p in &verts[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    let span = (max.x - min.x).max(max.y - min.y).max(1.0);
    let cx = (min.x + max.x) * 0.5;
    let cy = (min.y + max.y) * 0.5;

    verts.push(Point2::new(cx - 20.0 * span, cy - span));
    verts.push(Point2::new(cx + 20.0 * span, cy - span));
    verts.push(Point2::new(cx, cy + 20.0 * span));

    let mut tris = vec![TriEntry::new([n, n + 1, n + 2], &verts)];
    let mut inserted: HashMap<(u64, u64), usize> = HashMap::with_capacity(n);

    for pi in 0..n {
        let p = verts[pi];
        let key = (p.x.to_bits(), p.y.to_bits());
        if inserted.contains_key(&key) {
            continue;
        }
        inserted.insert(key, pi);

        // Triangles whose circumcircle swallows the new point
        let bad: Vec<usize> = tris
            .iter()
            .enumerate()
            .filter(|(_, t)| t.circumcircle_contains(&p))
            .map(|(i, _)| i)
            .collect();
        if bad.is_empty() {
            continue;
        }

        // Cavity boundary: edges used by exactly one bad triangle. The
        // edge list preserves winding order so new triangles inherit it;
        // the count map is only consulted, never iterated, keeping the
        // output independent of hash order.
        let mut edge_list: Vec<(usize, usize)> = Vec::with_capacity(bad.len() * 3);
        let mut edge_count: HashMap<(usize, usize), u32> =
            HashMap::with_capacity(bad.len() * 3);
        for &ti in &bad {
            let [a, b, c] = tris[ti].v;
            for (u, w) in [(a, b), (b, c), (c, a)] {
                let key = if u < w { (u, w) } else { (w, u) };
                *edge_count.entry(key).or_insert(0) += 1;
                edge_list.push((u, w));
            }
        }

        for &ti in bad.iter().rev() {
            tris.swap_remove(ti);
        }

        for (u, w) in edge_list {
            let key = if u < w { (u, w) } else { (w, u) };
            if edge_count.get(&key) == Some(&1) {
                tris.push(TriEntry::new([u, w, pi], &verts));
            }
        }
    }

    let mut out = Vec::with_capacity(tris.len());
    for t in &tris {
        if t.v.iter().any(|&v| v >= n) {
            continue;
        }
        let tri = Triangle2::new(verts[t.v[0]], verts[t.v[1]], verts[t.v[2]]);
        if tri.area() < DEGENERATE_AREA {
            continue;
        }
        out.push([t.v[0] as u32, t.v[1] as u32, t.v[2] as u32]);
    }
    out
}

/// Drop triangles whose centroid lies inside any gap.
///
/// Centroid membership is the whole test; a triangle straddling a gap
/// edge survives if its centroid does. Returns (kept, filtered, bypassed).
fn filter_gap_triangles(
    candidates: Vec<[u32; 3]>,
    verts: &[Point2<f64>],
    gaps: &[Polygon],
) -> (Vec<[u32; 3]>, usize, bool) {
    if gaps.is_empty() || candidates.is_empty() {
        return (candidates, 0, false);
    }

    let kept: Vec<[u32; 3]> = candidates
        .iter()
        .filter(|&&[i0, i1, i2]| {
            let centroid = Triangle2::new(
                verts[i0 as usize],
                verts[i1 as usize],
                verts[i2 as usize],
            )
            .centroid();
            !gaps.iter().any(|gap| gap.contains_point(&centroid))
        })
        .copied()
        .collect();

    if kept.is_empty() {
        warn!(
            target: "glyph_mesh::delaunay",
            candidates = candidates.len(),
            "gap filter would discard every triangle; keeping unfiltered mesh"
        );
        return (candidates, 0, true);
    }

    let filtered = candidates.len() - kept.len();
    (kept, filtered, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn point_set(coords: &[(f64, f64)]) -> PointSet {
        PointSet::from_polygon(&Polygon::from_coords(coords))
    }

    fn unit_params() -> TriangulateParams {
        TriangulateParams::new()
    }

    #[test]
    fn test_insufficient_points_is_hard_error() {
        for count in 0..3 {
            let coords: Vec<(f64, f64)> = (0..count).map(|i| (i as f64, 0.0)).collect();
            let err = triangulate(&point_set(&coords), &[], &unit_params()).unwrap_err();
            assert_eq!(err.code().as_str(), "GLYPH-2001");
        }
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let mut ps = point_set(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        ps.points[1].x = f64::NAN;
        let err = triangulate(&ps, &[], &unit_params()).unwrap_err();
        assert_eq!(err.code().as_str(), "GLYPH-2003");
    }

    #[test]
    fn test_single_triangle() {
        let ps = point_set(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)]);
        let result = triangulate(&ps, &[], &unit_params()).expect("3 points");
        assert_eq!(result.mesh.triangle_count(), 1);
        assert_eq!(result.mesh.point_count(), 3);
        assert!(approx_eq(result.mesh.total_area(), 6.0));
    }

    #[test]
    fn test_square_splits_into_two_triangles() {
        let ps = point_set(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let result = triangulate(&ps, &[], &unit_params()).expect("4 points");

        assert_eq!(result.mesh.point_count(), 4);
        assert_eq!(result.mesh.triangle_count(), 2);

        let areas = result.mesh.triangle_areas();
        assert!(approx_eq(areas[0], 50.0));
        assert!(approx_eq(areas[1], 50.0));

        for &[i0, i1, i2] in &result.mesh.triangles {
            assert!(i0 < 4 && i1 < 4 && i2 < 4);
        }
    }

    #[test]
    fn test_triangles_wind_consistently() {
        let ps = point_set(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (5.0, 5.0)]);
        let result = triangulate(&ps, &[], &unit_params()).expect("5 points");
        for tri in result.mesh.triangle_iter() {
            assert!(tri.signed_area_doubled() > 0.0);
        }
    }

    #[test]
    fn test_collinear_points_yield_empty_mesh() {
        let ps = point_set(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let result = triangulate(&ps, &[], &unit_params()).expect("count check passes");
        assert_eq!(result.mesh.triangle_count(), 0);
        assert_eq!(result.mesh.point_count(), 4);
    }

    #[test]
    fn test_duplicate_points_tolerated() {
        let ps = point_set(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (10.0, 0.0), // exact duplicate
        ]);
        let result = triangulate(&ps, &[], &unit_params()).expect("duplicates skipped");
        assert_eq!(result.mesh.point_count(), 5);
        assert_eq!(result.mesh.triangle_count(), 2);
    }

    #[test]
    fn test_delaunay_property_on_scattered_points() {
        // Deterministic scatter; no 4 points cocircular
        let coords: Vec<(f64, f64)> = (0..20)
            .map(|i| {
                let i = i as f64;
                let x = (i * 7.31).sin() * 40.0 + 50.0;
                let y = (i * 3.77).cos() * 40.0 + 50.0;
                (x, y)
            })
            .collect();
        let ps = point_set(&coords);
        let result = triangulate(&ps, &[], &unit_params()).expect("scattered points");
        assert!(result.mesh.triangle_count() > 0);

        // Empty circumcircle: no input point strictly inside any triangle's
        // circumcircle
        for &[i0, i1, i2] in &result.mesh.triangles {
            let (center, radius_sq) = circumcircle(
                &ps.points[i0 as usize],
                &ps.points[i1 as usize],
                &ps.points[i2 as usize],
            )
            .expect("mesh triangles are non-degenerate");
            for (j, p) in ps.points.iter().enumerate() {
                if j == i0 as usize || j == i1 as usize || j == i2 as usize {
                    continue;
                }
                let d = (p - center).norm_squared();
                assert!(
                    d >= radius_sq - 1e-9,
                    "point {j} inside circumcircle of [{i0}, {i1}, {i2}]"
                );
            }
        }

        // Triangulation covers exactly the convex hull
        let hull_area = Polygon::from_coords(&coords).convex_hull().area();
        assert!((result.mesh.total_area() - hull_area).abs() < 1e-6);
    }

    #[test]
    fn test_gap_filter_removes_covered_triangles() {
        let ps = point_set(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        // Gap covering the lower half of the square catches exactly one of
        // the two triangle centroids, whichever diagonal was chosen
        let gaps = [Polygon::from_coords(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (0.0, 5.0),
        ])];
        let result = triangulate(&ps, &gaps, &unit_params()).expect("4 points");

        assert_eq!(result.candidate_triangles, 2);
        assert_eq!(result.filtered_out, 1);
        assert_eq!(result.mesh.triangle_count(), 1);
        assert!(!result.filter_bypassed);
    }

    #[test]
    fn test_gap_filter_bypassed_when_everything_would_vanish() {
        let ps = point_set(&[(2.0, 2.0), (8.0, 2.0), (8.0, 8.0), (2.0, 8.0)]);
        // Gap swallowing the whole region
        let gaps = [Polygon::from_coords(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ])];
        let result = triangulate(&ps, &gaps, &unit_params()).expect("4 points");

        assert!(result.filter_bypassed);
        assert_eq!(result.filtered_out, 0);
        assert_eq!(result.mesh.triangle_count(), 2);
    }

    #[test]
    fn test_interior_point_appears_in_triangles() {
        let ps = point_set(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (5.0, 5.0)]);
        let result = triangulate(&ps, &[], &unit_params()).expect("5 points");
        // Center point fans the square into 4 triangles
        assert_eq!(result.mesh.triangle_count(), 4);
        assert!(result
            .mesh
            .triangles
            .iter()
            .any(|t| t.contains(&4)));
        assert!(approx_eq(result.mesh.total_area(), 100.0));
    }
}
