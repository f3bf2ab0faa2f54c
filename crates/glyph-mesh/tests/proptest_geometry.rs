//! Property-based tests for the 2D geometry kernel.
//!
//! These tests use proptest to generate random point clouds and polygons
//! and verify the invariants each pipeline stage maintains.
//!
//! Run with: cargo test -p glyph-mesh -- proptest

use glyph_mesh::{
    MembershipOracle, PointSet, Polygon, PolygonOracle, RefineParams, SampleParams,
    TriangulateParams, refine_mesh, resample, sample_interior, simplify_polygon,
    subdivide_boundary, triangulate,
};
use nalgebra::Point2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

// =============================================================================
// Strategies for generating random geometry
// =============================================================================

/// Generate a coordinate pair inside a 100x100 box.
fn arb_coord() -> impl Strategy<Value = (f64, f64)> {
    (0.0..100.0f64, 0.0..100.0f64)
}

/// Generate a point cloud with between `min_len` and `max_len` points.
fn arb_coords(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec(arb_coord(), min_len..=max_len)
}

/// Generate a closed polygon. The ring may self-intersect; the stages
/// under test must tolerate that.
fn arb_polygon(max_len: usize) -> impl Strategy<Value = Polygon> {
    arb_coords(3, max_len).prop_map(|coords| Polygon::from_coords(&coords))
}

/// Build a point set from a cloud: the cloud's convex hull becomes the
/// boundary, every other point becomes an interior point. Returns `None`
/// when the cloud is too degenerate to have a proper hull.
fn point_set_from_cloud(coords: &[(f64, f64)]) -> Option<PointSet> {
    let hull = Polygon::from_coords(coords).convex_hull();
    if hull.len() < 3 {
        return None;
    }
    let mut set = PointSet::from_polygon(&hull);
    for &(x, y) in coords {
        let p = Point2::new(x, y);
        if !hull.points.contains(&p) {
            set.push_interior(p);
        }
    }
    Some(set)
}

// =============================================================================
// Property Tests: Simplification
// =============================================================================

proptest! {
    /// Simplification never adds vertices and never collapses a valid ring.
    #[test]
    fn proptest_simplify_never_grows_and_never_collapses(
        poly in arb_polygon(32),
        epsilon in 0.0..15.0f64,
    ) {
        let simplified = simplify_polygon(&poly, epsilon);
        prop_assert!(simplified.len() <= poly.len());
        prop_assert!(simplified.len() >= 3);
    }

    /// The first vertex anchors the ring and survives simplification.
    #[test]
    fn proptest_simplify_keeps_the_anchor(poly in arb_polygon(32), epsilon in 0.0..15.0f64) {
        let simplified = simplify_polygon(&poly, epsilon);
        prop_assert_eq!(simplified.points[0], poly.points[0]);
    }

    /// Every output vertex comes from the input, in input order.
    #[test]
    fn proptest_simplify_outputs_a_subsequence(poly in arb_polygon(32), epsilon in 0.0..15.0f64) {
        let simplified = simplify_polygon(&poly, epsilon);
        let mut cursor = 0usize;
        for p in &simplified.points {
            let found = poly.points[cursor..].iter().position(|q| q == p);
            prop_assert!(found.is_some(), "vertex {:?} is not in input order", p);
            cursor += found.unwrap() + 1;
        }
    }

    /// Simplification is a pure function of its inputs.
    #[test]
    fn proptest_simplify_is_deterministic(poly in arb_polygon(32), epsilon in 0.0..15.0f64) {
        let a = simplify_polygon(&poly, epsilon);
        let b = simplify_polygon(&poly, epsilon);
        prop_assert_eq!(a.points, b.points);
    }
}

// =============================================================================
// Property Tests: Convex Hull
// =============================================================================

proptest! {
    /// The hull of any cloud is convex.
    #[test]
    fn proptest_hull_is_convex(coords in arb_coords(1, 40)) {
        let hull = Polygon::from_coords(&coords).convex_hull();
        if hull.len() >= 3 {
            prop_assert!(hull.is_convex());
        }
    }

    /// No input point falls outside the hull.
    #[test]
    fn proptest_hull_contains_the_cloud(coords in arb_coords(1, 40)) {
        let poly = Polygon::from_coords(&coords);
        let hull = poly.convex_hull();
        if hull.len() < 3 {
            return Ok(());
        }
        let orient = hull.signed_area().signum();
        for p in &poly.points {
            for i in 0..hull.len() {
                let a = &hull.points[i];
                let b = &hull.points[(i + 1) % hull.len()];
                let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
                prop_assert!(
                    orient * cross >= -1e-6,
                    "point {:?} lies outside hull edge {}",
                    p,
                    i
                );
            }
        }
    }
}

// =============================================================================
// Property Tests: Triangulation
// =============================================================================

proptest! {
    /// Triangle indices always reference real points.
    #[test]
    fn proptest_triangulation_indices_in_range(coords in arb_coords(3, 32)) {
        let Some(points) = point_set_from_cloud(&coords) else { return Ok(()); };
        let result = triangulate(&points, &[], &TriangulateParams::new()).unwrap();
        let n = result.mesh.point_count() as u32;
        for tri in &result.mesh.triangles {
            for &idx in tri {
                prop_assert!(idx < n);
            }
        }
    }

    /// Every emitted triangle winds the same way.
    #[test]
    fn proptest_triangulation_winds_positive(coords in arb_coords(3, 32)) {
        let Some(points) = point_set_from_cloud(&coords) else { return Ok(()); };
        let result = triangulate(&points, &[], &TriangulateParams::new()).unwrap();
        for tri in result.mesh.triangle_iter() {
            prop_assert!(tri.signed_area_doubled() > 0.0);
        }
    }

    /// An unconstrained triangulation tiles the convex hull of its points:
    /// the triangle areas sum to the hull area.
    #[test]
    fn proptest_triangulation_tiles_the_hull(coords in arb_coords(3, 32)) {
        let Some(points) = point_set_from_cloud(&coords) else { return Ok(()); };
        let hull_area = Polygon::from_coords(&coords).convex_hull().area();
        let result = triangulate(&points, &[], &TriangulateParams::new()).unwrap();
        let total = result.mesh.total_area();
        prop_assert!(
            (total - hull_area).abs() <= 1e-6 * (1.0 + hull_area),
            "triangulated area {} differs from hull area {}",
            total,
            hull_area
        );
    }

    /// The same input always produces the same mesh.
    #[test]
    fn proptest_triangulation_is_deterministic(coords in arb_coords(3, 32)) {
        let Some(points) = point_set_from_cloud(&coords) else { return Ok(()); };
        let a = triangulate(&points, &[], &TriangulateParams::new()).unwrap();
        let b = triangulate(&points, &[], &TriangulateParams::new()).unwrap();
        prop_assert_eq!(&a.mesh.points, &b.mesh.points);
        prop_assert_eq!(&a.mesh.triangles, &b.mesh.triangles);
    }
}

// =============================================================================
// Property Tests: Interior Sampling
// =============================================================================

proptest! {
    /// Accepted points satisfy the oracle; the boundary passes through
    /// untouched.
    #[test]
    fn proptest_samples_satisfy_the_oracle(
        coords in arb_coords(3, 24),
        seed in any::<u64>(),
    ) {
        let hull = Polygon::from_coords(&coords).convex_hull();
        if hull.len() < 3 {
            return Ok(());
        }
        let oracle = PolygonOracle::new(&hull, &[]);
        let params = SampleParams::new(40);
        let mut rng = StdRng::seed_from_u64(seed);
        let result = sample_interior(&hull, &oracle, &params, &mut rng);

        prop_assert_eq!(result.points.boundary(), hull.points.as_slice());
        prop_assert_eq!(result.accepted, result.points.interior().len());
        for p in result.points.interior() {
            prop_assert!(oracle.contains(p));
        }
    }

    /// Exhaustion is flagged exactly when the target count is missed.
    #[test]
    fn proptest_exhaustion_matches_the_shortfall(
        coords in arb_coords(3, 24),
        seed in any::<u64>(),
        target in 0usize..60,
    ) {
        let hull = Polygon::from_coords(&coords).convex_hull();
        if hull.len() < 3 {
            return Ok(());
        }
        let oracle = PolygonOracle::new(&hull, &[]);
        let params = SampleParams::new(target);
        let mut rng = StdRng::seed_from_u64(seed);
        let result = sample_interior(&hull, &oracle, &params, &mut rng);

        prop_assert_eq!(result.exhausted, result.accepted < target);
        prop_assert!(result.accepted <= target);
    }
}

// =============================================================================
// Property Tests: Refinement
// =============================================================================

proptest! {
    /// Splitting redistributes area; the totals match and the counts add up.
    #[test]
    fn proptest_refine_preserves_total_area(
        coords in arb_coords(3, 24),
        max_area in 1.0..200.0f64,
    ) {
        let Some(points) = point_set_from_cloud(&coords) else { return Ok(()); };
        let base = triangulate(&points, &[], &TriangulateParams::new()).unwrap();
        let refined = refine_mesh(&base.mesh, &RefineParams { max_area }).unwrap();

        let tolerance = 1e-6 * (1.0 + base.mesh.total_area());
        prop_assert!((refined.mesh.total_area() - base.mesh.total_area()).abs() <= tolerance);
        prop_assert_eq!(
            refined.mesh.triangle_count(),
            base.mesh.triangle_count() + 2 * refined.triangles_split
        );
        prop_assert_eq!(
            refined.mesh.point_count(),
            base.mesh.point_count() + refined.points_added
        );
        prop_assert_eq!(refined.points_added, refined.triangles_split);
    }

    /// Centroid splitting keeps the parent winding.
    #[test]
    fn proptest_refine_keeps_winding(
        coords in arb_coords(3, 24),
        max_area in 1.0..200.0f64,
    ) {
        let Some(points) = point_set_from_cloud(&coords) else { return Ok(()); };
        let base = triangulate(&points, &[], &TriangulateParams::new()).unwrap();
        let refined = refine_mesh(&base.mesh, &RefineParams { max_area }).unwrap();
        for tri in refined.mesh.triangle_iter() {
            prop_assert!(tri.signed_area_doubled() > 0.0);
        }
    }
}

// =============================================================================
// Property Tests: Boundary Densification
// =============================================================================

proptest! {
    /// Subdividing multiplies the vertex count by the factor.
    #[test]
    fn proptest_subdivide_multiplies_vertices(poly in arb_polygon(16), factor in 1u32..6) {
        let dense = subdivide_boundary(&poly, factor);
        prop_assert_eq!(dense.len(), poly.len() * factor as usize);
    }

    /// Inserted vertices are collinear with their edge, so the enclosed
    /// area does not change.
    #[test]
    fn proptest_subdivide_preserves_area(poly in arb_polygon(16), factor in 1u32..6) {
        let dense = subdivide_boundary(&poly, factor);
        let tolerance = 1e-6 * (1.0 + poly.signed_area().abs());
        prop_assert!((dense.signed_area() - poly.signed_area()).abs() <= tolerance);
    }

    /// The original vertices stay in place, spaced `factor` apart.
    #[test]
    fn proptest_subdivide_keeps_original_vertices(poly in arb_polygon(16), factor in 1u32..6) {
        let dense = subdivide_boundary(&poly, factor);
        for (i, p) in poly.points.iter().enumerate() {
            prop_assert_eq!(&dense.points[i * factor as usize], p);
        }
    }

    /// Resampling hits the requested vertex count exactly and anchors at
    /// the first vertex.
    #[test]
    fn proptest_resample_hits_the_target(poly in arb_polygon(16), target in 3usize..64) {
        if poly.perimeter() <= f64::EPSILON {
            return Ok(());
        }
        let resampled = resample(&poly, target);
        prop_assert_eq!(resampled.len(), target);
        prop_assert_eq!(resampled.points[0], poly.points[0]);
    }
}
