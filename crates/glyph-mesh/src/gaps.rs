//! Gap detection: background regions the mesh must not cover.
//!
//! A glyph's "gaps" are both its fully enclosed holes (the bowl of an `o`)
//! and its concave openings (the mouth of a `C`). Both kinds emerge from
//! one construction: fill the convex hull of the outer boundary, and every
//! background pixel left inside the hull belongs to a gap. Tracing the
//! resulting mask with the contour extractor yields one polygon per gap,
//! holes and openings alike.

use tracing::debug;

use crate::contour::{ContourParams, extract_contours};
use crate::raster::Raster;
use crate::types::Polygon;

/// Parameters for gap detection.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GapParams {
    /// Simplify each gap polygon after tracing.
    pub simplify: bool,
    /// Douglas-Peucker tolerance in pixels, used when `simplify` is set.
    pub epsilon: f64,
}

impl Default for GapParams {
    fn default() -> Self {
        Self {
            simplify: true,
            epsilon: 2.0,
        }
    }
}

impl GapParams {
    /// Default parameters: simplify gaps with a 2 px tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep every traced gap pixel as a vertex.
    pub fn raw() -> Self {
        Self {
            simplify: false,
            ..Self::default()
        }
    }

    /// Simplify gaps with the given tolerance, matching whatever tolerance
    /// the outer boundary was simplified with.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            simplify: true,
            epsilon,
        }
    }
}

/// Detect gaps: background regions inside the convex hull of the outer
/// boundary.
///
/// Returns one polygon per gap in raster scan order. A convex glyph with
/// no enclosed background produces an empty list. Gaps that touch the hull
/// edge (concave openings) are reported the same as fully enclosed holes.
/// Degenerate inputs, an outer polygon with fewer than 3 vertices or a
/// raster with no foreground, produce an empty list.
pub fn detect_gaps(outer: &Polygon, raster: &Raster, params: &GapParams) -> Vec<Polygon> {
    if outer.len() < 3 || raster.is_empty() {
        return Vec::new();
    }

    let hull = outer.convex_hull();
    if hull.len() < 3 {
        return Vec::new();
    }

    let mask = gap_mask(&hull, raster);
    let gap_pixels = mask.foreground_count();
    if gap_pixels == 0 {
        debug!(target: "glyph_mesh::gaps", "no background inside hull");
        return Vec::new();
    }

    let trace_params = ContourParams {
        simplify: params.simplify,
        epsilon: params.epsilon,
        ..ContourParams::default()
    };
    let gaps = extract_contours(&mask, &trace_params);

    debug!(
        target: "glyph_mesh::gaps",
        gap_pixels,
        gaps = gaps.len(),
        hull_vertices = hull.len(),
        "detected gaps"
    );

    gaps
}

/// Build the mask of background pixels whose centers lie inside the hull.
///
/// The hull is filled by even-odd scanline: for each pixel row, edge
/// crossings with the row's center line are collected with a half-open
/// vertex rule and paired left-to-right. Pixel centers on the hull edge
/// count as inside.
fn gap_mask(hull: &Polygon, raster: &Raster) -> Raster {
    let (width, height) = raster.dimensions();
    let mut mask = Raster::blank(width, height);

    let Some(bbox) = hull.bounding_box() else {
        return mask;
    };

    let y_start = bbox.min.y.ceil().max(0.0) as usize;
    let y_end = bbox.max.y.floor().min(height.saturating_sub(1) as f64) as usize;

    let pts = &hull.points;
    let n = pts.len();
    let mut crossings: Vec<f64> = Vec::with_capacity(8);

    for y in y_start..=y_end {
        let scan_y = y as f64;
        crossings.clear();

        for i in 0..n {
            let a = &pts[i];
            let b = &pts[(i + 1) % n];
            // Half-open rule: each vertex belongs to exactly one of its edges
            let crosses = (a.y <= scan_y && scan_y < b.y) || (b.y <= scan_y && scan_y < a.y);
            if crosses {
                let t = (scan_y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }

        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for pair in crossings.chunks_exact(2) {
            let x_start = pair[0].ceil().max(0.0) as usize;
            let x_end = pair[1].floor().min(width.saturating_sub(1) as f64) as usize;
            for x in x_start..=x_end {
                if !raster.get(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::extract_largest;

    fn raster_from_rows(rows: &[&str]) -> Raster {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut bits = Vec::with_capacity(width * height);
        for row in rows {
            for ch in row.chars() {
                bits.push(ch == '#');
            }
        }
        Raster::from_bits(width, height, bits).expect("consistent fixture rows")
    }

    fn outer_of(raster: &Raster) -> Polygon {
        extract_largest(raster, &ContourParams::raw()).expect("fixture has a region")
    }

    #[test]
    fn test_convex_blob_has_no_gaps() {
        let raster = raster_from_rows(&["######", "######", "######", "######"]);
        let outer = outer_of(&raster);
        assert!(detect_gaps(&outer, &raster, &GapParams::raw()).is_empty());
    }

    #[test]
    fn test_ring_yields_exactly_one_gap() {
        let raster = raster_from_rows(&[
            "#######",
            "#.....#",
            "#.....#",
            "#.....#",
            "#.....#",
            "#.....#",
            "#######",
        ]);
        let outer = outer_of(&raster);
        let gaps = detect_gaps(&outer, &raster, &GapParams::raw());
        assert_eq!(gaps.len(), 1);

        // The hole sits strictly inside the outer bounding box
        let outer_bbox = outer.bounding_box().expect("outer has points");
        let gap_bbox = gaps[0].bounding_box().expect("gap has points");
        assert!(outer_bbox.contains_box_strict(&gap_bbox));
    }

    #[test]
    fn test_concave_opening_is_a_gap() {
        // C shape: the mouth opens to the right and touches the hull edge
        let raster = raster_from_rows(&[
            "#####",
            "#....",
            "#....",
            "#####",
        ]);
        let outer = outer_of(&raster);
        let gaps = detect_gaps(&outer, &raster, &GapParams::raw());
        assert_eq!(gaps.len(), 1);
        assert!(gaps[0].points.iter().any(|p| p.x == 4.0));
    }

    #[test]
    fn test_two_holes_in_scan_order() {
        let raster = raster_from_rows(&[
            "#######",
            "#..#..#",
            "#..#..#",
            "#######",
        ]);
        let outer = outer_of(&raster);
        let gaps = detect_gaps(&outer, &raster, &GapParams::raw());
        assert_eq!(gaps.len(), 2);
        assert!(gaps[0].points[0].x < gaps[1].points[0].x);
    }

    #[test]
    fn test_tiny_gap_discarded() {
        // Single-pixel hole traces to one point and is dropped
        let raster = raster_from_rows(&["###", "#.#", "###"]);
        let outer = outer_of(&raster);
        assert!(detect_gaps(&outer, &raster, &GapParams::raw()).is_empty());
    }

    #[test]
    fn test_degenerate_inputs_yield_no_gaps() {
        let raster = raster_from_rows(&["###", "#.#", "###"]);
        let line = Polygon::from_coords(&[(0.0, 0.0), (2.0, 0.0)]);
        assert!(detect_gaps(&line, &raster, &GapParams::raw()).is_empty());

        let blank = Raster::blank(4, 4);
        let square = Polygon::from_coords(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)]);
        assert!(detect_gaps(&square, &blank, &GapParams::raw()).is_empty());
    }

    #[test]
    fn test_gap_simplification() {
        let raster = raster_from_rows(&[
            "########",
            "#......#",
            "#......#",
            "#......#",
            "#......#",
            "#......#",
            "#......#",
            "########",
        ]);
        let outer = outer_of(&raster);
        let raw = detect_gaps(&outer, &raster, &GapParams::raw());
        let simplified = detect_gaps(&outer, &raster, &GapParams::with_epsilon(2.0));
        assert_eq!(raw.len(), 1);
        assert_eq!(simplified.len(), 1);
        // The 6x6 hole's 20 boundary pixels reduce to the 4 corners
        assert_eq!(raw[0].len(), 20);
        assert_eq!(simplified[0].len(), 4);
    }
}
