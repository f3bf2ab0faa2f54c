//! Boundary extraction from binary rasters.
//!
//! Walks the outer pixel boundary of every foreground region and returns
//! each as a closed [`Polygon`] with vertices at pixel centers. Regions are
//! 8-connected; holes inside a region are not traced here (the gap detector
//! finds enclosed background). Contours are traced clockwise in image
//! coordinates (y down), which makes [`Polygon::signed_area`] positive for
//! outer boundaries.

use hashbrown::HashSet;
use nalgebra::Point2;
use tracing::debug;

use crate::raster::Raster;
use crate::simplify::simplify_polygon;
use crate::types::Polygon;

/// Contour tracing algorithms.
///
/// A closed enum rather than a free-form method name, so unsupported
/// algorithms fail at compile time instead of at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ContourMethod {
    /// Moore neighbor tracing around each 8-connected region.
    #[default]
    BorderFollowing,
}

/// Parameters for boundary extraction.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ContourParams {
    /// Tracing algorithm.
    pub method: ContourMethod,
    /// Simplify each contour after tracing.
    pub simplify: bool,
    /// Douglas-Peucker tolerance in pixels, used when `simplify` is set.
    pub epsilon: f64,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            method: ContourMethod::BorderFollowing,
            simplify: true,
            epsilon: 2.0,
        }
    }
}

impl ContourParams {
    /// Default parameters: trace and simplify with a 2 px tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trace only, keeping every boundary pixel as a vertex.
    pub fn raw() -> Self {
        Self {
            simplify: false,
            ..Self::default()
        }
    }

    /// Trace and simplify with the given tolerance.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            simplify: true,
            epsilon,
            ..Self::default()
        }
    }
}

/// Contours below this vertex count cannot enclose area and are dropped.
const MIN_CONTOUR_POINTS: usize = 3;

/// Neighbor offsets in clockwise order (image coordinates, y down),
/// starting west.
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn neighbor_index(dx: i32, dy: i32) -> usize {
    NEIGHBORS
        .iter()
        .position(|&(x, y)| x == dx && y == dy)
        .unwrap_or(0)
}

/// Extract the outer boundary of every foreground region.
///
/// Regions are discovered in row-major scan order, so the returned list is
/// ordered top-to-bottom, left-to-right by each region's first pixel.
/// Contours with fewer than 3 boundary pixels are discarded. When
/// `params.simplify` is set, each contour is reduced with Douglas-Peucker
/// at `params.epsilon` after tracing.
pub fn extract_contours(raster: &Raster, params: &ContourParams) -> Vec<Polygon> {
    match params.method {
        ContourMethod::BorderFollowing => {}
    }

    let (width, height) = raster.dimensions();
    let mut labeled = vec![false; width * height];
    let mut contours = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if !raster.get(x, y) || labeled[y * width + x] {
                continue;
            }

            let pixels = trace_boundary(raster, x as i32, y as i32);
            label_region(raster, x, y, &mut labeled);

            if pixels.len() < MIN_CONTOUR_POINTS {
                continue;
            }

            let polygon = Polygon::new(
                pixels
                    .into_iter()
                    .map(|(px, py)| Point2::new(px as f64, py as f64))
                    .collect(),
            );

            let polygon = if params.simplify {
                simplify_polygon(&polygon, params.epsilon)
            } else {
                polygon
            };

            contours.push(polygon);
        }
    }

    debug!(
        target: "glyph_mesh::contour",
        regions = contours.len(),
        simplified = params.simplify,
        "extracted contours"
    );

    contours
}

/// Extract the contour with the most vertices.
///
/// Selection is by vertex count, not enclosed area; for glyph rasters the
/// character outline is the most detailed contour even when a speckle
/// region covers comparable area. The first contour in scan order wins
/// ties. Returns None when no region survives extraction.
pub fn extract_largest(raster: &Raster, params: &ContourParams) -> Option<Polygon> {
    let contours = extract_contours(raster, params);

    let mut best: Option<Polygon> = None;
    for contour in contours {
        let better = match &best {
            Some(current) => contour.len() > current.len(),
            None => true,
        };
        if better {
            best = Some(contour);
        }
    }
    best
}

/// Resample a closed contour to exactly `num_points` vertices spaced
/// uniformly by arc length.
///
/// The first vertex is kept as the starting anchor. Contours with fewer
/// than 3 vertices, zero perimeter, or a target below 3 are returned
/// unchanged.
pub fn resample(polygon: &Polygon, num_points: usize) -> Polygon {
    let n = polygon.len();
    if n < 3 || num_points < 3 {
        return polygon.clone();
    }

    // Cumulative arc length around the closed loop, closing edge included
    let mut arc = Vec::with_capacity(n + 1);
    arc.push(0.0);
    let mut total = 0.0;
    for i in 0..n {
        let a = &polygon.points[i];
        let b = &polygon.points[(i + 1) % n];
        total += (b - a).norm();
        arc.push(total);
    }

    if total <= f64::EPSILON {
        return polygon.clone();
    }

    let step = total / num_points as f64;
    let mut out = Vec::with_capacity(num_points);
    let mut seg = 0usize;

    for k in 0..num_points {
        let t = k as f64 * step;
        while seg < n - 1 && arc[seg + 1] < t {
            seg += 1;
        }
        let a = &polygon.points[seg];
        let b = &polygon.points[(seg + 1) % n];
        let seg_len = arc[seg + 1] - arc[seg];
        let frac = if seg_len > 0.0 {
            (t - arc[seg]) / seg_len
        } else {
            0.0
        };
        out.push(Point2::new(
            a.x + (b.x - a.x) * frac,
            a.y + (b.y - a.y) * frac,
        ));
    }

    Polygon::new(out)
}

/// Moore neighbor tracing from a region's scan-order start pixel.
///
/// The start pixel is the region's topmost-leftmost pixel, so its west
/// neighbor is guaranteed background and serves as the initial backtrack.
/// The walk stops when it re-enters the start pixel with the initial
/// backtrack, or when any (pixel, backtrack) state repeats; the repeat
/// guard is what terminates single-pixel-wide appendages that never
/// reproduce the initial backtrack.
fn trace_boundary(raster: &Raster, start_x: i32, start_y: i32) -> Vec<(i32, i32)> {
    let start = (start_x, start_y);
    let mut contour = vec![start];

    let mut current = start;
    let mut b_dir = 0usize; // backtrack direction: NEIGHBORS[b_dir] relative to current
    let mut seen: HashSet<((i32, i32), usize)> = HashSet::new();
    seen.insert((current, b_dir));

    loop {
        let mut found = None;
        for k in 1..=8 {
            let dir = (b_dir + k) % 8;
            let (dx, dy) = NEIGHBORS[dir];
            let (nx, ny) = (current.0 + dx, current.1 + dy);
            if raster.is_foreground(nx, ny) {
                found = Some((dir, (nx, ny)));
                break;
            }
        }

        // Isolated pixel: no foreground neighbor at all
        let Some((dir, next)) = found else {
            break;
        };

        // The neighbor probed just before the hit becomes the new backtrack
        let prev_dir = (dir + 7) % 8;
        let prev_abs = (
            current.0 + NEIGHBORS[prev_dir].0,
            current.1 + NEIGHBORS[prev_dir].1,
        );

        current = next;
        b_dir = neighbor_index(prev_abs.0 - current.0, prev_abs.1 - current.1);

        if current == start && b_dir == 0 {
            break;
        }
        if !seen.insert((current, b_dir)) {
            break;
        }
        contour.push(current);
    }

    // A walk cut off by the repeat guard can end where it began
    if contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }

    contour
}

/// Mark every pixel of the 8-connected region containing (x, y).
fn label_region(raster: &Raster, x: usize, y: usize, labeled: &mut [bool]) {
    let width = raster.width();
    let mut stack = vec![(x as i32, y as i32)];
    labeled[y * width + x] = true;

    while let Some((cx, cy)) = stack.pop() {
        for &(dx, dy) in &NEIGHBORS {
            let (nx, ny) = (cx + dx, cy + dy);
            if !raster.is_foreground(nx, ny) {
                continue;
            }
            let idx = ny as usize * width + nx as usize;
            if !labeled[idx] {
                labeled[idx] = true;
                stack.push((nx, ny));
            }
        }
    }
}
