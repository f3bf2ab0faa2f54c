//! Core geometry data types.

use hashbrown::HashSet;
use nalgebra::Point2;

/// An axis-aligned bounding box in glyph pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point2<f64>,
    /// Maximum corner.
    pub max: Point2<f64>,
}

impl BoundingBox {
    /// Create a bounding box from explicit corners.
    #[inline]
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Compute the bounding box of a point slice.
    /// Returns None for an empty slice.
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;

        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some(Self { min, max })
    }

    /// Width of the box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Check whether a point lies inside the box (boundary inclusive).
    #[inline]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Check whether another box lies entirely inside this one (boundary exclusive).
    pub fn contains_box_strict(&self, other: &BoundingBox) -> bool {
        other.min.x > self.min.x
            && other.min.y > self.min.y
            && other.max.x < self.max.x
            && other.max.y < self.max.y
    }
}

/// A closed polygon in glyph pixel space.
///
/// Vertices are ordered along the boundary; the closing edge from the last
/// vertex back to the first is implicit and never stored. Coordinates follow
/// raster convention: x grows rightward, y grows downward, one unit per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Ordered boundary vertices.
    pub points: Vec<Point2<f64>>,
}

impl Polygon {
    /// Create a polygon from an ordered vertex list.
    #[inline]
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    /// Create a polygon from raw coordinate pairs.
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self {
            points: coords.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polygon has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns None if the polygon has no vertices.
    #[inline]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Signed area via the shoelace formula.
    ///
    /// Positive when vertices wind counter-clockwise in a y-up frame, which
    /// is clockwise on screen for raster (y-down) coordinates.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut sum = 0.0;
        for i in 0..n {
            let a = &self.points[i];
            let b = &self.points[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum * 0.5
    }

    /// Absolute enclosed area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Total boundary length, including the implicit closing edge.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }

        let mut sum = 0.0;
        for i in 0..n {
            let a = &self.points[i];
            let b = &self.points[(i + 1) % n];
            sum += (b - a).norm();
        }
        sum
    }

    /// Vertex centroid (mean of the boundary points).
    /// Returns None if the polygon has no vertices.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.points.is_empty() {
            return None;
        }

        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point2::new(sx / n, sy / n))
    }

    /// Even-odd point-in-polygon test.
    ///
    /// Casts a ray in +x and counts edge crossings. Points exactly on an
    /// edge may land on either side; callers needing exact boundary
    /// handling should not rely on this predicate for them.
    pub fn contains_point(&self, p: &Point2<f64>) -> bool {
        let pts = &self.points;
        let n = pts.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = &pts[i];
            let pj = &pts[j];
            if (pi.y > p.y) != (pj.y > p.y) {
                let x_cross = pi.x + (p.y - pi.y) / (pj.y - pi.y) * (pj.x - pi.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Convex hull of the vertices by Andrew's monotone chain.
    ///
    /// The hull is strictly convex: collinear boundary points are dropped.
    /// Polygons with fewer than 3 vertices hull to a copy of themselves.
    pub fn convex_hull(&self) -> Polygon {
        if self.points.len() < 3 {
            return self.clone();
        }

        let mut pts = self.points.clone();
        pts.sort_by(|a, b| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
        });
        pts.dedup_by(|a, b| a.x == b.x && a.y == b.y);

        if pts.len() < 3 {
            return Polygon::new(pts);
        }

        fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
            (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
        }

        let mut hull: Vec<Point2<f64>> = Vec::with_capacity(pts.len() * 2);

        // Lower hull
        for p in &pts {
            while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
                hull.pop();
            }
            hull.push(*p);
        }

        // Upper hull; the last sorted point already ends the lower chain
        let lower_len = hull.len() + 1;
        for p in pts.iter().rev().skip(1) {
            while hull.len() >= lower_len
                && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(*p);
        }

        // Last point repeats the first
        hull.pop();
        Polygon::new(hull)
    }

    /// Check whether the polygon is convex (within a small tolerance).
    ///
    /// Collinear runs are allowed. Polygons with fewer than 4 vertices are
    /// trivially convex.
    pub fn is_convex(&self) -> bool {
        let pts = &self.points;
        let n = pts.len();
        if n < 4 {
            return true;
        }

        let mut sign = 0.0_f64;
        for i in 0..n {
            let a = &pts[i];
            let b = &pts[(i + 1) % n];
            let c = &pts[(i + 2) % n];
            let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
            if cross.abs() < 1e-12 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}

/// The vertex set handed to triangulation: boundary vertices first, then
/// sampled interior points.
///
/// The boundary prefix preserves the polygon's vertex order, so index `i`
/// of the original boundary is index `i` here. Interior points follow in
/// acceptance order.
#[derive(Debug, Clone)]
pub struct PointSet {
    /// All points: `points[..boundary_len]` are the boundary,
    /// `points[boundary_len..]` are interior.
    pub points: Vec<Point2<f64>>,
    /// Length of the boundary prefix.
    pub boundary_len: usize,
}

impl PointSet {
    /// Create a point set holding only a polygon's boundary.
    pub fn from_polygon(polygon: &Polygon) -> Self {
        Self {
            points: polygon.points.clone(),
            boundary_len: polygon.points.len(),
        }
    }

    /// Total number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The boundary prefix.
    #[inline]
    pub fn boundary(&self) -> &[Point2<f64>] {
        &self.points[..self.boundary_len]
    }

    /// The interior suffix.
    #[inline]
    pub fn interior(&self) -> &[Point2<f64>] {
        &self.points[self.boundary_len..]
    }

    /// Append an interior point.
    #[inline]
    pub fn push_interior(&mut self, p: Point2<f64>) {
        self.points.push(p);
    }
}

/// A 2-D triangle mesh with indexed points.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Point data.
    pub points: Vec<Point2<f64>>,

    /// Triangles as indices into the point array.
    /// Triangulation emits these with a consistent positive winding.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(point_count: usize, triangle_count: usize) -> Self {
        Self {
            points: Vec::with_capacity(point_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Number of points in the mesh.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of triangles in the mesh.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if mesh is empty (no points or triangles).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.triangles.is_empty()
    }

    /// Compute the axis-aligned bounding box of the points.
    /// Returns None if the mesh has no points.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Iterate over triangles, yielding Triangle2 structs with actual coordinates.
    pub fn triangle_iter(&self) -> impl Iterator<Item = Triangle2> + '_ {
        self.triangles.iter().map(|&[i0, i1, i2]| Triangle2 {
            a: self.points[i0 as usize],
            b: self.points[i1 as usize],
            c: self.points[i2 as usize],
        })
    }

    /// Get a specific triangle by index.
    pub fn triangle(&self, idx: usize) -> Option<Triangle2> {
        self.triangles.get(idx).map(|&[i0, i1, i2]| Triangle2 {
            a: self.points[i0 as usize],
            b: self.points[i1 as usize],
            c: self.points[i2 as usize],
        })
    }

    /// Unique undirected edges as sorted index pairs, in first-seen order.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut seen = HashSet::with_capacity(self.triangles.len() * 3);
        let mut edges = Vec::with_capacity(self.triangles.len() * 3);

        for &[i0, i1, i2] in &self.triangles {
            for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    edges.push(key);
                }
            }
        }
        edges
    }

    /// Per-triangle areas, index-aligned with `triangles`.
    pub fn triangle_areas(&self) -> Vec<f64> {
        self.triangle_iter().map(|t| t.area()).collect()
    }

    /// Total area covered by all triangles.
    pub fn total_area(&self) -> f64 {
        self.triangle_iter().map(|t| t.area()).sum()
    }
}

/// A triangle with concrete 2-D coordinates.
///
/// Utility type for geometric calculations on mesh triangles.
#[derive(Debug, Clone, Copy)]
pub struct Triangle2 {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
    pub c: Point2<f64>,
}

impl Triangle2 {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Self {
        Self { a, b, c }
    }

    /// Twice the signed area (the z component of the edge cross product).
    /// Positive when a→b→c winds counter-clockwise in a y-up frame.
    #[inline]
    pub fn signed_area_doubled(&self) -> f64 {
        (self.b.x - self.a.x) * (self.c.y - self.a.y)
            - (self.b.y - self.a.y) * (self.c.x - self.a.x)
    }

    /// Signed area of the triangle.
    #[inline]
    pub fn signed_area(&self) -> f64 {
        self.signed_area_doubled() * 0.5
    }

    /// Absolute area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Compute the centroid (vertex average).
    #[inline]
    pub fn centroid(&self) -> Point2<f64> {
        Point2::new(
            (self.a.x + self.b.x + self.c.x) / 3.0,
            (self.a.y + self.b.y + self.c.y) / 3.0,
        )
    }

    /// Check if the triangle is degenerate (zero or near-zero area).
    #[inline]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() < epsilon
    }
}
