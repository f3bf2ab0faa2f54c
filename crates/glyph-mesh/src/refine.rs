//! Mesh refinement by centroid splitting, plus boundary densification.
//!
//! [`refine_mesh`] makes a single pass over the triangle list and replaces
//! every triangle larger than the area cap with a three-triangle fan around
//! its centroid. Newly created triangles are not revisited within the pass,
//! so one call shrinks the largest triangles by roughly a factor of three;
//! callers wanting a bound on all triangles run it to a fixed point.
//!
//! [`subdivide_boundary`] densifies a polygon outline before sampling and
//! triangulation so that refinement near the rim has vertices to work with.

use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::types::{Mesh, Polygon, Triangle2};

/// Parameters for centroid refinement.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RefineParams {
    /// Triangles with area strictly above this are split.
    pub max_area: f64,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self { max_area: 50.0 }
    }
}

impl RefineParams {
    /// Default parameters, sized for glyph rasters around 100 px.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split triangles larger than `max_area`.
    pub fn with_max_area(max_area: f64) -> Self {
        Self { max_area }
    }
}

/// Result of a refinement pass.
#[derive(Debug)]
pub struct RefineResult {
    /// The refined mesh.
    pub mesh: Mesh,
    /// Number of input triangles that were split.
    pub triangles_split: usize,
    /// Number of centroid points appended.
    pub points_added: usize,
}

/// Split every oversized triangle once around its centroid.
///
/// Triangle order is preserved: a kept triangle stays in place and a split
/// triangle is replaced by its three fan triangles at the same position.
/// Centroids are appended after the existing points, so input indices
/// remain valid in the output.
///
/// # Errors
///
/// `MeshError::InvalidPointIndex` when a triangle references a point
/// outside the mesh.
pub fn refine_mesh(mesh: &Mesh, params: &RefineParams) -> MeshResult<RefineResult> {
    let point_count = mesh.point_count();
    for (triangle_index, tri) in mesh.triangles.iter().enumerate() {
        for &point_index in tri {
            if point_index as usize >= point_count {
                return Err(MeshError::invalid_point_index(
                    triangle_index,
                    point_index,
                    point_count,
                ));
            }
        }
    }

    let mut points = mesh.points.clone();
    let mut triangles = Vec::with_capacity(mesh.triangle_count());
    let mut triangles_split = 0;

    for &[i0, i1, i2] in &mesh.triangles {
        let tri = Triangle2::new(
            points[i0 as usize],
            points[i1 as usize],
            points[i2 as usize],
        );
        if tri.area() <= params.max_area {
            triangles.push([i0, i1, i2]);
            continue;
        }

        let m = points.len() as u32;
        points.push(tri.centroid());
        triangles.push([i0, i1, m]);
        triangles.push([i1, i2, m]);
        triangles.push([i2, i0, m]);
        triangles_split += 1;
    }

    if triangles_split > 0 {
        debug!(
            target: "glyph_mesh::refine",
            split = triangles_split,
            max_area = params.max_area,
            triangles = triangles.len(),
            "refinement pass complete"
        );
    }

    Ok(RefineResult {
        mesh: Mesh { points, triangles },
        points_added: triangles_split,
        triangles_split,
    })
}

/// Insert `factor - 1` evenly spaced points along every edge of a polygon,
/// the closing edge included.
///
/// A factor of 0 or 1, or a polygon with fewer than 3 points, returns the
/// input unchanged.
pub fn subdivide_boundary(polygon: &Polygon, factor: u32) -> Polygon {
    if factor <= 1 || polygon.len() < 3 {
        return polygon.clone();
    }

    let n = polygon.len();
    let mut points = Vec::with_capacity(n * factor as usize);
    for i in 0..n {
        let a = polygon.points[i];
        let b = polygon.points[(i + 1) % n];
        points.push(a);
        for j in 1..factor {
            let t = f64::from(j) / f64::from(factor);
            points.push(a + (b - a) * t);
        }
    }
    Polygon::new(points)
}
