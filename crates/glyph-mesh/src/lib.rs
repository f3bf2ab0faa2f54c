//! Triangle meshing for rasterized glyphs.
//!
//! This crate turns a binarized glyph image into a closed 2-D triangle
//! mesh: it traces the outer boundary, detects holes and concave openings,
//! scatters interior points, triangulates, and optionally refines the
//! result. It's designed for text rendering pipelines, glyph deformation
//! effects, and 2-D physics over type.
//!
//! # Features
//!
//! - **Boundary extraction**: Moore neighbor tracing of every foreground
//!   region, largest-by-detail selection
//! - **Simplification**: Douglas-Peucker vertex reduction with a
//!   degeneracy floor
//! - **Gap detection**: holes and concave openings found by filling the
//!   convex hull and tracing leftover background
//! - **Interior sampling**: uniform rejection or jittered grid, against a
//!   pixel or polygon membership oracle
//! - **Triangulation**: incremental Bowyer-Watson Delaunay with gap
//!   filtering
//! - **Refinement**: centroid splitting of oversized triangles, boundary
//!   densification
//! - **Batch processing**: one call meshes a font's worth of glyphs in
//!   parallel
//!
//! # Coordinate System
//!
//! All geometry lives in **image coordinates**: x grows right, y grows
//! down, and the origin is the center of the top-left pixel. Polygon
//! vertices produced by tracing sit on pixel centers, so their
//! coordinates are whole numbers.
//!
//! Outer boundaries are traced clockwise as seen on screen, which makes
//! [`Polygon::signed_area`] positive; mesh triangles wind the same way,
//! so [`Triangle2::signed_area`] is positive for every emitted triangle.
//!
//! # Quick Start
//!
//! ```
//! use glyph_mesh::{GlyphMeshParams, Raster, generate_mesh};
//!
//! // An 8x8 solid block stands in for a rasterized glyph
//! let raster = Raster::from_bits(8, 8, vec![true; 64]).unwrap();
//!
//! let params = GlyphMeshParams::new().with_seed(42);
//! let glyph = generate_mesh(&raster, &params).unwrap();
//!
//! assert_eq!(glyph.boundary.len(), 4); // simplification finds the corners
//! assert!(glyph.mesh.triangle_count() > 0);
//! ```
//!
//! # Batch Processing
//!
//! ```
//! use glyph_mesh::{GlyphMeshParams, Raster, generate_meshes};
//!
//! let glyphs = vec![
//!     Raster::from_bits(6, 6, vec![true; 36]).unwrap(),
//!     Raster::blank(6, 6), // nothing to mesh
//! ];
//! let results = generate_meshes(&glyphs, &GlyphMeshParams::new().with_seed(7));
//!
//! assert_eq!(results.len(), 2);
//! assert!(results[1].as_ref().unwrap().mesh.is_empty());
//! ```
//!
//! # Determinism
//!
//! Every randomized stage draws from a caller-controlled RNG. Set
//! [`GlyphMeshParams::seed`] and the pipeline is reproducible end to end,
//! including batch runs: each glyph in a batch derives its seed from the
//! base seed and its index, so the output does not depend on how rayon
//! schedules the work.
//!
//! # Configuration
//!
//! With the `pipeline-config` feature enabled, parameters round-trip
//! through TOML, and omitted keys keep their defaults:
//!
//! ```
//! # #[cfg(feature = "pipeline-config")]
//! # fn main() {
//! use glyph_mesh::GlyphMeshParams;
//!
//! let params = GlyphMeshParams::from_toml("interior_points = 64").unwrap();
//! assert_eq!(params.interior_points, 64);
//! # }
//! # #[cfg(not(feature = "pipeline-config"))]
//! # fn main() {}
//! ```
//!
//! # Error Handling
//!
//! Most operations return `MeshResult<T>`, which is `Result<T, MeshError>`.
//! Degenerate input is generally absorbed rather than rejected: an empty
//! raster meshes to an empty result, and sampling that can't reach its
//! target reports exhaustion instead of failing. The hard errors are
//! structural, like triangulating fewer than 3 points:
//!
//! ```
//! use glyph_mesh::{MeshError, PointSet, Polygon, TriangulateParams, triangulate};
//!
//! let too_few = PointSet::from_polygon(&Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0)]));
//! match triangulate(&too_few, &[], &TriangulateParams::new()) {
//!     Err(MeshError::InsufficientPoints { point_count }) => assert_eq!(point_count, 2),
//!     _ => unreachable!(),
//! }
//! ```

mod error;
mod pipeline;
mod raster;
mod types;
pub mod tracing_ext;

pub mod contour;
pub mod delaunay;
pub mod gaps;
pub mod refine;
pub mod sample;
pub mod simplify;

// Re-export core types at crate root
pub use error::{ErrorCode, MeshError, MeshResult};
pub use raster::{Polarity, Raster};
pub use types::{BoundingBox, Mesh, PointSet, Polygon, Triangle2};

// Re-export the pipeline API
pub use pipeline::{
    GlyphMesh, GlyphMeshParams, MembershipMethod, PipelineStats, generate_mesh,
    generate_mesh_from_gray, generate_meshes,
};
#[cfg(feature = "pipeline-config")]
pub use pipeline::ParamsFileError;

// Re-export commonly used operations
pub use contour::{ContourMethod, ContourParams, extract_contours, extract_largest, resample};
pub use delaunay::{TriangulateParams, TriangulateResult, TriangulationMethod, triangulate};
pub use gaps::{GapParams, detect_gaps};
pub use refine::{RefineParams, RefineResult, refine_mesh, subdivide_boundary};
pub use sample::{
    MembershipOracle, PolygonOracle, RasterOracle, SampleParams, SampleResult, SamplingStrategy,
    sample_interior,
};
pub use simplify::simplify_polygon;

// Re-export tracing extensions for structured logging
pub use tracing_ext::{OperationTimer, log_mesh_stats};

// Convenience methods on Raster
impl Raster {
    /// Run the full meshing pipeline on this raster.
    ///
    /// # Example
    ///
    /// ```
    /// use glyph_mesh::{GlyphMeshParams, Raster};
    ///
    /// let raster = Raster::from_bits(4, 4, vec![true; 16]).unwrap();
    /// let glyph = raster.generate_mesh(&GlyphMeshParams::new().with_seed(1)).unwrap();
    /// assert!(!glyph.mesh.is_empty());
    /// ```
    pub fn generate_mesh(&self, params: &GlyphMeshParams) -> MeshResult<GlyphMesh> {
        pipeline::generate_mesh(self, params)
    }

    /// Trace the outer boundary of every foreground region.
    pub fn contours(&self, params: &ContourParams) -> Vec<Polygon> {
        contour::extract_contours(self, params)
    }

    /// Trace the most detailed foreground region's boundary.
    pub fn largest_contour(&self, params: &ContourParams) -> Option<Polygon> {
        contour::extract_largest(self, params)
    }

    /// Detect gaps relative to the given outer boundary.
    pub fn detect_gaps(&self, outer: &Polygon, params: &GapParams) -> Vec<Polygon> {
        gaps::detect_gaps(outer, self, params)
    }
}

// Convenience methods on Polygon
impl Polygon {
    /// Simplify with Douglas-Peucker at the given tolerance.
    ///
    /// # Example
    ///
    /// ```
    /// use glyph_mesh::Polygon;
    ///
    /// let outline = Polygon::from_coords(&[
    ///     (0.0, 0.0), (5.0, 0.1), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0),
    /// ]);
    /// assert_eq!(outline.simplify(1.0).len(), 4);
    /// ```
    pub fn simplify(&self, epsilon: f64) -> Polygon {
        simplify::simplify_polygon(self, epsilon)
    }

    /// Resample to `num_points` evenly spaced vertices along the perimeter.
    pub fn resample(&self, num_points: usize) -> Polygon {
        contour::resample(self, num_points)
    }

    /// Insert `factor - 1` evenly spaced points along every edge.
    pub fn subdivide(&self, factor: u32) -> Polygon {
        refine::subdivide_boundary(self, factor)
    }
}

// Convenience methods on Mesh
impl Mesh {
    /// Split every triangle larger than `max_area` once around its
    /// centroid.
    ///
    /// # Example
    ///
    /// ```
    /// use glyph_mesh::Mesh;
    /// use nalgebra::Point2;
    ///
    /// let mesh = Mesh {
    ///     points: vec![
    ///         Point2::new(0.0, 0.0),
    ///         Point2::new(20.0, 0.0),
    ///         Point2::new(0.0, 10.0),
    ///     ],
    ///     triangles: vec![[0, 1, 2]],
    /// };
    /// let refined = mesh.refine(10.0).unwrap();
    /// assert_eq!(refined.mesh.triangle_count(), 3);
    /// ```
    pub fn refine(&self, max_area: f64) -> MeshResult<RefineResult> {
        refine::refine_mesh(self, &RefineParams::with_max_area(max_area))
    }
}
