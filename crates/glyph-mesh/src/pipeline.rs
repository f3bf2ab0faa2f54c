//! End-to-end glyph meshing pipeline.
//!
//! [`generate_mesh`] runs the full chain on one raster: boundary
//! extraction, gap detection, optional boundary densification, interior
//! sampling, Delaunay triangulation with gap filtering, and optional
//! centroid refinement. [`generate_meshes`] runs it over a batch of
//! rasters in parallel.
//!
//! # Determinism
//!
//! With [`GlyphMeshParams::seed`] set, a run is fully deterministic: the
//! same raster and parameters produce the same mesh, and in a batch each
//! glyph derives its own seed from the base seed and its index, so results
//! do not depend on thread scheduling. Without a seed, entropy is drawn
//! once per call.
//!
//! # Configuration
//!
//! With the `pipeline-config` feature, [`GlyphMeshParams`] can be loaded
//! from and saved to TOML, with every omitted key falling back to its
//! default.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::contour::{self, ContourParams};
use crate::delaunay::{self, TriangulateParams};
use crate::error::MeshResult;
use crate::gaps::{self, GapParams};
use crate::raster::{Polarity, Raster};
use crate::refine::{self, RefineParams};
use crate::sample::{
    self, PolygonOracle, RasterOracle, SampleParams, SamplingStrategy,
};
use crate::tracing_ext::{OperationTimer, log_mesh_stats};
use crate::types::{Mesh, Polygon};

/// How interior candidates are tested for membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MembershipMethod {
    /// Round to the nearest pixel and test raster foreground. Respects
    /// gaps and concavities exactly as rasterized.
    #[default]
    Pixel,
    /// Point-in-polygon against the traced boundary minus the gaps.
    Polygon,
}

/// Parameters for the full pipeline.
///
/// `threshold` and `polarity` only apply when the input is grayscale, via
/// [`generate_mesh_from_gray`]; a pre-binarized [`Raster`] is used as-is.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GlyphMeshParams {
    /// Binarization threshold for grayscale input.
    pub threshold: u8,
    /// Foreground polarity for grayscale input.
    pub polarity: Polarity,
    /// Simplify the outer boundary after tracing.
    pub simplify: bool,
    /// Simplification tolerance for the outer boundary, in pixels.
    pub epsilon: f64,
    /// Simplification tolerance for gap contours, in pixels.
    pub gap_epsilon: f64,
    /// Insert this many segments per boundary edge before sampling.
    /// 1 leaves the boundary as traced.
    pub boundary_subdivision: u32,
    /// Number of interior points to sample.
    pub interior_points: usize,
    /// Interior candidate proposal strategy.
    pub strategy: SamplingStrategy,
    /// Interior membership test.
    pub membership: MembershipMethod,
    /// Rejection budget multiplier for uniform sampling.
    pub max_attempts_factor: usize,
    /// When set, split triangles larger than this area after
    /// triangulation.
    pub refine_max_area: Option<f64>,
    /// RNG seed. When set, output is reproducible.
    pub seed: Option<u64>,
}

impl Default for GlyphMeshParams {
    fn default() -> Self {
        Self {
            threshold: 127,
            polarity: Polarity::Auto,
            simplify: true,
            epsilon: 2.0,
            gap_epsilon: 2.0,
            boundary_subdivision: 1,
            interior_points: 30,
            strategy: SamplingStrategy::UniformRejection,
            membership: MembershipMethod::Pixel,
            max_attempts_factor: 10,
            refine_max_area: None,
            seed: None,
        }
    }
}

impl GlyphMeshParams {
    /// Default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Coarse output: few interior points, aggressive simplification.
    pub fn draft() -> Self {
        Self {
            epsilon: 3.0,
            gap_epsilon: 3.0,
            interior_points: 10,
            ..Self::default()
        }
    }

    /// Dense output: tight tolerances, subdivided boundary, refinement.
    pub fn detailed() -> Self {
        Self {
            epsilon: 1.0,
            gap_epsilon: 1.0,
            boundary_subdivision: 2,
            interior_points: 80,
            refine_max_area: Some(16.0),
            ..Self::default()
        }
    }

    /// Pin the RNG seed for reproducible output.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load parameters from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or doesn't match the schema.
    #[cfg(feature = "pipeline-config")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load parameters from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or the TOML is invalid.
    #[cfg(feature = "pipeline-config")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ParamsFileError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&contents)?)
    }

    /// Serialize to TOML string.
    #[cfg(feature = "pipeline-config")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save parameters to a TOML file.
    #[cfg(feature = "pipeline-config")]
    pub fn save_toml(&self, path: impl AsRef<std::path::Path>) -> Result<(), ParamsFileError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

/// Errors that can occur when loading or saving pipeline parameters.
#[cfg(feature = "pipeline-config")]
#[derive(Debug)]
pub enum ParamsFileError {
    /// I/O error reading or writing the file.
    Io(std::io::Error),
    /// TOML parsing error.
    TomlParse(toml::de::Error),
    /// TOML serialization error.
    TomlSerialize(toml::ser::Error),
}

#[cfg(feature = "pipeline-config")]
impl std::fmt::Display for ParamsFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::TomlParse(e) => write!(f, "TOML parse error: {}", e),
            Self::TomlSerialize(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

#[cfg(feature = "pipeline-config")]
impl std::error::Error for ParamsFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::TomlParse(e) => Some(e),
            Self::TomlSerialize(e) => Some(e),
        }
    }
}

#[cfg(feature = "pipeline-config")]
impl From<std::io::Error> for ParamsFileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(feature = "pipeline-config")]
impl From<toml::de::Error> for ParamsFileError {
    fn from(e: toml::de::Error) -> Self {
        Self::TomlParse(e)
    }
}

#[cfg(feature = "pipeline-config")]
impl From<toml::ser::Error> for ParamsFileError {
    fn from(e: toml::ser::Error) -> Self {
        Self::TomlSerialize(e)
    }
}

/// Counters collected while building one glyph mesh.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Boundary vertices after simplification and subdivision.
    pub boundary_points: usize,
    /// Gap contours detected.
    pub gap_count: usize,
    /// Interior points accepted by sampling.
    pub interior_accepted: usize,
    /// Interior candidates proposed.
    pub sampling_attempts: usize,
    /// True when sampling stopped short of the target.
    pub sampling_exhausted: bool,
    /// Triangles produced before gap filtering.
    pub candidate_triangles: usize,
    /// Triangles removed by the gap filter.
    pub triangles_filtered: usize,
    /// True when the gap filter was bypassed to keep the mesh non-empty.
    pub gap_filter_bypassed: bool,
    /// Triangles split by refinement.
    pub triangles_split: usize,
}

/// Output of the pipeline for one glyph.
#[derive(Debug, Clone)]
pub struct GlyphMesh {
    /// The traced outer boundary, as used for meshing.
    pub boundary: Polygon,
    /// Gap contours (holes and concave openings).
    pub gaps: Vec<Polygon>,
    /// The triangle mesh.
    pub mesh: Mesh,
    /// Stage counters.
    pub stats: PipelineStats,
}

impl GlyphMesh {
    /// The result for a raster with no usable foreground.
    pub fn empty() -> Self {
        Self {
            boundary: Polygon::new(Vec::new()),
            gaps: Vec::new(),
            mesh: Mesh::new(),
            stats: PipelineStats::default(),
        }
    }
}

/// Run the full pipeline on a binarized raster.
///
/// A raster with no foreground, or whose every contour is degenerate,
/// yields `Ok` with an empty [`GlyphMesh`].
///
/// # Errors
///
/// Propagates triangulation and refinement errors; with a traced boundary
/// these do not occur in practice, since a boundary always has at least
/// 3 vertices.
pub fn generate_mesh(raster: &Raster, params: &GlyphMeshParams) -> MeshResult<GlyphMesh> {
    let seed = params.seed.unwrap_or_else(|| rand::thread_rng().gen());
    generate_mesh_with_seed(raster, params, seed)
}

/// Binarize a grayscale image and run the full pipeline on it.
///
/// Applies `params.threshold` and `params.polarity`, then behaves like
/// [`generate_mesh`].
///
/// # Errors
///
/// `MeshError::RasterSizeMismatch` when `data.len() != width * height`,
/// plus anything [`generate_mesh`] returns.
pub fn generate_mesh_from_gray(
    data: &[u8],
    width: usize,
    height: usize,
    params: &GlyphMeshParams,
) -> MeshResult<GlyphMesh> {
    let raster =
        Raster::from_gray_with_polarity(data, width, height, params.threshold, params.polarity)?;
    generate_mesh(&raster, params)
}

/// Run the pipeline over a batch of rasters in parallel.
///
/// Results are returned in input order, one per raster; a failure on one
/// glyph does not affect the others. With `params.seed` set the batch is
/// deterministic regardless of thread count.
pub fn generate_meshes(
    rasters: &[Raster],
    params: &GlyphMeshParams,
) -> Vec<MeshResult<GlyphMesh>> {
    let base_seed = params.seed.unwrap_or_else(|| rand::thread_rng().gen());

    let results: Vec<MeshResult<GlyphMesh>> = rasters
        .par_iter()
        .enumerate()
        .map(|(index, raster)| {
            let seed = base_seed.wrapping_add(index as u64);
            generate_mesh_with_seed(raster, params, seed)
        })
        .collect();

    let failures = results.iter().filter(|r| r.is_err()).count();
    info!(
        target: "glyph_mesh::pipeline",
        glyphs = rasters.len(),
        failures = failures,
        "batch complete"
    );
    results
}

fn generate_mesh_with_seed(
    raster: &Raster,
    params: &GlyphMeshParams,
    seed: u64,
) -> MeshResult<GlyphMesh> {
    let _timer = OperationTimer::with_raster("generate_mesh", raster.width(), raster.height());

    if raster.is_empty() {
        debug!(
            target: "glyph_mesh::pipeline",
            "raster has no foreground; returning empty result"
        );
        return Ok(GlyphMesh::empty());
    }

    let mut stats = PipelineStats::default();

    let contour_params = ContourParams {
        simplify: params.simplify,
        epsilon: params.epsilon,
        ..ContourParams::default()
    };
    let Some(boundary) = contour::extract_largest(raster, &contour_params) else {
        debug!(
            target: "glyph_mesh::pipeline",
            "no contour with 3 or more vertices; returning empty result"
        );
        return Ok(GlyphMesh::empty());
    };

    let gap_params = GapParams {
        simplify: params.simplify,
        epsilon: params.gap_epsilon,
    };
    let gaps = gaps::detect_gaps(&boundary, raster, &gap_params);
    stats.gap_count = gaps.len();

    let boundary = if params.boundary_subdivision > 1 {
        refine::subdivide_boundary(&boundary, params.boundary_subdivision)
    } else {
        boundary
    };
    stats.boundary_points = boundary.len();

    let sample_params = SampleParams {
        target_count: params.interior_points,
        strategy: params.strategy,
        max_attempts_factor: params.max_attempts_factor,
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let sampled = match params.membership {
        MembershipMethod::Pixel => {
            let oracle = RasterOracle::new(raster);
            sample::sample_interior(&boundary, &oracle, &sample_params, &mut rng)
        }
        MembershipMethod::Polygon => {
            let oracle = PolygonOracle::new(&boundary, &gaps);
            sample::sample_interior(&boundary, &oracle, &sample_params, &mut rng)
        }
    };
    stats.interior_accepted = sampled.accepted;
    stats.sampling_attempts = sampled.attempts;
    stats.sampling_exhausted = sampled.exhausted;

    let triangulated =
        delaunay::triangulate(&sampled.points, &gaps, &TriangulateParams::default())?;
    stats.candidate_triangles = triangulated.candidate_triangles;
    stats.triangles_filtered = triangulated.filtered_out;
    stats.gap_filter_bypassed = triangulated.filter_bypassed;
    let mut mesh = triangulated.mesh;

    if let Some(max_area) = params.refine_max_area {
        let refined = refine::refine_mesh(&mesh, &RefineParams::with_max_area(max_area))?;
        stats.triangles_split = refined.triangles_split;
        mesh = refined.mesh;
    }

    log_mesh_stats(&mesh, "pipeline output");
    info!(
        target: "glyph_mesh::pipeline",
        boundary_points = stats.boundary_points,
        gaps = stats.gap_count,
        interior = stats.interior_accepted,
        triangles = mesh.triangle_count(),
        "glyph mesh complete"
    );

    Ok(GlyphMesh {
        boundary,
        gaps,
        mesh,
        stats,
    })
}
