//! Interior point sampling for triangulation density.
//!
//! Boundary vertices alone triangulate into long skinny fans; sprinkling
//! points through the glyph interior gives the triangulator material for a
//! more even mesh. Candidate points are accepted or rejected by a
//! [`MembershipOracle`], and the two sampling strategies differ only in how
//! candidates are proposed.
//!
//! Sampling never fails: a region too thin to hold any interior point
//! simply yields the boundary unchanged, with the shortfall recorded on
//! the [`SampleResult`].

use nalgebra::Point2;
use rand::Rng;
use tracing::{debug, warn};

use crate::raster::Raster;
use crate::types::{BoundingBox, PointSet, Polygon};

/// Decides whether a candidate point belongs to the glyph interior.
///
/// One interface for both membership models, so samplers are written once.
pub trait MembershipOracle {
    /// True when the point lies inside the region to be meshed.
    fn contains(&self, p: &Point2<f64>) -> bool;
}

/// Membership by polygon geometry: inside the outer boundary and outside
/// every gap.
///
/// Works without raster access, but only as accurately as the polygons
/// describe the glyph.
#[derive(Debug, Clone, Copy)]
pub struct PolygonOracle<'a> {
    boundary: &'a Polygon,
    gaps: &'a [Polygon],
}

impl<'a> PolygonOracle<'a> {
    /// Create an oracle over a boundary and its gaps.
    pub fn new(boundary: &'a Polygon, gaps: &'a [Polygon]) -> Self {
        Self { boundary, gaps }
    }
}

impl MembershipOracle for PolygonOracle<'_> {
    fn contains(&self, p: &Point2<f64>) -> bool {
        self.boundary.contains_point(p) && !self.gaps.iter().any(|gap| gap.contains_point(p))
    }
}

/// Membership by raster lookup: the nearest pixel must be foreground.
///
/// Pixel-accurate, so it catches glyph detail that simplified polygons
/// smooth over. Preferred whenever the source raster is still at hand.
/// Points rounding outside the grid are non-members.
#[derive(Debug, Clone, Copy)]
pub struct RasterOracle<'a> {
    raster: &'a Raster,
}

impl<'a> RasterOracle<'a> {
    /// Create an oracle over a binary raster.
    pub fn new(raster: &'a Raster) -> Self {
        Self { raster }
    }
}

impl MembershipOracle for RasterOracle<'_> {
    fn contains(&self, p: &Point2<f64>) -> bool {
        self.raster
            .is_foreground(p.x.round() as i32, p.y.round() as i32)
    }
}

/// Interior sampling strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SamplingStrategy {
    /// Uniform random points in the bounding box, kept when the oracle
    /// accepts them. Attempt budget is `target_count * max_attempts_factor`.
    #[default]
    UniformRejection,
    /// A ⌈√target⌉ x ⌈√target⌉ grid over the bounding box, each point
    /// jittered by up to 30% of a cell per axis, visited row by row with
    /// early exit once the target is reached.
    JitteredGrid,
}

/// Parameters for interior point sampling.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SampleParams {
    /// Number of interior points to aim for.
    pub target_count: usize,
    /// Candidate proposal strategy.
    pub strategy: SamplingStrategy,
    /// Rejection budget multiplier: uniform sampling stops after
    /// `target_count * max_attempts_factor` attempts.
    pub max_attempts_factor: usize,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            target_count: 30,
            strategy: SamplingStrategy::UniformRejection,
            max_attempts_factor: 10,
        }
    }
}

impl SampleParams {
    /// Sample `target_count` points with the default strategy.
    pub fn new(target_count: usize) -> Self {
        Self {
            target_count,
            ..Self::default()
        }
    }

    /// Derive the target from a density knob: `target = 30 * density`.
    /// A density of 1.0 is the nominal mesh resolution.
    pub fn for_density(density: f64) -> Self {
        Self {
            target_count: (30.0 * density).max(0.0) as usize,
            ..Self::default()
        }
    }

    /// Use the given proposal strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: SamplingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use the given rejection budget multiplier.
    #[must_use]
    pub fn with_attempts_factor(mut self, factor: usize) -> Self {
        self.max_attempts_factor = factor;
        self
    }
}

/// Outcome of interior sampling.
#[derive(Debug)]
pub struct SampleResult {
    /// Boundary vertices followed by accepted interior points.
    pub points: PointSet,
    /// Interior points accepted.
    pub accepted: usize,
    /// Candidates proposed.
    pub attempts: usize,
    /// True when the target count was not reached before the strategy ran
    /// out of candidates.
    pub exhausted: bool,
}

/// Sample interior points for a boundary polygon.
///
/// The result's point set holds the boundary vertices first, in their
/// original order, then accepted interior points in acceptance order.
/// A target of zero, or a region that accepts no candidates, returns the
/// boundary unchanged; exhaustion is reported, never an error.
pub fn sample_interior<O, R>(
    boundary: &Polygon,
    oracle: &O,
    params: &SampleParams,
    rng: &mut R,
) -> SampleResult
where
    O: MembershipOracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut points = PointSet::from_polygon(boundary);

    if params.target_count == 0 {
        return SampleResult {
            points,
            accepted: 0,
            attempts: 0,
            exhausted: false,
        };
    }

    let Some(bbox) = boundary.bounding_box() else {
        warn!(
            target: "glyph_mesh::sample",
            "cannot sample interior of an empty boundary"
        );
        return SampleResult {
            points,
            accepted: 0,
            attempts: 0,
            exhausted: true,
        };
    };

    let (interior, attempts) = match params.strategy {
        SamplingStrategy::UniformRejection => {
            let budget = params.target_count * params.max_attempts_factor;
            sample_uniform(&bbox, oracle, params.target_count, budget, rng)
        }
        SamplingStrategy::JitteredGrid => {
            sample_jittered_grid(&bbox, oracle, params.target_count, rng)
        }
    };

    let accepted = interior.len();
    for p in interior {
        points.push_interior(p);
    }

    let exhausted = accepted < params.target_count;
    if exhausted {
        warn!(
            target: "glyph_mesh::sample",
            accepted,
            target = params.target_count,
            attempts,
            strategy = ?params.strategy,
            "interior sampling exhausted before reaching target"
        );
    } else {
        debug!(
            target: "glyph_mesh::sample",
            accepted,
            attempts,
            strategy = ?params.strategy,
            "interior sampling complete"
        );
    }

    SampleResult {
        points,
        accepted,
        attempts,
        exhausted,
    }
}

fn sample_uniform<O, R>(
    bbox: &BoundingBox,
    oracle: &O,
    target: usize,
    budget: usize,
    rng: &mut R,
) -> (Vec<Point2<f64>>, usize)
where
    O: MembershipOracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut out = Vec::with_capacity(target);
    let mut attempts = 0usize;

    while out.len() < target && attempts < budget {
        let x = rng.gen_range(bbox.min.x..=bbox.max.x);
        let y = rng.gen_range(bbox.min.y..=bbox.max.y);
        attempts += 1;

        let p = Point2::new(x, y);
        if oracle.contains(&p) {
            out.push(p);
        }
    }

    (out, attempts)
}

fn sample_jittered_grid<O, R>(
    bbox: &BoundingBox,
    oracle: &O,
    target: usize,
    rng: &mut R,
) -> (Vec<Point2<f64>>, usize)
where
    O: MembershipOracle + ?Sized,
    R: Rng + ?Sized,
{
    let grid = (target as f64).sqrt().ceil() as usize;
    let cell_w = bbox.width() / grid as f64;
    let cell_h = bbox.height() / grid as f64;

    let mut out = Vec::with_capacity(target);
    let mut attempts = 0usize;

    'rows: for row in 0..grid {
        for col in 0..grid {
            if out.len() >= target {
                break 'rows;
            }
            attempts += 1;

            let jx = cell_w * 0.3 * (rng.gen::<f64>() - 0.5);
            let jy = cell_h * 0.3 * (rng.gen::<f64>() - 0.5);
            let p = Point2::new(
                bbox.min.x + (col as f64 + 0.5) * cell_w + jx,
                bbox.min.y + (row as f64 + 0.5) * cell_h + jy,
            );

            if oracle.contains(&p) {
                out.push(p);
            }
        }
    }

    (out, attempts)
}
