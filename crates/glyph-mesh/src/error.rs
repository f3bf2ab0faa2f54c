//! Error types for the glyph meshing pipeline.
//!
//! Most degenerate inputs in this crate are handled by returning empty or
//! unchanged results rather than errors (an empty raster yields no contours,
//! a two-point polygon passes through the simplifier untouched). The errors
//! below are the hard failures: inputs that no stage downstream could make
//! sense of.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `GLYPH-XXXX`:
//! - `GLYPH-1xxx`: Input errors (raster construction, parameter validation)
//! - `GLYPH-2xxx`: Geometry errors (point sets and meshes that cannot be processed)
//!
//! # Example
//!
//! ```rust,ignore
//! use glyph_mesh::{ErrorCode, MeshError};
//!
//! let err = MeshError::insufficient_points(2);
//! println!("Error code: {}", err.code()); // GLYPH-2001
//! ```

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for glyph meshing operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes for glyph meshing operations.
///
/// Codes follow the pattern `GLYPH-XXXX` where:
/// - 1xxx = Input errors
/// - 2xxx = Geometry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors (1xxx)
    /// GLYPH-1001: Pixel buffer length does not match raster dimensions
    RasterSizeMismatch = 1001,

    // Geometry errors (2xxx)
    /// GLYPH-2001: Fewer than three points supplied for triangulation
    InsufficientPoints = 2001,
    /// GLYPH-2002: Triangle references a point index that does not exist
    InvalidPointIndex = 2002,
    /// GLYPH-2003: Point has a NaN or infinite coordinate
    InvalidCoordinate = 2003,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `GLYPH-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RasterSizeMismatch => "GLYPH-1001",
            ErrorCode::InsufficientPoints => "GLYPH-2001",
            ErrorCode::InvalidPointIndex => "GLYPH-2002",
            ErrorCode::InvalidCoordinate => "GLYPH-2003",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during glyph meshing operations.
///
/// Each error variant includes:
/// - A human-readable message
/// - A machine-readable error code
/// - Recovery hints via miette diagnostics
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Pixel buffer length does not match the declared raster dimensions.
    #[error(
        "raster size mismatch: {width}x{height} needs {expected} pixels, but {actual} were provided"
    )]
    #[diagnostic(
        code(glyph::raster::size_mismatch),
        help("The pixel buffer must be row-major with exactly width * height entries.")
    )]
    RasterSizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// Too few points to form any triangle.
    #[error("cannot triangulate {point_count} points: at least 3 are required")]
    #[diagnostic(
        code(glyph::triangulate::insufficient_points),
        help(
            "The boundary polygon may have collapsed under simplification. Try a smaller epsilon, or check that the raster contains a foreground region."
        )
    )]
    InsufficientPoints { point_count: usize },

    /// Triangle references a point index outside the point set.
    #[error(
        "invalid point index: triangle {triangle_index} references point {point_index}, but mesh only has {point_count} points"
    )]
    #[diagnostic(
        code(glyph::mesh::point_index),
        help("The mesh was constructed with indices that do not match its point list.")
    )]
    InvalidPointIndex {
        triangle_index: usize,
        point_index: u32,
        point_count: usize,
    },

    /// Point with a NaN or infinite coordinate.
    #[error("invalid coordinate at point {point_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(glyph::geometry::coordinate),
        help(
            "Non-finite coordinates break the circumcircle predicate. Check upstream arithmetic for division by zero or overflow."
        )
    )]
    InvalidCoordinate {
        point_index: usize,
        coordinate: &'static str,
        value: f64,
    },
}

impl MeshError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::RasterSizeMismatch { .. } => ErrorCode::RasterSizeMismatch,
            MeshError::InsufficientPoints { .. } => ErrorCode::InsufficientPoints,
            MeshError::InvalidPointIndex { .. } => ErrorCode::InvalidPointIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
        }
    }

    // Constructor helpers for common error patterns

    /// Create a RasterSizeMismatch error.
    pub fn raster_size_mismatch(width: usize, height: usize, actual: usize) -> Self {
        MeshError::RasterSizeMismatch {
            width,
            height,
            expected: width * height,
            actual,
        }
    }

    /// Create an InsufficientPoints error.
    pub fn insufficient_points(point_count: usize) -> Self {
        MeshError::InsufficientPoints { point_count }
    }

    /// Create an InvalidPointIndex error.
    pub fn invalid_point_index(
        triangle_index: usize,
        point_index: u32,
        point_count: usize,
    ) -> Self {
        MeshError::InvalidPointIndex {
            triangle_index,
            point_index,
            point_count,
        }
    }

    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(point_index: usize, coordinate: &'static str, value: f64) -> Self {
        MeshError::InvalidCoordinate {
            point_index,
            coordinate,
            value,
        }
    }
}
