//! Tracing extensions for the glyph meshing pipeline.
//!
//! This module provides structured logging and performance tracing for the
//! pipeline stages. It integrates with the `tracing` ecosystem:
//!
//! - **Performance spans**: operation timing via [`OperationTimer`]
//! - **Structured fields**: raster dimensions, point and triangle counts
//! - **Debug logging**: intermediate state for troubleshooting
//!
//! # Usage
//!
//! Enable tracing by initializing a subscriber in your application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{EnvFilter, fmt, prelude::*};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // Set RUST_LOG=glyph_mesh=debug for detailed output
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: recoverable issues (sampling exhaustion, gap filter bypass)
//! - **INFO**: operation summaries and timing
//! - **DEBUG**: per-stage progress and intermediate counts

use std::time::Instant;
use tracing::{Span, debug, info};

/// A performance timer that logs duration on drop.
///
/// # Example
///
/// ```rust,ignore
/// use glyph_mesh::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("glyph_operation", operation = name);
        debug!(target: "glyph_mesh::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer carrying the raster dimensions being processed.
    pub fn with_raster(name: &'static str, width: usize, height: usize) -> Self {
        let span = tracing::info_span!(
            "glyph_operation",
            operation = name,
            width = width,
            height = height
        );
        debug!(
            target: "glyph_mesh::timing",
            operation = name,
            width = width,
            height = height,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "glyph_mesh::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &crate::Mesh, context: &str) {
    let (width, height) = mesh
        .bounds()
        .map(|b| (b.width(), b.height()))
        .unwrap_or((0.0, 0.0));

    debug!(
        target: "glyph_mesh::mesh_state",
        context = context,
        points = mesh.point_count(),
        triangles = mesh.triangle_count(),
        dimensions = format!("{:.2} x {:.2}", width, height),
        "Mesh state"
    );
}
