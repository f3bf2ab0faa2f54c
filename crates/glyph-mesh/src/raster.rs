//! Binary raster input and grayscale binarization.
//!
//! The pipeline consumes glyphs as binary rasters: a row-major grid where
//! `true` marks foreground (glyph ink) and `false` marks background.
//! Grayscale images are binarized on construction. Because rendering
//! conventions disagree on whether ink is dark-on-light or light-on-dark,
//! binarization normalizes polarity first so every later stage can assume
//! foreground is the `true` value.

use crate::error::{MeshError, MeshResult};

/// Foreground polarity of a grayscale image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "pipeline-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Polarity {
    /// Detect from mean intensity: a mean above the midpoint means the
    /// image is mostly bright, so the (minority) foreground must be dark
    /// and the image is inverted before thresholding.
    #[default]
    Auto,
    /// Foreground pixels are brighter than the threshold; no inversion.
    BrightForeground,
    /// Foreground pixels are darker than the threshold; image is inverted
    /// before thresholding.
    DarkForeground,
}

/// A binary raster in row-major order.
///
/// Coordinates follow image convention: `x` is the column (grows right),
/// `y` is the row (grows down). Everything outside the grid is background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Raster {
    /// Create a raster from pre-binarized pixels (`true` = foreground).
    ///
    /// # Errors
    ///
    /// Returns `MeshError::RasterSizeMismatch` if `bits.len()` is not
    /// `width * height`.
    pub fn from_bits(width: usize, height: usize, bits: Vec<bool>) -> MeshResult<Self> {
        if bits.len() != width * height {
            return Err(MeshError::raster_size_mismatch(width, height, bits.len()));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Create an all-background raster.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Binarize an 8-bit grayscale image with automatic polarity detection.
    ///
    /// Equivalent to `from_gray_with_polarity(.., Polarity::Auto)`: images
    /// whose mean intensity exceeds the midpoint (127) are treated as
    /// dark-on-light and inverted, then pixels strictly above `threshold`
    /// become foreground.
    ///
    /// # Errors
    ///
    /// Returns `MeshError::RasterSizeMismatch` if `data.len()` is not
    /// `width * height`.
    pub fn from_gray(data: &[u8], width: usize, height: usize, threshold: u8) -> MeshResult<Self> {
        Self::from_gray_with_polarity(data, width, height, threshold, Polarity::Auto)
    }

    /// Binarize an 8-bit grayscale image with an explicit polarity.
    ///
    /// Use this when the rendering convention is known up front (for
    /// example a rasterizer that always emits ink as 0 on a 255
    /// background), bypassing the mean-intensity heuristic.
    ///
    /// # Errors
    ///
    /// Returns `MeshError::RasterSizeMismatch` if `data.len()` is not
    /// `width * height`.
    pub fn from_gray_with_polarity(
        data: &[u8],
        width: usize,
        height: usize,
        threshold: u8,
        polarity: Polarity,
    ) -> MeshResult<Self> {
        if data.len() != width * height {
            return Err(MeshError::raster_size_mismatch(width, height, data.len()));
        }

        let invert = match polarity {
            Polarity::BrightForeground => false,
            Polarity::DarkForeground => true,
            Polarity::Auto => {
                if data.is_empty() {
                    false
                } else {
                    let sum: u64 = data.iter().map(|&v| v as u64).sum();
                    let mean = sum as f64 / data.len() as f64;
                    mean > 127.0
                }
            }
        };

        let bits = data
            .iter()
            .map(|&v| {
                let v = if invert { 255 - v } else { v };
                v > threshold
            })
            .collect();

        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Raster width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raster height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width and height as a pair.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Pixel at (x, y). Panics if out of range; use `is_foreground` for
    /// neighborhood probing that may step outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    /// Set the pixel at (x, y). Panics if out of range.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.bits[y * self.width + x] = value;
    }

    /// Foreground test with out-of-bounds treated as background.
    #[inline]
    pub fn is_foreground(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[y * self.width + x]
    }

    /// Number of foreground pixels.
    pub fn foreground_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Check whether the raster has no foreground at all.
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }
}
