//! Heat map rendering of a solution matrix
//!
//! Position runs along the horizontal axis and time increases upwards. The
//! temperature range is split into a number of equal-width levels, and each
//! level gets its own flat color, which produces filled contours.

use crate::GRADIENT;
use data::Precision;
use image::{ImageError, RgbImage};
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::{
    num::{NonZeroU32, NonZeroUsize},
    path::Path,
};
use thiserror::Error;

/// Heat map appearance
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Style {
    /// Number of filled contour levels
    pub levels: NonZeroUsize,

    /// Side of the square of pixels that represents one matrix element
    pub pixel_scale: NonZeroU32,
}
//
impl Default for Style {
    fn default() -> Self {
        Self {
            levels: NonZeroUsize::new(20).unwrap(),
            pixel_scale: NonZeroU32::new(4).unwrap(),
        }
    }
}

/// Failure to produce a heat map
#[derive(Debug, Error)]
pub enum RenderError {
    /// Nothing to draw
    #[error("cannot render an empty {rows}x{cols} solution matrix")]
    Empty {
        /// Number of time instants
        rows: usize,
        /// Number of grid points
        cols: usize,
    },

    /// Image would not fit in the image crate's u32 dimensions
    #[error("heat map of {rows}x{cols} elements at scale {scale} is too large")]
    TooLarge {
        /// Number of time instants
        rows: usize,
        /// Number of grid points
        cols: usize,
        /// Requested pixel scale
        scale: u32,
    },

    /// Temperatures must be finite to be mapped to colors
    #[error("cannot render non-finite temperature {0}")]
    NonFinite(Precision),

    /// Failed to encode or save the image
    #[error("failed to save heat map: {0}")]
    Image(#[from] ImageError),
}

/// Render a solution matrix (one row per time instant) as a heat map
pub fn heat_map(
    temperature: ArrayView2<Precision>,
    style: Style,
) -> Result<RgbImage, RenderError> {
    let (rows, cols) = temperature.dim();
    if rows == 0 || cols == 0 {
        return Err(RenderError::Empty { rows, cols });
    }
    let (min, max) = temperature
        .iter()
        .try_fold((Precision::INFINITY, Precision::NEG_INFINITY), |(min, max), &u| {
            if u.is_finite() {
                Ok((min.min(u), max.max(u)))
            } else {
                Err(RenderError::NonFinite(u))
            }
        })?;

    // Precompute the color of each level
    let levels = style.levels.get();
    let palette = (0..levels)
        .map(|level| {
            let color = GRADIENT.eval_continuous((level as f64 + 0.5) / levels as f64);
            [color.r, color.g, color.b]
        })
        .collect::<Vec<_>>();
    let level_of = |u: Precision| {
        if max > min {
            let level = ((u - min) / (max - min) * levels as Precision) as usize;
            level.min(levels - 1)
        } else {
            0
        }
    };

    // Paint pixel rows in parallel, with the last time instant on top
    let scale = style.pixel_scale.get();
    let too_large = || RenderError::TooLarge { rows, cols, scale };
    let width = u32::try_from(cols)
        .ok()
        .and_then(|cols| cols.checked_mul(scale))
        .ok_or_else(too_large)?;
    let height = u32::try_from(rows)
        .ok()
        .and_then(|rows| rows.checked_mul(scale))
        .ok_or_else(too_large)?;
    let row_bytes = 3 * width as usize;
    let mut pixels = vec![0u8; row_bytes * height as usize];
    pixels
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, line)| {
            let time_idx = rows - 1 - y / scale as usize;
            let field = temperature.row(time_idx);
            for (x, pixel) in line.chunks_exact_mut(3).enumerate() {
                pixel.copy_from_slice(&palette[level_of(field[x / scale as usize])]);
            }
        });
    RgbImage::from_raw(width, height, pixels).ok_or_else(too_large)
}

/// Render a solution matrix as a heat map and save it to a PNG file
pub fn save_heat_map(
    temperature: ArrayView2<Precision>,
    style: Style,
    path: impl AsRef<Path>,
) -> Result<(), RenderError> {
    heat_map(temperature, style)?.save(path)?;
    Ok(())
}
