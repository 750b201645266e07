//! The background grid tile.
//!
//! One `size × size` tile: a flat background with a single line along the
//! top row and the left column. Repeating it from the drawing-area origin
//! gives the workspace grid.

use easel_core::GridConfig;
use image::{Rgba, RgbaImage};

/// Rasterize one grid tile (straight-alpha RGBA8).
pub fn grid_tile(cfg: &GridConfig) -> RgbaImage {
    let size = cfg.size.max(1);
    let bg = Rgba(cfg.background.to_rgba8());
    let line = Rgba(cfg.line.to_rgba8());
    RgbaImage::from_fn(size, size, |x, y| if x == 0 || y == 0 { line } else { bg })
}

/// Top-left corners of the tiles needed to cover `width × height`,
/// relative to the covered box's origin.
pub fn tile_origins(width: f64, height: f64, size: u32) -> impl Iterator<Item = (f64, f64)> {
    let step = f64::from(size.max(1));
    let cols = (width / step).ceil().max(0.0) as u32;
    let rows = (height / step).ceil().max(0.0) as u32;
    (0..rows).flat_map(move |r| (0..cols).map(move |c| (f64::from(c) * step, f64::from(r) * step)))
}
