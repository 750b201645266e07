//! Rendering for Easel scenes: the grid tile, hit testing, on-screen
//! painting through Vello and headless PNG export.

pub mod export;
pub mod grid;
pub mod hit;
pub mod paint;

pub use export::{ExportedImage, export_png, render_export};
pub use grid::grid_tile;
pub use hit::{Hit, hit_test};
pub use paint::{PaintCache, paint_scene};
