//! Terminal output: pixel canvas, primitive rasterizer and glyph encoders.

pub mod braille;
pub mod canvas;
pub mod halfblock;
pub mod raster;

pub use canvas::{Canvas, ColorMode, RenderMode};
pub use raster::{Projection, rasterize};
