use serde::{Deserialize, Serialize};
use tilegrid_core::{LayerKind, ScreenPoint};

/// Per-paint settings handed to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintOptions {
    /// Multiplier in `[0, 1]` applied to the painted marker.
    pub alpha: f32,
    pub layer: LayerKind,
    /// Set for markers painted as part of a hover highlight.
    pub highlighted: bool,
}

/// The drawing backend a [`GridRenderer`](crate::GridRenderer) paints into.
///
/// Implementations turn a marker token into pixels (glyph, sprite, tile
/// image). All positions are in surface pixels.
pub trait Rasterizer {
    /// Draw `marker` centered at `(x, y)`, `size` pixels across.
    fn paint(&mut self, marker: &str, x: f64, y: f64, size: f64, options: &PaintOptions);

    /// Current surface `(width, height)` in pixels.
    fn surface_size(&self) -> (f64, f64);

    /// Push drawing state; fills and strokes until the matching
    /// [`restore`](Rasterizer::restore) must not leak out.
    fn save(&mut self);

    fn restore(&mut self);

    /// Fill an axis-aligned rectangle with an RGBA color.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: [f32; 4]);

    fn stroke_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: [f32; 4], line_width: f64);
}
