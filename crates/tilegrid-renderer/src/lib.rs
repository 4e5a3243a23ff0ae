//! # Tilegrid Renderer
//!
//! Camera-relative drawing of a tile map. The renderer computes which cells
//! the viewport can see, draws grid lines, and paints each visible layer in
//! fixed order through a [`Rasterizer`] supplied by the host.
//!
//! [`DrawList`] records the calls as JSON-serializable commands for a
//! frontend canvas to replay.

pub mod rasterizer;
pub mod render_data;
pub mod renderer;
pub mod viewport;

pub use rasterizer::{PaintOptions, Rasterizer};
pub use render_data::{DrawCommand, DrawList};
pub use renderer::{FrameStats, GridRenderer, RenderError, RenderOptions};
pub use viewport::{Viewport, VisibleRange};
