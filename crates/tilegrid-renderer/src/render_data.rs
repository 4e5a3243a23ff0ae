use serde::{Deserialize, Serialize};
use tilegrid_core::{LayerKind, ScreenPoint};

use crate::rasterizer::{PaintOptions, Rasterizer};

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Paint {
        marker: String,
        x: f64,
        y: f64,
        size: f64,
        alpha: f32,
        layer: LayerKind,
        highlighted: bool,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: [f32; 4], // RGBA
    },
    StrokeLine {
        from: ScreenPoint,
        to: ScreenPoint,
        color: [f32; 4],
        width: f64,
    },
    Save,
    Restore,
}

/// A [`Rasterizer`] that records every call instead of drawing.
///
/// The serialized list is what a frontend canvas replays each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// `(marker, x, y, alpha)` for every paint call, in order.
    pub fn paints(&self) -> impl Iterator<Item = (&str, f64, f64, f32)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Paint {
                marker, x, y, alpha, ..
            } => Some((marker.as_str(), *x, *y, *alpha)),
            _ => None,
        })
    }

    pub fn paint_count(&self) -> usize {
        self.paints().count()
    }

    /// Layers in the order they were first painted.
    pub fn painted_layers(&self) -> Vec<LayerKind> {
        let mut layers = Vec::new();
        for command in &self.commands {
            if let DrawCommand::Paint { layer, .. } = command {
                if layers.last() != Some(layer) {
                    layers.push(*layer);
                }
            }
        }
        layers
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Rasterizer for DrawList {
    fn paint(&mut self, marker: &str, x: f64, y: f64, size: f64, options: &PaintOptions) {
        self.commands.push(DrawCommand::Paint {
            marker: marker.to_string(),
            x,
            y,
            size,
            alpha: options.alpha,
            layer: options.layer,
            highlighted: options.highlighted,
        });
    }

    fn surface_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: [f32; 4]) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn stroke_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: [f32; 4], line_width: f64) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            color,
            width: line_width,
        });
    }
}
