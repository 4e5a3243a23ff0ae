use serde::{Deserialize, Serialize};
use thiserror::Error;
use tilegrid_core::{Color, GridMap, GridRect, ScreenPoint};

use crate::rasterizer::{PaintOptions, Rasterizer};
use crate::viewport::{Viewport, VisibleRange};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid render options: {0}")]
    InvalidOptions(String),
}

/// Renderer settings that are not part of the map itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Clear the surface with the map background color before drawing.
    pub fill_background: bool,
    pub grid_line_width: f64,
    pub highlight_color: Color,
    pub highlight_alpha: f32,
    pub selection_color: Color,
    pub selection_alpha: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fill_background: true,
            grid_line_width: 1.0,
            highlight_color: Color::new(255, 255, 255),
            highlight_alpha: 0.25,
            selection_color: Color::new(64, 156, 255),
            selection_alpha: 0.3,
        }
    }
}

impl RenderOptions {
    fn validate(&self) -> Result<(), RenderError> {
        if !self.grid_line_width.is_finite() || self.grid_line_width < 0.0 {
            return Err(RenderError::InvalidOptions(format!(
                "grid line width {} must be a non-negative number",
                self.grid_line_width
            )));
        }
        for (name, alpha) in [
            ("highlight", self.highlight_alpha),
            ("selection", self.selection_alpha),
        ] {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(RenderError::InvalidOptions(format!(
                    "{name} alpha {alpha} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// What a frame touched, for culling diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub cells_visited: usize,
    pub paint_calls: usize,
    pub layers_drawn: usize,
}

/// Draws a [`GridMap`] through a [`Rasterizer`].
///
/// The renderer holds only options; it reads the map and never changes it.
/// Only cells inside the visible range are visited, so a frame costs time
/// proportional to the viewport, not the map.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRenderer {
    options: RenderOptions,
}

impl GridRenderer {
    pub fn new(options: RenderOptions) -> Result<Self, RenderError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Cells of `map` visible on the rasterizer's current surface.
    pub fn visible_range<R: Rasterizer + ?Sized>(&self, map: &GridMap, rasterizer: &R) -> VisibleRange {
        let (width, height) = rasterizer.surface_size();
        Viewport::new(width, height).visible_range(map)
    }

    /// Draw a full frame: background, grid lines, then every visible layer
    /// bottom to top.
    pub fn render<R: Rasterizer + ?Sized>(&self, map: &GridMap, rasterizer: &mut R) -> FrameStats {
        let (width, height) = rasterizer.surface_size();
        let range = Viewport::new(width, height).visible_range(map);
        let mut stats = FrameStats::default();

        if self.options.fill_background {
            rasterizer.save();
            rasterizer.fill_rect(
                0.0,
                0.0,
                width,
                height,
                map.properties.background_color.to_f32_array(1.0),
            );
            rasterizer.restore();
        }

        if range.is_empty() {
            return stats;
        }

        if map.properties.show_grid {
            self.draw_grid(map, &range, rasterizer);
        }

        let size = f64::from(map.cell_size());
        for layer in map.layers() {
            if !layer.is_visible() {
                continue;
            }
            stats.layers_drawn += 1;
            let options = PaintOptions {
                alpha: layer.opacity().clamp(0.0, 1.0),
                layer: layer.kind(),
                highlighted: false,
            };

            for y in range.rows.clone() {
                let Some(row) = layer.row(y) else {
                    continue;
                };
                for x in range.columns.clone() {
                    stats.cells_visited += 1;
                    let Some(token) = row[x as usize].as_str() else {
                        continue;
                    };
                    // Visible indices fit i32: they are below a u32 dimension
                    // reached through i32 coordinates.
                    let center = map.grid_to_screen(x as i32, y as i32);
                    rasterizer.paint(token, center.x, center.y, size, &options);
                    stats.paint_calls += 1;
                }
            }
        }

        log::trace!(
            "Rendered {} cells, {} paints over {} layers",
            stats.cells_visited,
            stats.paint_calls,
            stats.layers_drawn
        );
        stats
    }

    /// Grid lines around the visible cells, clipped to the map extent.
    fn draw_grid<R: Rasterizer + ?Sized>(&self, map: &GridMap, range: &VisibleRange, rasterizer: &mut R) {
        let color = map.properties.grid_color.to_f32_array(1.0);
        let width = self.options.grid_line_width;
        let top_left = map.cell_origin(range.columns.start as i32, range.rows.start as i32);
        let bottom_right = map.cell_origin(range.columns.end as i32, range.rows.end as i32);

        rasterizer.save();
        for col in range.columns.start..=range.columns.end {
            let x = map.cell_origin(col as i32, 0).x;
            rasterizer.stroke_line(
                ScreenPoint::new(x, top_left.y),
                ScreenPoint::new(x, bottom_right.y),
                color,
                width,
            );
        }
        for row in range.rows.start..=range.rows.end {
            let y = map.cell_origin(0, row as i32).y;
            rasterizer.stroke_line(
                ScreenPoint::new(top_left.x, y),
                ScreenPoint::new(bottom_right.x, y),
                color,
                width,
            );
        }
        rasterizer.restore();
    }

    /// Hover feedback: a translucent box over one cell plus every marker
    /// stacked on it. Returns `false` and draws nothing outside the map.
    pub fn render_highlight<R: Rasterizer + ?Sized>(
        &self,
        map: &GridMap,
        x: i32,
        y: i32,
        rasterizer: &mut R,
    ) -> bool {
        if !map.in_bounds(x, y) {
            return false;
        }
        let size = f64::from(map.cell_size());
        let origin = map.cell_origin(x, y);
        let center = map.grid_to_screen(x, y);

        rasterizer.save();
        rasterizer.fill_rect(
            origin.x,
            origin.y,
            size,
            size,
            self.options
                .highlight_color
                .to_f32_array(self.options.highlight_alpha),
        );
        for (kind, marker) in map.cell_content(x, y).occupied() {
            if let Some(token) = marker.as_str() {
                let options = PaintOptions {
                    alpha: 1.0,
                    layer: kind,
                    highlighted: true,
                };
                rasterizer.paint(token, center.x, center.y, size, &options);
            }
        }
        rasterizer.restore();
        true
    }

    /// A translucent, outlined box over the cells between two corners,
    /// clipped to the map. Returns `false` when nothing of it is on the map.
    pub fn render_selection<R: Rasterizer + ?Sized>(
        &self,
        map: &GridMap,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        rasterizer: &mut R,
    ) -> bool {
        let Some(area) = GridRect::new(x0, y0, x1, y1).clip(map.width(), map.height()) else {
            return false;
        };
        let size = f64::from(map.cell_size());
        let min = map.cell_origin(area.min.x, area.min.y);
        let (w, h) = (area.width() as f64 * size, area.height() as f64 * size);
        let color = self.options.selection_color;

        rasterizer.save();
        rasterizer.fill_rect(min.x, min.y, w, h, color.to_f32_array(self.options.selection_alpha));
        let outline = color.to_f32_array(1.0);
        let corners = [
            min,
            min.translate(w, 0.0),
            min.translate(w, h),
            min.translate(0.0, h),
        ];
        for i in 0..corners.len() {
            let next = corners[(i + 1) % corners.len()];
            rasterizer.stroke_line(corners[i], next, outline, self.options.grid_line_width.max(1.0));
        }
        rasterizer.restore();
        true
    }
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self {
            options: RenderOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_data::{DrawCommand, DrawList};
    use serde_json::json;
    use tilegrid_core::LayerKind;

    fn bare_renderer() -> GridRenderer {
        GridRenderer::new(RenderOptions {
            fill_background: false,
            ..RenderOptions::default()
        })
        .unwrap()
    }

    fn hidden_grid_map(width: u32, height: u32) -> GridMap {
        let mut map = GridMap::new(width, height, 32).unwrap();
        map.properties.show_grid = false;
        map
    }

    #[test]
    fn test_options_validation() {
        assert!(GridRenderer::new(RenderOptions::default()).is_ok());
        let bad_width = RenderOptions {
            grid_line_width: f64::NAN,
            ..RenderOptions::default()
        };
        assert!(GridRenderer::new(bad_width).is_err());
        let bad_alpha = RenderOptions {
            selection_alpha: 1.5,
            ..RenderOptions::default()
        };
        assert!(matches!(
            GridRenderer::new(bad_alpha),
            Err(RenderError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_only_visible_cells_are_visited() {
        let mut map = hidden_grid_map(1000, 1000);
        map.layer_mut(LayerKind::Background).fill_rect(0, 0, 999, 999, "grass");
        map.set_camera(64.0, 64.0);
        let mut list = DrawList::new(320.0, 320.0);

        let stats = bare_renderer().render(&map, &mut list);
        // Columns and rows 2..=12, on each of the five layers.
        assert_eq!(stats.cells_visited, 11 * 11 * 5);
        assert_eq!(stats.paint_calls, 121);
        assert_eq!(list.paint_count(), 121);
        let (_, x, y, _) = list.paints().next().unwrap();
        assert_eq!((x, y), (16.0, 16.0));
    }

    #[test]
    fn test_layers_paint_in_fixed_order() {
        let mut map = hidden_grid_map(3, 3);
        map.set_cell(LayerKind::Interface, 0, 0, "cursor");
        map.set_cell(LayerKind::Sprite, 0, 0, "hero");
        map.set_cell(LayerKind::Background, 0, 0, "floor");
        map.set_cell(LayerKind::Event, 0, 0, "trap");
        map.set_cell(LayerKind::Collision, 0, 0, "block");
        let mut list = DrawList::new(96.0, 96.0);

        bare_renderer().render(&map, &mut list);
        assert_eq!(list.painted_layers(), LayerKind::ALL.to_vec());
        let markers: Vec<&str> = list.paints().map(|(m, ..)| m).collect();
        assert_eq!(markers, vec!["floor", "block", "trap", "hero", "cursor"]);
    }

    #[test]
    fn test_hidden_layer_skipped_and_opacity_applied() {
        let mut map = hidden_grid_map(2, 2);
        map.set_cell(LayerKind::Collision, 1, 1, "wall");
        map.set_cell(LayerKind::Sprite, 0, 1, "ghost");
        map.layer_mut(LayerKind::Collision).set_property("visible", json!(false));
        map.layer_mut(LayerKind::Sprite).set_property("opacity", json!(0.5));
        let mut list = DrawList::new(64.0, 64.0);

        let stats = bare_renderer().render(&map, &mut list);
        assert_eq!(stats.layers_drawn, 4);
        let paints: Vec<_> = list.paints().collect();
        assert_eq!(paints, vec![("ghost", 16.0, 48.0, 0.5)]);
    }

    #[test]
    fn test_background_and_grid_come_first() {
        let mut map = GridMap::new(2, 2, 32).unwrap();
        map.set_cell(LayerKind::Background, 0, 0, "floor");
        let mut list = DrawList::new(64.0, 64.0);

        GridRenderer::default().render(&map, &mut list);
        assert!(matches!(list.commands[1], DrawCommand::FillRect { .. }));
        let strokes = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
            .count();
        // Three vertical and three horizontal boundaries for a 2x2 map.
        assert_eq!(strokes, 6);
        assert!(matches!(list.commands.last(), Some(DrawCommand::Paint { .. })));
    }

    #[test]
    fn test_offscreen_map_paints_nothing() {
        let mut map = hidden_grid_map(5, 5);
        map.layer_mut(LayerKind::Sprite).fill_rect(0, 0, 4, 4, "bat");
        map.set_camera(-5000.0, 0.0);
        let mut list = DrawList::new(320.0, 240.0);
        let stats = bare_renderer().render(&map, &mut list);
        assert_eq!(stats, FrameStats::default());
        assert!(list.commands.is_empty());
    }

    #[test]
    fn test_highlight() {
        let mut map = hidden_grid_map(4, 4);
        map.set_cell(LayerKind::Background, 2, 1, "grass");
        map.set_cell(LayerKind::Event, 2, 1, "sign");
        map.layer_mut(LayerKind::Event).set_property("visible", json!(false));
        let renderer = bare_renderer();
        let mut list = DrawList::new(128.0, 128.0);

        assert!(!renderer.render_highlight(&map, 4, 0, &mut list));
        assert!(!renderer.render_highlight(&map, -1, 2, &mut list));
        assert!(list.commands.is_empty());

        assert!(renderer.render_highlight(&map, 2, 1, &mut list));
        assert_eq!(list.commands.first(), Some(&DrawCommand::Save));
        assert_eq!(list.commands.last(), Some(&DrawCommand::Restore));
        assert!(matches!(
            list.commands[1],
            DrawCommand::FillRect { x, y, width, .. } if x == 64.0 && y == 32.0 && width == 32.0
        ));
        let markers: Vec<&str> = list.paints().map(|(m, ..)| m).collect();
        assert_eq!(markers, vec!["grass", "sign"]);
    }

    #[test]
    fn test_selection_is_clipped() {
        let mut map = hidden_grid_map(4, 4);
        map.set_camera(32.0, 0.0);
        let renderer = bare_renderer();
        let mut list = DrawList::new(128.0, 128.0);

        assert!(!renderer.render_selection(&map, 10, 10, 12, 12, &mut list));
        assert!(renderer.render_selection(&map, 6, 1, -3, 0, &mut list));
        assert_eq!(
            list.commands[1],
            DrawCommand::FillRect {
                x: -32.0,
                y: 0.0,
                width: 128.0,
                height: 64.0,
                color: Color::new(64, 156, 255).to_f32_array(0.3),
            }
        );
        let outline = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
            .count();
        assert_eq!(outline, 4);
    }
}
