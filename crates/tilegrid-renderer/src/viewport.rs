use std::ops::Range;

use serde::{Deserialize, Serialize};
use tilegrid_core::GridMap;

/// The drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
        }
    }

    /// Cells of `map` that intersect this viewport at the map's camera.
    pub fn visible_range(&self, map: &GridMap) -> VisibleRange {
        let camera = map.camera();
        let size = f64::from(map.cell_size());
        VisibleRange {
            columns: axis_range(camera.x, self.canvas_width, size, map.width()),
            rows: axis_range(camera.y, self.canvas_height, size, map.height()),
        }
    }
}

/// Half-open column and row ranges of the cells worth visiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub columns: Range<u32>,
    pub rows: Range<u32>,
}

impl VisibleRange {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.columns.len() * self.rows.len()
    }
}

/// `floor(camera / size) ..= ceil((camera + extent) / size)`, clamped to
/// `[0, dimension - 1]`.
fn axis_range(camera: f64, extent: f64, size: f64, dimension: u32) -> Range<u32> {
    let first = (camera / size).floor() as i64;
    let last = ((camera + extent) / size).ceil() as i64;
    let lo = first.max(0);
    let hi = last.min(i64::from(dimension) - 1);
    if hi < lo {
        return 0..0;
    }
    // lo and hi are within [0, dimension - 1].
    lo as u32..hi as u32 + 1
}
