use serde::{Deserialize, Serialize};

/// A cell coordinate. May lie outside any grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A position in screen (canvas) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    pub min: GridPos,
    pub max: GridPos,
}

impl GridRect {
    /// Build from two opposite corners given in any order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: GridPos::new(x0.min(x1), y0.min(y1)),
            max: GridPos::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Number of columns. A rectangle spanning all of `i32` has 2^32.
    pub fn width(&self) -> u64 {
        u64::from(self.max.x.abs_diff(self.min.x)) + 1
    }

    pub fn height(&self) -> u64 {
        u64::from(self.max.y.abs_diff(self.min.y)) + 1
    }

    pub fn cell_count(&self) -> u64 {
        self.width().saturating_mul(self.height())
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    /// Intersect with a `width x height` grid anchored at the origin.
    ///
    /// Returns `None` when nothing of the rectangle lies inside.
    pub fn clip(&self, width: u32, height: u32) -> Option<GridRect> {
        let max_x = i64::from(width) - 1;
        let max_y = i64::from(height) - 1;
        let (min_x, min_y) = (i64::from(self.min.x).max(0), i64::from(self.min.y).max(0));
        let (hi_x, hi_y) = (i64::from(self.max.x).min(max_x), i64::from(self.max.y).min(max_y));
        if min_x > hi_x || min_y > hi_y {
            return None;
        }
        // All four values are within [0, i32::MAX] here.
        Some(GridRect {
            min: GridPos::new(min_x as i32, min_y as i32),
            max: GridPos::new(hi_x as i32, hi_y as i32),
        })
    }

    /// Row-major iteration over every cell of the rectangle.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| GridPos::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let r = GridRect::new(4, 7, 1, 2);
        assert_eq!(r.min, GridPos::new(1, 2));
        assert_eq!(r.max, GridPos::new(4, 7));
        assert_eq!(r.width(), 4);
        assert_eq!(r.height(), 6);
    }

    #[test]
    fn test_rect_clip() {
        let r = GridRect::new(-5, -5, 2, 2);
        let clipped = r.clip(10, 10).unwrap();
        assert_eq!(clipped, GridRect::new(0, 0, 2, 2));

        assert!(GridRect::new(10, 0, 12, 3).clip(10, 10).is_none());
        assert!(GridRect::new(-3, -3, -1, -1).clip(10, 10).is_none());
        assert_eq!(GridRect::new(-1, -1, 50, 50).clip(4, 3), Some(GridRect::new(0, 0, 3, 2)));
    }

    #[test]
    fn test_rect_spanning_all_of_i32() {
        let r = GridRect::new(i32::MIN, i32::MIN, i32::MAX, 0);
        assert_eq!(r.width(), 1 << 32);
        assert_eq!(r.height(), (1 << 31) + 1);
        assert_eq!(r.cell_count(), (1 << 63) + (1 << 32));
        assert_eq!(r.clip(3, 2), Some(GridRect::new(0, 0, 2, 0)));

        let all = GridRect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(all.cell_count(), u64::MAX);
    }

    #[test]
    fn test_contains_and_offset() {
        let r = GridRect::new(2, 2, 4, 3);
        assert!(r.contains(GridPos::new(2, 2)));
        assert!(r.contains(GridPos::new(4, 3)));
        assert!(!r.contains(GridPos::new(5, 3)));
        assert!(!r.contains(GridPos::new(2, 1)));

        let p = GridPos::new(1, 1).offset(1, 2);
        assert_eq!(p, GridPos::new(2, 3));
        assert!(r.contains(p));
        assert_eq!(GridPos::new(i32::MAX, 0).offset(1, -1), GridPos::new(i32::MAX, -1));
    }

    #[test]
    fn test_rect_positions_row_major() {
        let cells: Vec<GridPos> = GridRect::new(0, 0, 1, 1).positions().collect();
        assert_eq!(
            cells,
            vec![
                GridPos::new(0, 0),
                GridPos::new(1, 0),
                GridPos::new(0, 1),
                GridPos::new(1, 1)
            ]
        );
    }
}
