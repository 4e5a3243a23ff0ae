use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{check_dimensions, GridError, Result};
use crate::geometry::GridRect;
use crate::marker::Marker;

/// The semantic role of a layer. Declaration order is paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Background,
    Collision,
    Event,
    Sprite,
    Interface,
}

impl LayerKind {
    pub const COUNT: usize = 5;

    /// Every kind, bottom to top.
    pub const ALL: [LayerKind; Self::COUNT] = [
        LayerKind::Background,
        LayerKind::Collision,
        LayerKind::Event,
        LayerKind::Sprite,
        LayerKind::Interface,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Background => "background",
            LayerKind::Collision => "collision",
            LayerKind::Event => "event",
            LayerKind::Sprite => "sprite",
            LayerKind::Interface => "interface",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LayerKind::Background => "Background",
            LayerKind::Collision => "Collision",
            LayerKind::Event => "Event",
            LayerKind::Sprite => "Sprite",
            LayerKind::Interface => "Interface",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        LayerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GridError::InvalidLayerKind(s.to_string()))
    }
}

/// Display metadata carried by every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerProperties {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
    /// Free-form editor metadata.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LayerProperties {
    pub fn for_kind(kind: LayerKind) -> Self {
        Self {
            name: kind.display_name().to_string(),
            visible: true,
            opacity: 1.0,
            extra: BTreeMap::new(),
        }
    }

    /// Store a named property.
    ///
    /// `name`, `visible` and `opacity` go to the typed fields and are only
    /// accepted with a string, boolean and number value respectively. An
    /// opacity that does not fit a finite `f32` is refused.
    /// Returns whether the value was stored.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        match (key, value) {
            ("name", Value::String(name)) => self.name = name,
            ("visible", Value::Bool(visible)) => self.visible = visible,
            ("opacity", Value::Number(n)) => {
                let opacity = n.as_f64().map_or(f32::NAN, |o| o as f32);
                if !opacity.is_finite() {
                    log::warn!("Ignoring layer opacity {} outside the f32 range", n);
                    return false;
                }
                self.opacity = opacity;
            }
            ("name" | "visible" | "opacity", value) => {
                log::warn!("Ignoring layer property '{}' with value {}", key, value);
                return false;
            }
            (_, value) => {
                self.extra.insert(key.to_string(), value);
            }
        }
        true
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::String(self.name.clone())),
            "visible" => Some(Value::Bool(self.visible)),
            "opacity" => Some(opacity_value(self.opacity)),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// Flatten into a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("visible".to_string(), Value::Bool(self.visible));
        map.insert("opacity".to_string(), opacity_value(self.opacity));
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    /// Apply every entry of `map` on top of the current values.
    pub fn merge(&mut self, map: &Map<String, Value>) {
        for (key, value) in map {
            self.set(key, value.clone());
        }
    }
}

static EMPTY: Marker = Marker::EMPTY;

fn opacity_value(opacity: f32) -> Value {
    Number::from_f64(f64::from(opacity))
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// A dense grid of markers for one layer kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    kind: LayerKind,
    width: u32,
    height: u32,
    /// Row-major, always `width * height` long.
    cells: Vec<Marker>,
    pub properties: LayerProperties,
}

impl Layer {
    pub fn new(kind: LayerKind, width: u32, height: u32, fill: impl Into<Marker>) -> Result<Self> {
        check_dimensions(width, height)?;
        let len = width as usize * height as usize;
        Ok(Self {
            kind,
            width,
            height,
            cells: vec![fill.into(); len],
            properties: LayerProperties::for_kind(kind),
        })
    }

    /// Construct from a kind name such as `"collision"`.
    pub fn named(kind: &str, width: u32, height: u32, fill: impl Into<Marker>) -> Result<Self> {
        Self::new(kind.parse()?, width, height, fill)
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// The marker at `(x, y)`, or the empty marker outside the grid.
    pub fn get(&self, x: i32, y: i32) -> &Marker {
        match self.index(x, y) {
            Some(idx) => &self.cells[idx],
            None => &EMPTY,
        }
    }

    /// Write a marker. Returns `false` (and changes nothing) outside the grid.
    pub fn set(&mut self, x: i32, y: i32, marker: impl Into<Marker>) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = marker.into();
                true
            }
            None => false,
        }
    }

    /// Fill the inclusive rectangle spanned by two corners, clipped to the grid.
    ///
    /// Returns the number of cells written.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, marker: impl Into<Marker>) -> usize {
        self.fill_area(GridRect::new(x0, y0, x1, y1), marker)
    }

    pub fn fill_area(&mut self, rect: GridRect, marker: impl Into<Marker>) -> usize {
        let Some(area) = rect.clip(self.width, self.height) else {
            return 0;
        };
        let marker = marker.into();
        let width = self.width as usize;
        let (x0, x1) = (area.min.x as usize, area.max.x as usize);
        for y in area.min.y as usize..=area.max.y as usize {
            let row = y * width;
            self.cells[row + x0..=row + x1].fill(marker.clone());
        }
        area.cell_count() as usize
    }

    pub fn clear(&mut self) {
        self.cells.fill(Marker::EMPTY);
    }

    /// Change dimensions, keeping the overlapping top-left region.
    ///
    /// The new grid is built aside and swapped in, so the layer is never
    /// observed half-resized.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_dimensions(width, height)?;
        if width == self.width && height == self.height {
            return Ok(());
        }

        let mut cells = vec![Marker::EMPTY; width as usize * height as usize];
        let keep_w = self.width.min(width) as usize;
        let keep_h = self.height.min(height) as usize;
        for y in 0..keep_h {
            let src = y * self.width as usize;
            let dst = y * width as usize;
            cells[dst..dst + keep_w].clone_from_slice(&self.cells[src..src + keep_w]);
        }

        log::debug!(
            "Resized {} layer {}x{} -> {}x{}",
            self.kind,
            self.width,
            self.height,
            width,
            height
        );
        self.cells = cells;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn set_property(&mut self, key: &str, value: Value) -> bool {
        self.properties.set(key, value)
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.properties.get(key)
    }

    pub fn is_visible(&self) -> bool {
        self.properties.visible
    }

    pub fn opacity(&self) -> f32 {
        self.properties.opacity
    }

    /// A single row, or `None` outside the grid.
    pub fn row(&self, y: u32) -> Option<&[Marker]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        Some(&self.cells[start..start + self.width as usize])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Marker]> {
        self.cells.chunks(self.width as usize)
    }

    /// Deep copy of the grid as nested rows.
    pub fn cells_snapshot(&self) -> Vec<Vec<Marker>> {
        self.rows().map(<[Marker]>::to_vec).collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|m| !m.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Dimension;

    fn layer() -> Layer {
        Layer::new(LayerKind::Background, 10, 10, Marker::EMPTY).unwrap()
    }

    #[test]
    fn test_layer_rejects_zero_dimensions() {
        assert_eq!(
            Layer::new(LayerKind::Sprite, 0, 4, "x").unwrap_err(),
            GridError::InvalidDimension(Dimension::Width)
        );
        assert!(layer().clone().resize(3, 0).is_err());
    }

    #[test]
    fn test_layer_named_kind() {
        let l = Layer::named("collision", 2, 2, "").unwrap();
        assert_eq!(l.kind(), LayerKind::Collision);
        assert_eq!(
            Layer::named("weather", 2, 2, "").unwrap_err(),
            GridError::InvalidLayerKind("weather".to_string())
        );
    }

    #[test]
    fn test_layer_fill_value() {
        let l = Layer::new(LayerKind::Background, 3, 2, "grass").unwrap();
        assert_eq!(l.occupied_count(), 6);
        assert_eq!(l.get(2, 1).as_str(), Some("grass"));
    }

    #[test]
    fn test_set_get_in_bounds() {
        let mut l = layer();
        for (x, y) in [(0, 0), (9, 9), (3, 7)] {
            assert!(l.set(x, y, "tree"));
            assert_eq!(l.get(x, y).as_str(), Some("tree"));
        }
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut l = layer();
        l.set(1, 1, "rock");
        let before = l.clone();
        for (x, y) in [(-1, 0), (0, -1), (10, 0), (0, 10), (i32::MIN, i32::MAX)] {
            assert!(!l.set(x, y, "x"));
            assert!(l.get(x, y).is_empty());
        }
        assert_eq!(l, before);
    }

    #[test]
    fn test_fill_rect_clips_to_bounds() {
        let mut l = layer();
        let written = l.fill_rect(-5, -5, 2, 2, "x");
        assert_eq!(written, 9);
        for y in 0..10 {
            for x in 0..10 {
                let expected = x <= 2 && y <= 2;
                assert_eq!(l.get(x, y).as_str() == Some("x"), expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_fill_rect_any_corner_order_and_outside() {
        let mut l = layer();
        assert_eq!(l.fill_rect(4, 4, 2, 3, "w"), 6);
        assert_eq!(l.get(3, 3).as_str(), Some("w"));
        assert_eq!(l.fill_rect(20, 20, 30, 30, "w"), 0);
        assert_eq!(l.occupied_count(), 6);
    }

    #[test]
    fn test_clear() {
        let mut l = Layer::new(LayerKind::Event, 4, 4, "door").unwrap();
        l.clear();
        assert_eq!(l.occupied_count(), 0);
    }

    #[test]
    fn test_resize_preserves_overlap() {
        let mut l = Layer::new(LayerKind::Sprite, 4, 3, Marker::EMPTY).unwrap();
        for y in 0..3 {
            for x in 0..4 {
                l.set(x, y, format!("{x},{y}"));
            }
        }

        l.resize(2, 5).unwrap();
        assert_eq!((l.width(), l.height()), (2, 5));
        assert_eq!(l.rows().count(), 5);
        assert!(l.rows().all(|row| row.len() == 2));
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(l.get(x, y).as_str(), Some(format!("{x},{y}").as_str()));
            }
        }
        assert!(l.get(0, 3).is_empty());
        assert!(l.get(1, 4).is_empty());
        assert!(l.get(3, 0).is_empty());

        l.resize(6, 6).unwrap();
        assert!(l.get(2, 0).is_empty());
        assert_eq!(l.get(1, 2).as_str(), Some("1,2"));
    }

    #[test]
    fn test_properties() {
        let mut l = layer();
        assert_eq!(l.property("name"), Some(Value::from("Background")));
        assert!(l.set_property("visible", Value::Bool(false)));
        assert!(l.set_property("opacity", Value::from(0.5)));
        assert!(l.set_property("locked", Value::Bool(true)));
        assert!(!l.set_property("visible", Value::from("nope")));

        assert!(!l.is_visible());
        assert!((l.opacity() - 0.5).abs() < 1e-6);
        assert_eq!(l.property("locked"), Some(Value::Bool(true)));
        assert_eq!(l.property("missing"), None);

        let map = l.properties.to_map();
        let mut other = LayerProperties::for_kind(LayerKind::Background);
        other.merge(&map);
        assert_eq!(other, l.properties);
    }

    #[test]
    fn test_opacity_beyond_f32_is_rejected() {
        let mut l = layer();
        assert!(l.set_property("opacity", Value::from(0.75)));
        assert!(!l.set_property("opacity", Value::from(1e300)));
        assert!(!l.set_property("opacity", Value::from(-1e39)));
        assert!((l.opacity() - 0.75).abs() < 1e-6);

        // Whatever was stored must survive a trip through the JSON map.
        let mut other = LayerProperties::for_kind(LayerKind::Background);
        other.merge(&l.properties.to_map());
        assert_eq!(other.opacity, l.opacity());
    }

    #[test]
    fn test_cells_snapshot_is_detached() {
        let mut l = Layer::new(LayerKind::Event, 3, 2, "").unwrap();
        l.set(2, 1, "door");
        let snapshot = l.cells_snapshot();
        l.clear();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|row| row.len() == 3));
        assert_eq!(snapshot[1][2], Marker::new("door"));
        assert_eq!(snapshot[0][0], Marker::EMPTY);
        assert!(l.get(2, 1).is_empty());
    }

    #[test]
    fn test_kind_parse_and_order() {
        assert_eq!("SPRITE".parse::<LayerKind>().unwrap(), LayerKind::Sprite);
        assert!("".parse::<LayerKind>().is_err());
        let indices: Vec<usize> = LayerKind::ALL.iter().map(|k| k.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }
}
