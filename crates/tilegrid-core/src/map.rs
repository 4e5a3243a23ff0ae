use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{check_cell_size, check_dimensions, Result};
use crate::geometry::{GridPos, ScreenPoint};
use crate::layer::{Layer, LayerKind};
use crate::marker::Marker;
use crate::record::{LayerRecord, MapRecord};

/// RGB color used for map-level drawing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_f32_array(&self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        ]
    }

    /// Parse `#rrggbb` or `#rgb` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize, len: usize| u8::from_str_radix(&digits[i * len..(i + 1) * len], 16).ok();
        match digits.len() {
            6 => Some(Self::new(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            3 => Some(Self::new(channel(0, 1)? * 17, channel(1, 1)? * 17, channel(2, 1)? * 17)),
            _ => None,
        }
    }

    /// Read a color from JSON: an `{ "r", "g", "b" }` object or a hex string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(hex) => Self::from_hex(hex),
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }
}

/// Map-wide display settings and free-form metadata.
///
/// Deserializing never fails on a JSON object: entries go through
/// [`MapProperties::set`], so badly typed settings keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapProperties {
    pub name: String,
    pub background_color: Color,
    pub grid_color: Color,
    pub show_grid: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for MapProperties {
    fn default() -> Self {
        Self {
            name: "Untitled Map".to_string(),
            background_color: Color::new(30, 30, 30),
            grid_color: Color::new(68, 68, 68),
            show_grid: true,
            extra: BTreeMap::new(),
        }
    }
}

impl MapProperties {
    /// Store a named property.
    ///
    /// `name` and `showGrid` need a string and a boolean; `backgroundColor`
    /// and `gridColor` need a color object or a hex string. Anything else
    /// is kept in `extra`. Returns whether the value was stored.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        match (key, value) {
            ("name", Value::String(name)) => self.name = name,
            ("showGrid", Value::Bool(show)) => self.show_grid = show,
            ("backgroundColor" | "gridColor", value) => {
                let Some(color) = Color::from_value(&value) else {
                    log::warn!("Ignoring map property '{}' with value {}", key, value);
                    return false;
                };
                if key == "gridColor" {
                    self.grid_color = color;
                } else {
                    self.background_color = color;
                }
            }
            ("name" | "showGrid", value) => {
                log::warn!("Ignoring map property '{}' with value {}", key, value);
                return false;
            }
            (_, value) => {
                self.extra.insert(key.to_string(), value);
            }
        }
        true
    }

    /// Apply every entry of `map` on top of the current values.
    pub fn merge(&mut self, map: &Map<String, Value>) {
        for (key, value) in map {
            self.set(key, value.clone());
        }
    }
}

impl<'de> Deserialize<'de> for MapProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut properties = MapProperties::default();
        match Value::deserialize(deserializer)? {
            Value::Object(map) => properties.merge(&map),
            Value::Null => {}
            other => log::warn!("Ignoring map properties that are not an object: {}", other),
        }
        Ok(properties)
    }
}

/// Construction parameters for a [`GridMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridMapConfig {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
    /// Initial marker per layer kind; unlisted kinds start empty.
    pub fills: BTreeMap<LayerKind, Marker>,
}

impl Default for GridMapConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 15,
            cell_size: 32,
            fills: BTreeMap::new(),
        }
    }
}

/// Camera offset in screen pixels. Unclamped: negative or past-edge values
/// scroll the view beyond the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
}

/// The markers of every layer at one coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStack {
    markers: [Marker; LayerKind::COUNT],
}

impl CellStack {
    pub fn get(&self, kind: LayerKind) -> &Marker {
        &self.markers[kind.index()]
    }

    /// Every layer in paint order, empty markers included.
    pub fn iter(&self) -> impl Iterator<Item = (LayerKind, &Marker)> {
        LayerKind::ALL.into_iter().zip(self.markers.iter())
    }

    pub fn occupied(&self) -> impl Iterator<Item = (LayerKind, &Marker)> {
        self.iter().filter(|(_, marker)| !marker.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.markers.iter().all(Marker::is_empty)
    }
}

/// A tile map: five stacked layers sharing one size, plus a camera.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    width: u32,
    height: u32,
    cell_size: u32,
    /// Indexed by `LayerKind::index`.
    layers: [Layer; LayerKind::COUNT],
    pub properties: MapProperties,
    camera: Camera,
}

impl GridMap {
    pub fn new(width: u32, height: u32, cell_size: u32) -> Result<Self> {
        Self::with_config(&GridMapConfig {
            width,
            height,
            cell_size,
            fills: BTreeMap::new(),
        })
    }

    pub fn with_config(config: &GridMapConfig) -> Result<Self> {
        check_dimensions(config.width, config.height)?;
        check_cell_size(config.cell_size)?;

        let [background, collision, event, sprite, interface] = LayerKind::ALL.map(|kind| {
            let fill = config.fills.get(&kind).cloned().unwrap_or_default();
            Layer::new(kind, config.width, config.height, fill)
        });

        Ok(Self {
            width: config.width,
            height: config.height,
            cell_size: config.cell_size,
            layers: [background?, collision?, event?, sprite?, interface?],
            properties: MapProperties::default(),
            camera: Camera::default(),
        })
    }

    /// Build a map from a record, see [`GridMap::import_record`].
    pub fn from_record(record: &MapRecord) -> Result<Self> {
        let mut map = Self::new(record.width, record.height, record.cell_size)?;
        map.import_record(record)?;
        Ok(map)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn set_cell_size(&mut self, cell_size: u32) -> Result<()> {
        check_cell_size(cell_size)?;
        self.cell_size = cell_size;
        Ok(())
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.layers[0].in_bounds(x, y)
    }

    // ── Layers ───────────────────────────────────────────────────────

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        &self.layers[kind.index()]
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Layer {
        &mut self.layers[kind.index()]
    }

    pub fn layer_by_name(&self, kind: &str) -> Result<&Layer> {
        Ok(self.layer(kind.parse()?))
    }

    pub fn layer_by_name_mut(&mut self, kind: &str) -> Result<&mut Layer> {
        Ok(self.layer_mut(kind.parse()?))
    }

    /// All layers in paint order: background first, interface last.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    pub fn cell(&self, kind: LayerKind, x: i32, y: i32) -> &Marker {
        self.layer(kind).get(x, y)
    }

    pub fn set_cell(&mut self, kind: LayerKind, x: i32, y: i32, marker: impl Into<Marker>) -> bool {
        self.layer_mut(kind).set(x, y, marker)
    }

    /// One lookup per layer at `(x, y)`.
    pub fn cell_content(&self, x: i32, y: i32) -> CellStack {
        CellStack {
            markers: LayerKind::ALL.map(|kind| self.cell(kind, x, y).clone()),
        }
    }

    /// Resize every layer, keeping the overlapping top-left region.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_dimensions(width, height)?;
        for layer in &mut self.layers {
            layer.resize(width, height)?;
        }
        log::debug!(
            "Resized map '{}' {}x{} -> {}x{}",
            self.properties.name,
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        Ok(())
    }

    // ── Camera & coordinate spaces ───────────────────────────────────

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn set_camera(&mut self, x: f64, y: f64) {
        self.camera = Camera { x, y };
    }

    pub fn move_camera(&mut self, dx: f64, dy: f64) {
        self.camera.x += dx;
        self.camera.y += dy;
    }

    /// The cell under a screen position.
    pub fn screen_to_grid(&self, screen_x: f64, screen_y: f64) -> GridPos {
        let size = f64::from(self.cell_size);
        GridPos::new(
            ((screen_x + self.camera.x) / size).floor() as i32,
            ((screen_y + self.camera.y) / size).floor() as i32,
        )
    }

    /// The screen position of a cell's center.
    pub fn grid_to_screen(&self, grid_x: i32, grid_y: i32) -> ScreenPoint {
        let half = f64::from(self.cell_size) / 2.0;
        self.cell_origin(grid_x, grid_y).translate(half, half)
    }

    /// The screen position of a cell's top-left corner.
    pub fn cell_origin(&self, grid_x: i32, grid_y: i32) -> ScreenPoint {
        let size = f64::from(self.cell_size);
        ScreenPoint::new(
            f64::from(grid_x) * size - self.camera.x,
            f64::from(grid_y) * size - self.camera.y,
        )
    }

    // ── Serialization ────────────────────────────────────────────────

    /// A deep, independent snapshot of the map.
    pub fn export_data(&self) -> MapRecord {
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                let cells = layer
                    .rows()
                    .map(|row| row.iter().cloned().map(Some).collect::<Vec<_>>())
                    .collect();
                let record = LayerRecord {
                    cells,
                    properties: layer.properties.to_map(),
                };
                (layer.kind(), record)
            })
            .collect();

        MapRecord {
            width: self.width,
            height: self.height,
            cell_size: self.cell_size,
            properties: self.properties.clone(),
            layers,
        }
    }

    /// Import an untrusted record such as a parsed save file.
    ///
    /// Returns `false` without touching the map when a required field is
    /// missing or the record cannot be applied.
    pub fn import_data(&mut self, value: &Value) -> bool {
        let missing = MapRecord::missing_fields(value);
        if !missing.is_empty() {
            log::warn!("Rejected map record: missing {}", missing.join(", "));
            return false;
        }
        let record: MapRecord = match serde_json::from_value(value.clone()) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Rejected map record: {}", e);
                return false;
            }
        };
        match self.import_record(&record) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Rejected map record: {}", e);
                false
            }
        }
    }

    /// Merge a record into this map.
    ///
    /// Dimensions, cell size and map properties are adopted. For each layer
    /// in the record, cells present in the source overwrite the target and
    /// `null` or missing cells keep their current value; source cells beyond
    /// the new bounds are dropped. Layer properties are merged key by key.
    /// Layers absent from the record keep their content.
    pub fn import_record(&mut self, record: &MapRecord) -> Result<()> {
        check_dimensions(record.width, record.height)?;
        check_cell_size(record.cell_size)?;

        self.resize(record.width, record.height)?;
        self.cell_size = record.cell_size;
        self.properties = record.properties.clone();

        let (width, height) = (record.width as usize, record.height as usize);
        for (&kind, source) in &record.layers {
            let layer = self.layer_mut(kind);
            for (y, row) in source.cells.iter().take(height).enumerate() {
                for (x, cell) in row.iter().take(width).enumerate() {
                    if let Some(marker) = cell {
                        // Both indices are below u32 dimensions.
                        layer.set(x as i32, y as i32, marker.clone());
                    }
                }
            }
            layer.properties.merge(&source.properties);
        }

        log::debug!(
            "Imported map '{}' ({}x{}, {} layers)",
            self.properties.name,
            self.width,
            self.height,
            record.layers.len()
        );
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export_data())
    }
}
