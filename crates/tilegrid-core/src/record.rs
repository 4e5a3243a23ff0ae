//! The plain-data form of a [`GridMap`](crate::GridMap) used for saving and
//! exchanging maps.
//!
//! ```json
//! {
//!   "width": 10, "height": 10, "cellSize": 32,
//!   "properties": { "name": "Town", "showGrid": true, ... },
//!   "layers": {
//!     "collision": { "cells": [["wall", "", ...], ...], "properties": { "visible": true } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::layer::LayerKind;
use crate::map::MapProperties;
use crate::marker::Marker;

/// Keys that must be present for a record to be importable.
pub const REQUIRED_FIELDS: [&str; 4] = ["width", "height", "cellSize", "layers"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRecord {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
    #[serde(default)]
    pub properties: MapProperties,
    /// Keys naming no known layer kind are skipped.
    #[serde(deserialize_with = "known_layers")]
    pub layers: BTreeMap<LayerKind, LayerRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Rows of cells. A `null` entry, or a row shorter than the map, leaves
    /// the target cell as it is on import. See [`Marker::from_value`] for
    /// how other cell values are read.
    #[serde(default, deserialize_with = "lenient_cells")]
    pub cells: Vec<Vec<Option<Marker>>>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub properties: Map<String, Value>,
}

impl MapRecord {
    /// Names of required top-level keys that `value` lacks (or holds as `null`).
    pub fn missing_fields(value: &Value) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|key| value.get(key).map_or(true, Value::is_null))
            .collect()
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&LayerRecord> {
        self.layers.get(&kind)
    }
}

fn known_layers<'de, D>(deserializer: D) -> Result<BTreeMap<LayerKind, LayerRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    let mut layers = BTreeMap::new();
    for (key, value) in raw {
        let kind = match key.parse::<LayerKind>() {
            Ok(kind) => kind,
            Err(e) => {
                log::warn!("Skipping layer record: {}", e);
                continue;
            }
        };
        match serde_json::from_value::<LayerRecord>(value) {
            Ok(layer) => {
                layers.insert(kind, layer);
            }
            Err(e) => log::warn!("Skipping {} layer record: {}", kind, e),
        }
    }
    Ok(layers)
}

fn lenient_cells<'de, D>(deserializer: D) -> Result<Vec<Vec<Option<Marker>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = match Value::deserialize(deserializer)? {
        Value::Array(rows) => rows,
        Value::Null => return Ok(Vec::new()),
        other => {
            log::warn!("Ignoring layer cells that are not rows: {}", other);
            return Ok(Vec::new());
        }
    };
    Ok(rows
        .iter()
        .map(|row| match row {
            Value::Array(cells) => cells.iter().map(Marker::from_value).collect(),
            _ => Vec::new(),
        })
        .collect())
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => {
            log::warn!("Ignoring layer properties that are not an object: {}", other);
            Ok(Map::new())
        }
    }
}
