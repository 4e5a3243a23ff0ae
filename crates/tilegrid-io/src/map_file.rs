//! Maps on disk: the [`MapRecord`] as pretty-printed JSON.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use tilegrid_core::{GridError, GridMap, MapRecord};

#[derive(Error, Debug)]
pub enum MapFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed map record: {0}")]
    Malformed(String),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Parse map JSON text into a new map.
pub fn parse_map(json: &str) -> Result<GridMap, MapFileError> {
    let value: Value = serde_json::from_str(json)?;
    let missing = MapRecord::missing_fields(&value);
    if !missing.is_empty() {
        return Err(MapFileError::Malformed(format!(
            "missing {}",
            missing.join(", ")
        )));
    }
    let record: MapRecord = serde_json::from_value(value)?;
    Ok(GridMap::from_record(&record)?)
}

pub fn load_map(path: impl AsRef<Path>) -> Result<GridMap, MapFileError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let map = parse_map(&text)?;
    log::info!(
        "Loaded map '{}' ({}x{}) from {}",
        map.properties.name,
        map.width(),
        map.height(),
        path.display()
    );
    Ok(map)
}

pub fn save_map(path: impl AsRef<Path>, map: &GridMap) -> Result<(), MapFileError> {
    let path = path.as_ref();
    fs::write(path, map.to_json()?)?;
    log::info!("Saved map '{}' to {}", map.properties.name, path.display());
    Ok(())
}
