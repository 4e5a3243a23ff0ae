use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tilegrid_core::{GridMap, GridMapConfig, MapProperties};

use crate::map_file::MapFileError;

/// Metadata for a Tilegrid project (`.tgproj` manifest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub name: String,
    pub version: String,
    pub description: String,
    pub settings: ProjectSettings,
    #[serde(default)]
    pub maps: Vec<MapEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub default_cell_size: u32,
    pub default_width: u32,
    pub default_height: u32,
    pub show_grid: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            default_cell_size: 32,
            default_width: 20,
            default_height: 15,
            show_grid: true,
        }
    }
}

/// A map belonging to the project, stored next to the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    pub id: Uuid,
    pub name: String,
    /// Path relative to the manifest.
    pub file: String,
}

impl ProjectMeta {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "0.1.0".to_string(),
            description: String::new(),
            settings: ProjectSettings::default(),
            maps: Vec::new(),
        }
    }

    /// Register a map and return its id.
    pub fn add_map(&mut self, name: &str, file: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.maps.push(MapEntry {
            id,
            name: name.to_string(),
            file: file.to_string(),
        });
        id
    }

    pub fn remove_map(&mut self, id: &Uuid) -> Option<MapEntry> {
        let index = self.maps.iter().position(|m| m.id == *id)?;
        Some(self.maps.remove(index))
    }

    pub fn find_map(&self, name: &str) -> Option<&MapEntry> {
        self.maps.iter().find(|m| m.name == name)
    }

    /// A blank map sized and styled by the project settings.
    pub fn new_map(&self, name: &str) -> Result<GridMap, MapFileError> {
        let mut map = GridMap::with_config(&GridMapConfig {
            width: self.settings.default_width,
            height: self.settings.default_height,
            cell_size: self.settings.default_cell_size,
            ..GridMapConfig::default()
        })?;
        map.properties = MapProperties {
            name: name.to_string(),
            show_grid: self.settings.show_grid,
            ..MapProperties::default()
        };
        Ok(map)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapFileError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MapFileError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
