//! # Tilegrid Core
//!
//! Spatial data model for 2D tile worlds: a stack of five fixed layers
//! (background, collision, event, sprite, interface) sharing one grid,
//! camera-relative coordinate conversion, a plain-data record for saving,
//! and an undo/redo journal for editor strokes.
//!
//! Coordinates outside a grid are never an error. Reads give the empty
//! marker and writes are dropped, so brush strokes and camera pans can run
//! past the map edge freely.

pub mod commands;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod map;
pub mod marker;
pub mod record;

pub use editor::MapEditor;
pub use error::{Dimension, GridError, Result};
pub use geometry::{GridPos, GridRect, ScreenPoint};
pub use layer::{Layer, LayerKind, LayerProperties};
pub use map::{Camera, CellStack, Color, GridMap, GridMapConfig, MapProperties};
pub use marker::Marker;
pub use record::{LayerRecord, MapRecord};
