//! # Tilegrid I/O
//!
//! Plain JSON persistence: single map files holding a `MapRecord`, and the
//! `.tgproj` project manifest that lists a project's maps.

pub mod map_file;
pub mod project;

pub use map_file::{load_map, parse_map, save_map, MapFileError};
pub use project::{MapEntry, ProjectMeta, ProjectSettings};
