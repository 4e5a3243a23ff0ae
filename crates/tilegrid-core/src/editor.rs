use crate::commands::{Command, CommandHistory};
use crate::map::GridMap;

/// A map together with its edit journal.
#[derive(Debug)]
pub struct MapEditor {
    map: GridMap,
    history: CommandHistory,
}

impl MapEditor {
    pub fn new(map: GridMap) -> Self {
        Self {
            map,
            history: CommandHistory::new(),
        }
    }

    /// An editor whose journal keeps at most `max_depth` strokes.
    pub fn with_history_depth(map: GridMap, max_depth: usize) -> Self {
        Self {
            map,
            history: CommandHistory::with_max_depth(max_depth),
        }
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// Direct access for edits that are not journaled (camera, properties).
    pub fn map_mut(&mut self) -> &mut GridMap {
        &mut self.map
    }

    pub fn into_map(self) -> GridMap {
        self.map
    }

    /// Replace the map, dropping the history of the old one.
    pub fn replace_map(&mut self, map: GridMap) -> GridMap {
        self.history.clear();
        std::mem::replace(&mut self.map, map)
    }

    // ── Undo / Redo ──────────────────────────────────────────────────

    pub fn execute(&mut self, command: Box<dyn Command>) {
        log::debug!("Executing '{}'", command.description());
        self.history.execute(command, &mut self.map);
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.map)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.map)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }
}
